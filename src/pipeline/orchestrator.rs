use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

use crate::cache::CacheDir;
use crate::config::MascotConfig;
use crate::emit;
use crate::pipeline::phases;
use crate::problems::ProblemLog;

/// Runs the whole pipeline: scan, analyze, amend, dependency graph, task
/// planning, dirtiness filtering, then both emitters.
pub struct Pipeline<'a> {
    config: &'a MascotConfig,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a MascotConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<()> {
        let start = Instant::now();
        let cache = CacheDir::new(self.config.cache_dir.clone());
        cache.ensure()?;
        let problems = ProblemLog::new(&cache);
        problems.truncate()?;

        info!(
            workspace = %self.config.workspace.display(),
            cache = %cache.root().display(),
            "starting pipeline"
        );

        self.stage("scan", || {
            phases::scan::execute(self.config, &cache, &problems).map(|_| ())
        })?;
        self.stage("analyze", || {
            phases::analyze::execute(self.config, &cache, &problems).map(|_| ())
        })?;
        if !self.config.amendments.is_empty() {
            self.stage("amend", || {
                phases::amend::execute(self.config, &cache, &problems).map(|_| ())
            })?;
        }
        self.stage("dependencies", || {
            phases::dependencies::execute(&cache, &problems).map(|_| ())
        })?;
        self.stage("build-order", || {
            phases::build_order::execute(&cache, &problems).map(|_| ())
        })?;
        self.stage("dirty-filter", || {
            phases::dirty::execute(self.config, &cache, &problems).map(|_| ())
        })?;
        self.stage("emit-asconfig", || {
            emit::asconfig::execute(self.config, &cache, &problems)
        })?;
        self.stage("emit-vscode", || {
            emit::vscode::execute(self.config, &cache, &problems)
        })?;

        info!(
            total_time_ms = start.elapsed().as_millis() as u64,
            "pipeline complete"
        );
        Ok(())
    }

    fn stage(&self, name: &str, run: impl FnOnce() -> Result<()>) -> Result<()> {
        info!(stage = name, "starting stage");
        let start = Instant::now();
        run().with_context(|| format!("Stage {} failed", name))?;
        info!(
            stage = name,
            duration_ms = start.elapsed().as_millis() as u64,
            "stage complete"
        );
        Ok(())
    }
}
