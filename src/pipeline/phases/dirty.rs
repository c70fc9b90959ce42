//! Dirtiness filter: prunes each build-task list down to the projects that
//! actually need rebuilding.
//!
//! A project is transitively dirty when it is dirty itself or any project
//! reachable along its dependency edges is. The probe memoizes per project;
//! each entry is seeded with the project's direct dirtiness before its
//! dependencies are explored, so a cycle re-entering the project reads the
//! seeded value instead of recursing forever.

use anyhow::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cache::CacheDir;
use crate::config::MascotConfig;
use crate::model::BuildTask;
use crate::problems::ProblemLog;

pub fn execute(
    config: &MascotConfig,
    cache: &CacheDir,
    problems: &ProblemLog,
) -> Result<Option<Vec<BuildTask>>> {
    let Some(mut tasks) = cache.load_tasks()? else {
        warn!("build tasks missing; run plan first");
        problems.append("Dirtiness filtering skipped: tasks.json is missing from the cache");
        return Ok(None);
    };

    if config.rebuild_all {
        info!("rebuild-all set; dirtiness filter disabled");
        return Ok(Some(tasks));
    }

    let Some(projects) = cache.load_projects()? else {
        warn!("project catalog missing; run scan first");
        problems.append("Dirtiness filtering skipped: projects.json is missing from the cache");
        return Ok(None);
    };
    let Some(graph) = cache.load_deps()? else {
        warn!("dependency graph missing; run deps first");
        problems.append("Dirtiness filtering skipped: deps.json is missing from the cache");
        return Ok(None);
    };

    let direct: HashMap<PathBuf, bool> = projects
        .iter()
        .map(|p| (p.home.clone(), p.is_dirty))
        .collect();
    let edges: HashMap<&Path, &[PathBuf]> = graph
        .iter()
        .map(|n| (n.project_path.as_path(), n.project_dependencies.as_slice()))
        .collect();

    let mut probe = DirtyProbe {
        direct: &direct,
        edges: &edges,
        memo: HashMap::new(),
    };

    let mut pruned = 0usize;
    for task in &mut tasks {
        let before = task.project_build_tasks.len();
        task.project_build_tasks
            .retain(|path| probe.transitively_dirty(path) == Some(true));
        task.num_tasks = task.project_build_tasks.len();
        pruned += before - task.num_tasks;
    }

    cache.store_tasks(&tasks)?;
    info!(pruned, "dirtiness filter applied");
    Ok(Some(tasks))
}

struct DirtyProbe<'a> {
    direct: &'a HashMap<PathBuf, bool>,
    edges: &'a HashMap<&'a Path, &'a [PathBuf]>,
    memo: HashMap<PathBuf, bool>,
}

impl DirtyProbe<'_> {
    /// `None` for projects unknown to the catalog or the graph; such
    /// entries are omitted from filtered lists.
    fn transitively_dirty(&mut self, path: &Path) -> Option<bool> {
        if let Some(&known) = self.memo.get(path) {
            return Some(known);
        }
        let &own = self.direct.get(path)?;
        let deps = *self.edges.get(path)?;

        self.memo.insert(path.to_path_buf(), own);
        let mut result = own;
        for dep in deps {
            if self.transitively_dirty(dep) == Some(true) {
                result = true;
            }
        }
        self.memo.insert(path.to_path_buf(), result);
        Some(result)
    }
}
