//! Shared fixtures: a throwaway workspace built from inline sources, with
//! mtime stamping for dirtiness scenarios.

#![allow(dead_code)]

use filetime::FileTime;
use mascot::cache::CacheDir;
use mascot::config::MascotConfig;
use mascot::pipeline::phases;
use mascot::problems::ProblemLog;
use serde_json::Map;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp workspace"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.dir.path().join(rel)
    }

    pub fn write(&self, rel: &str, body: &str) -> PathBuf {
        let path = self.path(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, body).unwrap();
        path
    }

    /// Pushes a file's mtime into the future so its timestamp dominates
    /// everything written "now" (ctime included).
    pub fn stamp_future(&self, rel: &str, secs_ahead: u64) {
        let time = FileTime::from_system_time(SystemTime::now() + Duration::from_secs(secs_ahead));
        filetime::set_file_mtime(self.path(rel), time).unwrap();
    }

    pub fn config(&self) -> MascotConfig {
        MascotConfig {
            workspace: self.root().to_path_buf(),
            cache_dir: self.path(".mascot"),
            sdk_dir: None,
            bin_dir: "bin".to_string(),
            src_dir: "src".to_string(),
            config_type: "air".to_string(),
            copy_assets: true,
            debug: false,
            rebuild_all: false,
            overwrite: false,
            purge: false,
            amendments: Vec::new(),
            asconfig_base: None,
            editor_settings: Map::new(),
            external_workers: Vec::new(),
            internal_workers: Vec::new(),
        }
    }

    pub fn cache(&self, config: &MascotConfig) -> (CacheDir, ProblemLog) {
        let cache = CacheDir::new(config.cache_dir.clone());
        cache.ensure().unwrap();
        let problems = ProblemLog::new(&cache);
        (cache, problems)
    }

    pub fn problems(&self) -> String {
        fs::read_to_string(self.path(".mascot/problems.log")).unwrap_or_default()
    }

    pub fn read_json(&self, rel: &str) -> serde_json::Value {
        let text = fs::read_to_string(self.path(rel)).unwrap();
        serde_json::from_str(&text).unwrap()
    }
}

/// Runs scan through dirtiness filter with the given configuration.
pub fn run_analysis(config: &MascotConfig, cache: &CacheDir, problems: &ProblemLog) {
    phases::scan::execute(config, cache, problems).unwrap();
    phases::analyze::execute(config, cache, problems).unwrap();
    if !config.amendments.is_empty() {
        phases::amend::execute(config, cache, problems).unwrap();
    }
    phases::dependencies::execute(cache, problems).unwrap();
    phases::build_order::execute(cache, problems).unwrap();
    phases::dirty::execute(config, cache, problems).unwrap();
}
