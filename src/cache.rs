//! The cache directory: the contract between pipeline stages.
//!
//! Each stage reads its predecessor's artifact and writes its own, so a run
//! can resume from any point and each stage can be tested in isolation. All
//! artifacts are pretty-printed two-space-indented JSON.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::model::{BuildTask, ClassEntry, DependencyNode, Project};

pub const PROJECTS_FILE: &str = "projects.json";
pub const CLASSES_FILE: &str = "classes.json";
pub const DEPS_FILE: &str = "deps.json";
pub const TASKS_FILE: &str = "tasks.json";
pub const PROBLEMS_FILE: &str = "problems.log";

#[derive(Debug, Clone)]
pub struct CacheDir {
    root: PathBuf,
}

impl CacheDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ensure(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create cache directory {}", self.root.display()))
    }

    pub fn problems_path(&self) -> PathBuf {
        self.root.join(PROBLEMS_FILE)
    }

    pub fn load_projects(&self) -> Result<Option<Vec<Project>>> {
        self.load(PROJECTS_FILE)
    }

    pub fn store_projects(&self, projects: &[Project]) -> Result<()> {
        self.store(PROJECTS_FILE, &projects)
    }

    pub fn load_classes(&self) -> Result<Option<Vec<ClassEntry>>> {
        self.load(CLASSES_FILE)
    }

    pub fn store_classes(&self, classes: &[ClassEntry]) -> Result<()> {
        self.store(CLASSES_FILE, &classes)
    }

    pub fn load_deps(&self) -> Result<Option<Vec<DependencyNode>>> {
        self.load(DEPS_FILE)
    }

    pub fn store_deps(&self, deps: &[DependencyNode]) -> Result<()> {
        self.store(DEPS_FILE, &deps)
    }

    pub fn load_tasks(&self) -> Result<Option<Vec<BuildTask>>> {
        self.load(TASKS_FILE)
    }

    pub fn store_tasks(&self, tasks: &[BuildTask]) -> Result<()> {
        self.store(TASKS_FILE, &tasks)
    }

    /// Reads one artifact. A missing file is not an error: the caller decides
    /// whether the stage can proceed.
    fn load<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.root.join(name);
        if !path.exists() {
            debug!(artifact = name, "cache artifact absent");
            return Ok(None);
        }
        let text = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read cache artifact {}", path.display()))?;
        let value = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse cache artifact {}", path.display()))?;
        Ok(Some(value))
    }

    fn store<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        self.ensure()?;
        let path = self.root.join(name);
        let mut text = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize cache artifact {}", name))?;
        text.push('\n');
        fs::write(&path, text)
            .with_context(|| format!("Failed to write cache artifact {}", path.display()))?;
        debug!(artifact = name, "cache artifact written");
        Ok(())
    }
}
