//! Project dependency graph and build-task entities.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// An application entry point derived from a retained descriptor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootClass {
    pub class_file: PathBuf,
    pub descriptor: PathBuf,
}

/// One node of `deps.json`: a project and the projects its classes couple to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyNode {
    pub project_path: PathBuf,
    /// Ordered unique, never contains `project_path` itself.
    pub project_dependencies: Vec<PathBuf>,
    pub num_dependencies: usize,
    pub root_classes: Vec<RootClass>,
}

/// One row of `tasks.json`: the transitive, dependency-ordered build list for
/// a project, with the project itself last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTask {
    pub project_path: PathBuf,
    pub project_build_tasks: Vec<PathBuf>,
    pub num_tasks: usize,
}
