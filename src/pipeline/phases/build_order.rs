//! Task planner: a transitive, dependency-ordered build list per project
//! (`tasks.json`).
//!
//! Depth-first post-order over the subgraph reachable from each project,
//! deduplicated by first occurrence, with the project itself appended last.
//! Cycles are tolerated: in-progress nodes are never entered twice.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::cache::CacheDir;
use crate::model::{BuildTask, DependencyNode};
use crate::problems::ProblemLog;

pub fn execute(cache: &CacheDir, problems: &ProblemLog) -> Result<Option<Vec<BuildTask>>> {
    let Some(graph) = cache.load_deps()? else {
        warn!("dependency graph missing; run deps first");
        problems.append("Task planning skipped: deps.json is missing from the cache");
        return Ok(None);
    };

    let index: HashMap<&Path, &DependencyNode> = graph
        .iter()
        .map(|node| (node.project_path.as_path(), node))
        .collect();

    let tasks: Vec<BuildTask> = graph
        .iter()
        .map(|node| plan_task(node, &index, problems))
        .collect();

    cache.store_tasks(&tasks)?;
    info!(tasks = tasks.len(), "build tasks written");
    Ok(Some(tasks))
}

fn plan_task(
    root: &DependencyNode,
    index: &HashMap<&Path, &DependencyNode>,
    problems: &ProblemLog,
) -> BuildTask {
    let mut ordered = Vec::new();
    let mut visited = HashSet::new();
    let mut in_progress = HashSet::new();

    in_progress.insert(root.project_path.clone());
    for dep in &root.project_dependencies {
        descend(
            dep,
            root,
            index,
            &mut ordered,
            &mut visited,
            &mut in_progress,
            problems,
        );
    }
    ordered.push(root.project_path.clone());

    BuildTask {
        project_path: root.project_path.clone(),
        num_tasks: ordered.len(),
        project_build_tasks: ordered,
    }
}

fn descend(
    current: &PathBuf,
    root: &DependencyNode,
    index: &HashMap<&Path, &DependencyNode>,
    ordered: &mut Vec<PathBuf>,
    visited: &mut HashSet<PathBuf>,
    in_progress: &mut HashSet<PathBuf>,
    problems: &ProblemLog,
) {
    if visited.contains(current) {
        return;
    }
    if in_progress.contains(current) {
        problems.append(format!(
            "Dependency cycle through {} while planning build of {}",
            current.display(),
            root.project_path.display()
        ));
        return;
    }
    let Some(node) = index.get(current.as_path()) else {
        problems.append(format!(
            "Unknown project {} referenced while planning build of {}",
            current.display(),
            root.project_path.display()
        ));
        visited.insert(current.clone());
        return;
    };

    in_progress.insert(current.clone());
    for dep in &node.project_dependencies {
        descend(dep, root, index, ordered, visited, in_progress, problems);
    }
    in_progress.remove(current);
    visited.insert(current.clone());
    ordered.push(current.clone());
}
