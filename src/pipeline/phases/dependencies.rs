//! Dependency builder: folds per-class couplings up to the project level
//! and emits the project dependency graph (`deps.json`).

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};

use crate::cache::CacheDir;
use crate::model::{DependencyNode, Project, RootClass};
use crate::problems::ProblemLog;

pub fn execute(cache: &CacheDir, problems: &ProblemLog) -> Result<Option<Vec<DependencyNode>>> {
    let Some(projects) = cache.load_projects()? else {
        warn!("project catalog missing; run scan first");
        problems.append("Dependency graph skipped: projects.json is missing from the cache");
        return Ok(None);
    };
    let Some(entries) = cache.load_classes()? else {
        warn!("class catalog missing; run analyze first");
        problems.append("Dependency graph skipped: classes.json is missing from the cache");
        return Ok(None);
    };

    let catalog: HashMap<&PathBuf, &Project> = projects.iter().map(|p| (&p.home, p)).collect();

    let mut order: Vec<PathBuf> = Vec::new();
    let mut nodes: HashMap<PathBuf, DependencyNode> = HashMap::new();

    for entry in &entries {
        let home = &entry.analyzed_class.project;
        if !nodes.contains_key(home) {
            order.push(home.clone());
            nodes.insert(home.clone(), new_node(home, catalog.get(home).copied()));
        }
        let node = match nodes.get_mut(home) {
            Some(node) => node,
            None => continue,
        };

        for coupling in &entry.class_couplings {
            if !coupling.class_exists {
                continue;
            }
            let Some(target) = &coupling.matching_project else {
                continue;
            };
            if target == home {
                continue;
            }
            if !node.project_dependencies.contains(target) {
                node.project_dependencies.push(target.clone());
            }
        }
    }

    let mut graph: Vec<DependencyNode> = order
        .into_iter()
        .filter_map(|home| nodes.remove(&home))
        .map(|mut node| {
            node.num_dependencies = node.project_dependencies.len();
            node
        })
        .collect();

    // Leaf-first-ish ordering for human inspection; the stable sort keeps
    // catalog order among ties.
    graph.sort_by_key(|node| node.num_dependencies);

    cache.store_deps(&graph)?;
    info!(nodes = graph.len(), "dependency graph written");
    Ok(Some(graph))
}

fn new_node(home: &PathBuf, project: Option<&Project>) -> DependencyNode {
    let root_classes = project
        .map(|p| {
            p.descriptors
                .iter()
                .filter_map(|d| {
                    d.related_class.as_ref().map(|related| RootClass {
                        class_file: related.path.clone(),
                        descriptor: d.path.clone(),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    DependencyNode {
        project_path: home.clone(),
        project_dependencies: Vec::new(),
        num_dependencies: 0,
        root_classes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnalyzedClass, ClassEntry, Coupling, CouplingKind};

    fn project(home: &str) -> Project {
        Project {
            home: PathBuf::from(home),
            name: home.rsplit('/').next().unwrap_or(home).to_string(),
            class_files: vec!["A.as".to_string()],
            asset_files: vec![],
            has_lib_dir: false,
            has_binaries: false,
            has_app_binary: false,
            descriptors: vec![],
            code_timestamp: 0,
            binary_timestamp: 0,
            is_dirty: false,
            is_app_probability: 0.0,
        }
    }

    fn entry(project: &str, class: &str, deps: &[(&str, bool)]) -> ClassEntry {
        ClassEntry {
            analyzed_class: AnalyzedClass {
                file: PathBuf::from(format!("{}/src/{}.as", project, class)),
                class_name: class.to_string(),
                package: None,
                expected_rel_path: format!("{}.as", class),
                path_matches_package: true,
                project: PathBuf::from(project),
            },
            class_couplings: deps
                .iter()
                .map(|(target, exists)| Coupling {
                    class_name: "X".to_string(),
                    package: None,
                    expected_rel_path: "X.as".to_string(),
                    kind: CouplingKind::Import,
                    matching_project: Some(PathBuf::from(*target)),
                    expected_class_file: Some(PathBuf::from(format!("{}/src/X.as", target))),
                    class_exists: *exists,
                })
                .collect(),
        }
    }

    fn run(projects: Vec<Project>, entries: Vec<ClassEntry>) -> Vec<DependencyNode> {
        let dir = tempfile::TempDir::new().unwrap();
        let cache = CacheDir::new(dir.path());
        let problems = ProblemLog::new(&cache);
        cache.store_projects(&projects).unwrap();
        cache.store_classes(&entries).unwrap();
        execute(&cache, &problems).unwrap().unwrap()
    }

    #[test]
    fn test_folds_couplings_to_unique_dependencies() {
        let graph = run(
            vec![project("/w/app"), project("/w/libA")],
            vec![
                entry("/w/app", "M", &[("/w/libA", true), ("/w/libA", true)]),
                entry("/w/libA", "A", &[]),
            ],
        );

        let app = graph
            .iter()
            .find(|n| n.project_path == PathBuf::from("/w/app"))
            .unwrap();
        assert_eq!(app.project_dependencies, vec![PathBuf::from("/w/libA")]);
        assert_eq!(app.num_dependencies, 1);
    }

    #[test]
    fn test_self_and_unresolved_couplings_excluded() {
        let graph = run(
            vec![project("/w/app")],
            vec![entry(
                "/w/app",
                "M",
                &[("/w/app", true), ("/w/ghost", false)],
            )],
        );
        assert_eq!(graph[0].project_dependencies.len(), 0);
    }

    #[test]
    fn test_sorted_by_dependency_count_ascending() {
        let graph = run(
            vec![project("/w/app"), project("/w/libA"), project("/w/libB")],
            vec![
                entry("/w/app", "M", &[("/w/libA", true), ("/w/libB", true)]),
                entry("/w/libA", "A", &[("/w/libB", true)]),
                entry("/w/libB", "B", &[]),
            ],
        );

        let counts: Vec<usize> = graph.iter().map(|n| n.num_dependencies).collect();
        assert_eq!(counts, vec![0, 1, 2]);
    }
}
