//! Manual-dependency patcher: injects synthetic couplings the extractor
//! cannot see, mutating `classes.json` in place.

use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

use crate::cache::CacheDir;
use crate::config::{Amendment, MascotConfig};
use crate::model::{ClassEntry, Coupling, CouplingKind, Project};
use crate::problems::ProblemLog;
use crate::util::fs::{expected_rel_path, file_stem, package_from_rel_path};

pub fn execute(
    config: &MascotConfig,
    cache: &CacheDir,
    problems: &ProblemLog,
) -> Result<Option<Vec<ClassEntry>>> {
    let Some(projects) = cache.load_projects()? else {
        warn!("project catalog missing; run scan first");
        problems.append("Dependency patching skipped: projects.json is missing from the cache");
        return Ok(None);
    };
    let Some(mut entries) = cache.load_classes()? else {
        warn!("class catalog missing; run analyze first");
        problems.append("Dependency patching skipped: classes.json is missing from the cache");
        return Ok(None);
    };

    let mut patched = 0usize;
    for amendment in &config.amendments {
        patched += apply_amendment(amendment, &projects, &mut entries, config, problems);
    }

    cache.store_classes(&entries)?;
    info!(
        amendments = config.amendments.len(),
        couplings = patched,
        "manual dependencies patched"
    );
    Ok(Some(entries))
}

/// Applies one amendment record. The record is all-or-nothing: if the
/// project or any dependency cannot be validated, the whole record is
/// skipped with a problem entry.
fn apply_amendment(
    amendment: &Amendment,
    projects: &[Project],
    entries: &mut [ClassEntry],
    config: &MascotConfig,
    problems: &ProblemLog,
) -> usize {
    if find_project(projects, &amendment.project).is_none() {
        problems.append(format!(
            "Amendment skipped: project {} is not in the catalog or not on disk",
            amendment.project.display()
        ));
        return 0;
    }
    let mut dep_projects = Vec::new();
    for dep in &amendment.dependencies {
        match find_project(projects, dep) {
            Some(p) => dep_projects.push(p),
            None => {
                problems.append(format!(
                    "Amendment for {} skipped: dependency {} is not in the catalog or not on disk",
                    amendment.project.display(),
                    dep.display()
                ));
                return 0;
            }
        }
    }

    // The synthetic couplings attach to the project's first class file.
    let Some(target) = entries
        .iter_mut()
        .find(|e| e.analyzed_class.project == amendment.project)
    else {
        problems.append(format!(
            "Amendment skipped: project {} has no analyzed classes",
            amendment.project.display()
        ));
        return 0;
    };

    let mut fresh = Vec::new();
    for dep in dep_projects {
        match patch_coupling(dep, config) {
            Some(coupling) => {
                let duplicate = target.class_couplings.iter().chain(fresh.iter()).any(|c| {
                    c.kind == CouplingKind::Patch
                        && c.matching_project == coupling.matching_project
                        && c.expected_class_file == coupling.expected_class_file
                });
                if !duplicate {
                    fresh.push(coupling);
                }
            }
            None => {
                problems.append(format!(
                    "Amendment for {} skipped: dependency {} has no class files",
                    amendment.project.display(),
                    dep.home.display()
                ));
                return 0;
            }
        }
    }

    let count = fresh.len();
    target.class_couplings.splice(0..0, fresh);
    count
}

fn find_project<'a>(projects: &'a [Project], home: &Path) -> Option<&'a Project> {
    if !home.is_dir() {
        return None;
    }
    projects.iter().find(|p| p.home == home)
}

/// A patch coupling pointing at the dependency project's first class file.
fn patch_coupling(dep: &Project, config: &MascotConfig) -> Option<Coupling> {
    let first = dep.class_files.first()?;
    let package = package_from_rel_path(first);
    let class_name = file_stem(first).to_string();
    let ext = crate::util::fs::extension(first).unwrap_or_else(|| "as".to_string());

    Some(Coupling {
        expected_rel_path: expected_rel_path(package.as_deref(), &class_name, &ext),
        class_name,
        package,
        kind: CouplingKind::Patch,
        matching_project: Some(dep.home.clone()),
        expected_class_file: Some(dep.class_file_path(&config.src_dir, first)),
        class_exists: true,
    })
}
