//! Deep scanner: reads every catalog class file, extracts declarations and
//! couplings, and resolves couplings against the workspace
//! (`classes.json`).

use anyhow::Result;
use std::fs;
use tracing::{info, warn};

use crate::analysis::extract::split_qualified;
use crate::analysis::{RawCoupling, Resolver, SourceExtractor};
use crate::cache::CacheDir;
use crate::config::MascotConfig;
use crate::model::{AnalyzedClass, ClassEntry, Coupling, Project};
use crate::problems::ProblemLog;
use crate::util::fs::{expected_rel_path, extension, file_stem, package_from_rel_path};

pub fn execute(
    config: &MascotConfig,
    cache: &CacheDir,
    problems: &ProblemLog,
) -> Result<Option<Vec<ClassEntry>>> {
    let Some(projects) = cache.load_projects()? else {
        warn!("project catalog missing; run scan first");
        problems.append("Class analysis skipped: projects.json is missing from the cache");
        return Ok(None);
    };

    let extractor = SourceExtractor::new()?;
    let resolver = Resolver::new(&projects, &config.src_dir);
    let mut entries = Vec::new();

    for project in &projects {
        for rel in &project.class_files {
            if let Some(entry) =
                analyze_class(project, rel, config, &extractor, &resolver, problems)
            {
                entries.push(entry);
            }
        }
    }

    cache.store_classes(&entries)?;
    info!(classes = entries.len(), "class catalog written");
    Ok(Some(entries))
}

fn analyze_class(
    project: &Project,
    rel: &str,
    config: &MascotConfig,
    extractor: &SourceExtractor,
    resolver: &Resolver,
    problems: &ProblemLog,
) -> Option<ClassEntry> {
    let abs = project.class_file_path(&config.src_dir, rel);
    let ext = extension(rel).unwrap_or_default();
    let inferred_package = package_from_rel_path(rel);

    let (analyzed, raw_couplings) = if ext == "as" {
        let text = match fs::read_to_string(&abs) {
            Ok(text) => text,
            Err(e) => {
                problems.append(format!("Failed to read class file {}: {}", abs.display(), e));
                return None;
            }
        };

        let decl = extractor.declaration(&text);
        let class_name = match decl.class_name {
            Some(name) => name,
            None => {
                problems.append(format!(
                    "No class declaration found in {}; falling back to file name",
                    abs.display()
                ));
                file_stem(rel).to_string()
            }
        };

        let path_matches_package = decl.package == inferred_package;
        if !path_matches_package {
            problems.append(format!(
                "Package mismatch in {}: declared {}, path implies {}",
                abs.display(),
                decl.package.as_deref().unwrap_or("<none>"),
                inferred_package.as_deref().unwrap_or("<none>")
            ));
        }

        let analyzed = AnalyzedClass {
            file: abs.clone(),
            expected_rel_path: expected_rel_path(decl.package.as_deref(), &class_name, &ext),
            class_name,
            package: decl.package,
            path_matches_package,
            project: project.home.clone(),
        };
        (analyzed, extractor.couplings(&text))
    } else {
        // Non-source class-like files carry no extractable text; package and
        // class come from the path alone.
        let class_name = file_stem(rel).to_string();
        let analyzed = AnalyzedClass {
            file: abs,
            expected_rel_path: expected_rel_path(inferred_package.as_deref(), &class_name, &ext),
            class_name,
            package: inferred_package,
            path_matches_package: true,
            project: project.home.clone(),
        };
        (analyzed, Vec::new())
    };

    let class_couplings = raw_couplings
        .into_iter()
        .map(|raw| resolve_coupling(raw, &analyzed, resolver, problems))
        .collect();

    Some(ClassEntry {
        analyzed_class: analyzed,
        class_couplings,
    })
}

fn resolve_coupling(
    raw: RawCoupling,
    owner: &AnalyzedClass,
    resolver: &Resolver,
    problems: &ProblemLog,
) -> Coupling {
    let (package, class_name) = split_qualified(&raw.qualified_name);
    let expected = expected_rel_path(package.as_deref(), &class_name, "as");

    match resolver.resolve(&expected) {
        Some((project, file)) => {
            let class_exists = file.exists();
            if !class_exists {
                problems.append(format!(
                    "Cataloged class file vanished from disk: {} (referenced by {})",
                    file.display(),
                    owner.class_name
                ));
            }
            Coupling {
                class_name,
                package,
                expected_rel_path: expected,
                kind: raw.kind,
                matching_project: Some(project.clone()),
                expected_class_file: Some(file.clone()),
                class_exists,
            }
        }
        None => {
            problems.append(format!(
                "Unresolved dependency: {} referenced by class {} in {}",
                raw.qualified_name,
                owner.class_name,
                owner.project.display()
            ));
            Coupling {
                class_name,
                package,
                expected_rel_path: expected,
                kind: raw.kind,
                matching_project: None,
                expected_class_file: None,
                class_exists: false,
            }
        }
    }
}
