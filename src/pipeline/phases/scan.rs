//! Shallow scanner: walks the workspace, identifies project roots, and
//! builds the project catalog (`projects.json`).

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::cache::CacheDir;
use crate::config::MascotConfig;
use crate::model::{Descriptor, Project, RelatedClass};
use crate::problems::ProblemLog;
use crate::util::fs::{file_stem, package_from_rel_path, timestamp_ms, to_forward_slashes};

const CLASS_EXTENSIONS: [&str; 3] = ["as", "mxml", "fxg"];
const DESCRIPTOR_SUFFIX: &str = "-app.xml";

pub fn execute(
    config: &MascotConfig,
    cache: &CacheDir,
    problems: &ProblemLog,
) -> Result<Vec<Project>> {
    let workspace = &config.workspace;
    info!(workspace = %workspace.display(), "scanning workspace");

    let mut projects = Vec::new();
    visit(workspace, config, problems, &mut projects)?;

    cache.store_projects(&projects)?;
    info!(projects = projects.len(), "project catalog written");
    Ok(projects)
}

/// Tests a directory for projecthood, then recurses into its children.
/// Being a project does not stop the descent; a nested-project rejection
/// does.
fn visit(
    dir: &Path,
    config: &MascotConfig,
    problems: &ProblemLog,
    projects: &mut Vec<Project>,
) -> Result<()> {
    let src = dir.join(&config.src_dir);
    if src.is_dir() {
        if let Some(inner) = find_nested_source_root(&src, &config.src_dir) {
            problems.append(format!(
                "Nested project under {}: {} has its own source root; candidate rejected",
                dir.display(),
                inner.display()
            ));
            return Ok(());
        }
        match build_project(dir, &src, config, problems) {
            Ok(project) => {
                debug!(project = %project.home.display(), classes = project.class_files.len(), "project accepted");
                projects.push(project);
            }
            Err(e) => problems.append(format!(
                "Failed to catalog project {}: {:#}",
                dir.display(),
                e
            )),
        }
    }

    for child in sorted_child_dirs(dir)? {
        visit(&child, config, problems, projects)?;
    }
    Ok(())
}

fn sorted_child_dirs(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    let mut out = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", dir.display()))?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if path.is_dir() && !(name.starts_with('.') && name.len() > 1) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// A source root may not contain a directory with its own source root.
fn find_nested_source_root(src: &Path, src_dir: &str) -> Option<std::path::PathBuf> {
    for entry in WalkDir::new(src).min_depth(1).into_iter().flatten() {
        if entry.file_type().is_dir() {
            let candidate = entry.path().join(src_dir);
            if candidate.is_dir() {
                return Some(candidate);
            }
        }
    }
    None
}

fn build_project(
    home: &Path,
    src: &Path,
    config: &MascotConfig,
    problems: &ProblemLog,
) -> Result<Project> {
    let mut class_files = Vec::new();
    let mut asset_files = Vec::new();
    let mut code_timestamp = 0u64;

    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src)
            .unwrap_or(entry.path());
        let rel_slashed = to_forward_slashes(rel);

        let is_class = crate::util::fs::extension(&rel_slashed)
            .map(|ext| CLASS_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false);
        if is_class {
            let meta = entry
                .metadata()
                .with_context(|| format!("Failed to stat {}", entry.path().display()))?;
            code_timestamp = code_timestamp.max(timestamp_ms(&meta));
            class_files.push(rel_slashed);
        } else {
            asset_files.push(rel_slashed);
        }
    }

    let (binary_timestamp, has_binaries, has_app_binary) =
        scan_binaries(&home.join(&config.bin_dir))?;
    let has_lib_dir = lib_dir_has_swc(&home.join("lib"))?;
    let descriptors = collect_descriptors(src, &class_files, problems)?;

    let is_app_probability = if !descriptors.is_empty() || has_app_binary {
        1.0
    } else {
        0.0
    };

    Ok(Project {
        home: home.to_path_buf(),
        name: crate::model::project::project_name(home),
        class_files,
        asset_files,
        has_lib_dir,
        has_binaries,
        has_app_binary,
        descriptors,
        code_timestamp,
        binary_timestamp,
        is_dirty: code_timestamp > binary_timestamp,
        is_app_probability,
    })
}

/// Non-recursive scan of the binary directory for compiled artifacts.
fn scan_binaries(bin: &Path) -> Result<(u64, bool, bool)> {
    let mut timestamp = 0u64;
    let mut has_binaries = false;
    let mut has_app_binary = false;

    if !bin.is_dir() {
        return Ok((timestamp, has_binaries, has_app_binary));
    }
    let entries = fs::read_dir(bin).with_context(|| format!("Failed to list {}", bin.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", bin.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("swf") => {
                has_binaries = true;
                has_app_binary = true;
            }
            Some("swc") => has_binaries = true,
            _ => continue,
        }
        let meta = entry
            .metadata()
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        timestamp = timestamp.max(timestamp_ms(&meta));
    }
    Ok((timestamp, has_binaries, has_app_binary))
}

/// A `lib` directory only counts when it actually holds a `.swc`.
fn lib_dir_has_swc(lib: &Path) -> Result<bool> {
    if !lib.is_dir() {
        return Ok(false);
    }
    let entries = fs::read_dir(lib).with_context(|| format!("Failed to list {}", lib.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", lib.display()))?;
        let path = entry.path();
        if path.is_file()
            && path
                .extension()
                .map(|e| e.to_string_lossy().eq_ignore_ascii_case("swc"))
                .unwrap_or(false)
        {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Descriptors live directly under the source root as `<name>-app.xml` and
/// are kept only when `<name>` matches a class basename (case-insensitive;
/// descriptor casing in the wild does not track class casing).
fn collect_descriptors(
    src: &Path,
    class_files: &[String],
    problems: &ProblemLog,
) -> Result<Vec<Descriptor>> {
    let mut descriptors = Vec::new();
    let mut names = Vec::new();

    let entries = fs::read_dir(src).with_context(|| format!("Failed to list {}", src.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to read entry in {}", src.display()))?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();

    for file_name in names {
        let Some(simple_name) = file_name.strip_suffix(DESCRIPTOR_SUFFIX) else {
            continue;
        };
        let matches_class = class_files
            .iter()
            .any(|cf| file_stem(cf).eq_ignore_ascii_case(simple_name));
        if !matches_class {
            debug!(descriptor = %file_name, "descriptor names no class; dropped");
            continue;
        }

        let related_class = class_files
            .iter()
            .find(|cf| starts_with_ignore_case(cf, simple_name))
            .map(|cf| RelatedClass {
                path: crate::util::fs::join_slashed(src, cf),
                package: package_from_rel_path(cf),
            });
        if related_class.is_none() {
            problems.append(format!(
                "Descriptor {} retained but no class file path starts with '{}'",
                src.join(&file_name).display(),
                simple_name
            ));
        }

        descriptors.push(Descriptor {
            simple_name: simple_name.to_string(),
            file_name: file_name.clone(),
            path: src.join(&file_name),
            related_class,
        });
    }
    Ok(descriptors)
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .map(|head| head.eq_ignore_ascii_case(prefix))
        .unwrap_or(false)
}
