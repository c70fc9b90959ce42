//! Compiler-configuration emitter: one `asconfig.json` per project.

use anyhow::Result;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::cache::CacheDir;
use crate::config::MascotConfig;
use crate::emit::merge::merge_under;
use crate::model::{DependencyNode, Project};
use crate::problems::ProblemLog;
use crate::util::fs::{file_stem, to_forward_slashes};

pub const ASCONFIG_FILE: &str = "asconfig.json";

pub fn execute(config: &MascotConfig, cache: &CacheDir, problems: &ProblemLog) -> Result<()> {
    let Some(projects) = cache.load_projects()? else {
        warn!("project catalog missing; run scan first");
        problems.append("Config emission skipped: projects.json is missing from the cache");
        return Ok(());
    };
    let Some(graph) = cache.load_deps()? else {
        warn!("dependency graph missing; run deps first");
        problems.append("Config emission skipped: deps.json is missing from the cache");
        return Ok(());
    };

    let nodes: HashMap<&Path, &DependencyNode> = graph
        .iter()
        .map(|n| (n.project_path.as_path(), n))
        .collect();

    let mut written = 0usize;
    for project in &projects {
        let target = project.home.join(ASCONFIG_FILE);
        if target.exists() && !config.overwrite {
            debug!(path = %target.display(), "existing asconfig retained");
            continue;
        }

        let computed = build_asconfig(project, nodes.get(project.home.as_path()).copied(), config);
        let document = match &config.asconfig_base {
            Some(base) => merge_under(base.clone(), computed),
            None => computed,
        };

        match write_json(&target, &document) {
            Ok(()) => written += 1,
            Err(e) => problems.append(format!(
                "Failed to write {}: {:#}",
                target.display(),
                e
            )),
        }
    }

    info!(written, "asconfig files emitted");
    Ok(())
}

/// Synthesizes the configuration the emitter owns for one project.
pub fn build_asconfig(
    project: &Project,
    node: Option<&DependencyNode>,
    config: &MascotConfig,
) -> Value {
    let first_root = node.and_then(|n| n.root_classes.first());
    let main_class = first_root
        .map(|root| file_stem(&to_forward_slashes(&root.class_file)).to_string())
        .unwrap_or_else(|| "Main".to_string());

    let mut library_path = Vec::new();
    if project.has_lib_dir {
        library_path.push("lib".to_string());
    }
    if let Some(node) = node {
        for dep in &node.project_dependencies {
            library_path.push(format!(
                "{}/{}",
                to_forward_slashes(dep),
                config.bin_dir
            ));
        }
    }

    let mut compiler_options = Map::new();
    compiler_options.insert("debug".to_string(), json!(config.debug));
    compiler_options.insert("library-path".to_string(), json!(library_path));
    compiler_options.insert("source-path".to_string(), json!([config.src_dir]));

    let mut document = Map::new();
    document.insert("config".to_string(), json!(config.config_type));
    document.insert(
        "copySourcePathAssets".to_string(),
        json!(config.copy_assets),
    );

    if project.is_app() {
        document.insert("type".to_string(), json!("app"));
        document.insert("mainClass".to_string(), json!(main_class));
        if let Some(root) = first_root {
            if let Some(rel) = relative_to(&root.descriptor, &project.home) {
                document.insert("application".to_string(), json!(rel));
            }
        }
        let output = match config.external_worker_output(&project.home) {
            Some(worker_output) => worker_output.to_string(),
            None => format!("{}/{}.swf", config.bin_dir, main_class),
        };
        compiler_options.insert("output".to_string(), json!(output));
    } else {
        document.insert("type".to_string(), json!("lib"));
        compiler_options.insert(
            "output".to_string(),
            json!(format!(
                "{}/{}.swc",
                config.bin_dir,
                sanitize_output_name(&project.name)
            )),
        );
        compiler_options.insert("include-sources".to_string(), json!([config.src_dir]));
    }

    if let Some(workers) = config.internal_workers_for(&project.home) {
        let workers: Vec<Value> = workers
            .iter()
            .map(|w| json!({"file": w.file, "output": w.output}))
            .collect();
        compiler_options.insert("workers".to_string(), json!(workers));
    }

    document.insert(
        "compilerOptions".to_string(),
        Value::Object(compiler_options),
    );
    Value::Object(document)
}

/// Any character outside `[A-Za-z0-9_\-]` becomes an underscore in the
/// library output name.
fn sanitize_output_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn relative_to(path: &Path, base: &Path) -> Option<String> {
    path.strip_prefix(base)
        .ok()
        .map(|rel| to_forward_slashes(rel))
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text)?;
    Ok(())
}
