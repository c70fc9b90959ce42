//! Editor-config emitter: per-project `.vscode/settings.json` and
//! `.vscode/tasks.json`.
//!
//! Tasks owned by mascot carry the `MASCOT: ` label prefix. On purge every
//! owned task is replaced and foreign tasks are kept; without purge the
//! write is skipped as soon as any owned task is present.

use anyhow::{Context, Result};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cache::CacheDir;
use crate::config::MascotConfig;
use crate::model::{BuildTask, Project};
use crate::problems::ProblemLog;
use crate::util::fs::to_forward_slashes;

pub const SDK_FRAMEWORK_KEY: &str = "as3mxml.sdk.framework";
pub const MASCOT_LABEL_PREFIX: &str = "MASCOT: ";
const TASKS_VERSION: &str = "2.0.0";
const COMPILER_DRIVER: &str = "asconfigc";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    fn debug_flag(self) -> bool {
        self == BuildMode::Debug
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildMode::Debug => write!(f, "debug"),
            BuildMode::Release => write!(f, "release"),
        }
    }
}

pub fn execute(config: &MascotConfig, cache: &CacheDir, problems: &ProblemLog) -> Result<()> {
    let sdk = match &config.sdk_dir {
        Some(sdk) => sdk.clone(),
        None => {
            warn!("SDK directory not set; editor config emission skipped");
            problems.append("Editor config emission skipped: SDK directory is not configured");
            return Ok(());
        }
    };
    let Some(projects) = cache.load_projects()? else {
        warn!("project catalog missing; run scan first");
        problems.append("Editor config emission skipped: projects.json is missing from the cache");
        return Ok(());
    };
    let Some(tasks) = cache.load_tasks()? else {
        warn!("build tasks missing; run plan first");
        problems.append("Editor config emission skipped: tasks.json is missing from the cache");
        return Ok(());
    };

    let task_index: HashMap<&Path, &BuildTask> = tasks
        .iter()
        .map(|t| (t.project_path.as_path(), t))
        .collect();

    let mut written = 0usize;
    for project in &projects {
        let result = emit_project(
            project,
            task_index.get(project.home.as_path()).copied(),
            &sdk,
            config,
        );
        match result {
            Ok(()) => written += 1,
            Err(e) => problems.append(format!(
                "Failed to write editor config for {}: {:#}",
                project.home.display(),
                e
            )),
        }
    }

    info!(written, "editor configs emitted");
    Ok(())
}

fn emit_project(
    project: &Project,
    task: Option<&BuildTask>,
    sdk: &Path,
    config: &MascotConfig,
) -> Result<()> {
    let vscode_dir = project.home.join(".vscode");
    fs::create_dir_all(&vscode_dir)
        .with_context(|| format!("Failed to create {}", vscode_dir.display()))?;

    emit_settings(&vscode_dir, sdk, config)?;
    emit_tasks(project, task, &vscode_dir, sdk, config)?;
    Ok(())
}

/// Merges caller keys into settings.json, mapping the `$sdk` alias to the
/// editor extension's SDK-framework key. Purge starts from scratch.
fn emit_settings(vscode_dir: &Path, sdk: &Path, config: &MascotConfig) -> Result<()> {
    let path = vscode_dir.join("settings.json");
    let mut settings = if config.purge {
        Map::new()
    } else {
        read_object(&path)?.unwrap_or_default()
    };

    for (key, value) in &config.editor_settings {
        let key = if key == "$sdk" {
            SDK_FRAMEWORK_KEY.to_string()
        } else {
            key.clone()
        };
        settings.insert(key, value.clone());
    }
    settings
        .entry(SDK_FRAMEWORK_KEY.to_string())
        .or_insert_with(|| json!(to_forward_slashes(sdk)));

    write_json(&path, &Value::Object(settings))
}

fn emit_tasks(
    project: &Project,
    task: Option<&BuildTask>,
    vscode_dir: &Path,
    sdk: &Path,
    config: &MascotConfig,
) -> Result<()> {
    let path = vscode_dir.join("tasks.json");
    let mut document = read_object(&path)?.unwrap_or_default();
    document
        .entry("version".to_string())
        .or_insert_with(|| json!(TASKS_VERSION));

    let mut existing = match document.remove("tasks") {
        Some(Value::Array(tasks)) => tasks,
        _ => Vec::new(),
    };

    if existing.iter().any(is_mascot_task) {
        if config.purge {
            existing.retain(|t| !is_mascot_task(t));
        } else {
            debug!(path = %path.display(), "mascot tasks already present; skipped");
            return Ok(());
        }
    }

    let list = task
        .map(|t| t.project_build_tasks.clone())
        .unwrap_or_default();
    for mode in [BuildMode::Debug, BuildMode::Release] {
        existing.extend(mode_tasks(project, &list, mode, sdk));
    }

    document.insert("tasks".to_string(), Value::Array(existing));
    write_json(&path, &Value::Object(document))
}

/// One chained sub-task per remaining dependency, then the master task of
/// the editor's ActionScript build type. The build list's final entry (the
/// project itself) is popped and becomes the master.
fn mode_tasks(project: &Project, list: &[PathBuf], mode: BuildMode, sdk: &Path) -> Vec<Value> {
    let mut chain = list.to_vec();
    let rebuild_needed = !chain.is_empty();
    chain.pop();

    let mut tasks = Vec::new();
    let mut previous: Option<String> = None;
    for dep in &chain {
        let label = format!(
            "{}compile {} [{}]",
            MASCOT_LABEL_PREFIX,
            to_forward_slashes(dep),
            mode
        );
        let mut task = json!({
            "label": label.clone(),
            "type": "shell",
            "command": COMPILER_DRIVER,
            "args": [
                "--sdk", to_forward_slashes(sdk),
                "--project", to_forward_slashes(dep),
                format!("--debug={}", mode.debug_flag()),
            ],
            "group": "build",
            "problemMatcher": [],
        });
        if let Some(prev) = previous.take() {
            task["dependsOn"] = json!(prev);
        }
        previous = Some(label);
        tasks.push(task);
    }

    let suffix = if !chain.is_empty() {
        " (with deps)"
    } else if !rebuild_needed {
        " (not needed)"
    } else {
        ""
    };
    let mut master = json!({
        "label": format!(
            "{}build {} [{}]{}",
            MASCOT_LABEL_PREFIX, project.name, mode, suffix
        ),
        "type": "actionscript",
        "debug": mode.debug_flag(),
        "asconfig": crate::emit::asconfig::ASCONFIG_FILE,
        "group": "build",
        "problemMatcher": [],
    });
    if let Some(prev) = previous {
        master["dependsOn"] = json!(prev);
    }
    tasks.push(master);
    tasks
}

fn is_mascot_task(task: &Value) -> bool {
    task.get("label")
        .and_then(Value::as_str)
        .map(|label| label.starts_with(MASCOT_LABEL_PREFIX))
        .unwrap_or(false)
}

fn read_object(path: &Path) -> Result<Option<Map<String, Value>>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    match serde_json::from_str(&text) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) | Err(_) => {
            debug!(path = %path.display(), "existing file is not a JSON object; replacing");
            Ok(None)
        }
    }
}

fn write_json(path: &Path, value: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(value)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
}
