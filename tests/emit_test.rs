//! Emitter-focused integration tests: asconfig synthesis with a base merge,
//! overwrite semantics, and the .vscode settings/tasks contract.

mod support;

use mascot::emit;
use serde_json::json;
use std::fs;
use support::{run_analysis, Workspace};

fn seed_app_with_lib(ws: &Workspace) {
    ws.write("libA/src/a/A.as", "package a {\n  public class A {}\n}\n");
    ws.write(
        "app/src/m/M.as",
        "package m {\n  import a.A;\n  public class M {}\n}\n",
    );
    ws.write("app/src/m-app.xml", "<application/>\n");
}

#[test]
fn base_object_merges_under_computed_config() {
    let ws = Workspace::new();
    seed_app_with_lib(&ws);

    let mut config = ws.config();
    config.asconfig_base = Some(json!({
        "type": "lib",
        "compilerOptions": {
            "define": ["CONFIG::release,true"],
            "library-path": ["stale"]
        },
        "airOptions": {"target": "bundle"}
    }));
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::asconfig::execute(&config, &cache, &problems).unwrap();

    let asconfig = ws.read_json("app/asconfig.json");
    // Computed fields win on owned keys...
    assert_eq!(asconfig["type"], "app");
    let library_path = asconfig["compilerOptions"]["library-path"]
        .as_array()
        .unwrap();
    assert!(!library_path.iter().any(|v| v == "stale"));
    // ...while foreign base keys ride along.
    assert_eq!(asconfig["airOptions"]["target"], "bundle");
    assert_eq!(
        asconfig["compilerOptions"]["define"],
        json!(["CONFIG::release,true"])
    );
}

#[test]
fn existing_asconfig_retained_without_overwrite() {
    let ws = Workspace::new();
    seed_app_with_lib(&ws);
    ws.write("app/asconfig.json", "{\"handwritten\": true}\n");

    let config = ws.config();
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::asconfig::execute(&config, &cache, &problems).unwrap();

    let asconfig = ws.read_json("app/asconfig.json");
    assert_eq!(asconfig["handwritten"], true);

    let mut config = ws.config();
    config.overwrite = true;
    emit::asconfig::execute(&config, &cache, &problems).unwrap();
    let asconfig = ws.read_json("app/asconfig.json");
    assert_eq!(asconfig["type"], "app");
}

#[test]
fn settings_written_with_sdk_key_and_alias() {
    let ws = Workspace::new();
    seed_app_with_lib(&ws);
    let sdk = ws.path("sdk");
    fs::create_dir_all(&sdk).unwrap();

    let mut config = ws.config();
    config.sdk_dir = Some(sdk.clone());
    config
        .editor_settings
        .insert("$sdk".to_string(), json!("/custom/sdk"));
    config
        .editor_settings
        .insert("editor.tabSize".to_string(), json!(4));
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::vscode::execute(&config, &cache, &problems).unwrap();

    let settings = ws.read_json("app/.vscode/settings.json");
    assert_eq!(settings["as3mxml.sdk.framework"], "/custom/sdk");
    assert_eq!(settings["editor.tabSize"], 4);
}

#[test]
fn settings_merge_preserves_existing_keys_unless_purged() {
    let ws = Workspace::new();
    seed_app_with_lib(&ws);
    ws.write(
        "app/.vscode/settings.json",
        "{\"files.eol\": \"\\n\", \"as3mxml.sdk.framework\": \"/old/sdk\"}\n",
    );
    let sdk = ws.path("sdk");
    fs::create_dir_all(&sdk).unwrap();

    let mut config = ws.config();
    config.sdk_dir = Some(sdk.clone());
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::vscode::execute(&config, &cache, &problems).unwrap();

    let settings = ws.read_json("app/.vscode/settings.json");
    assert_eq!(settings["files.eol"], "\n");
    // Already present, so the configured SDK does not clobber it.
    assert_eq!(settings["as3mxml.sdk.framework"], "/old/sdk");

    let mut config = ws.config();
    config.sdk_dir = Some(sdk);
    config.purge = true;
    emit::vscode::execute(&config, &cache, &problems).unwrap();
    let settings = ws.read_json("app/.vscode/settings.json");
    assert!(settings.get("files.eol").is_none());
    let sdk_value = settings["as3mxml.sdk.framework"].as_str().unwrap();
    assert!(sdk_value.ends_with("sdk"));
}

#[test]
fn tasks_chain_dependencies_into_master() {
    let ws = Workspace::new();
    seed_app_with_lib(&ws);
    let sdk = ws.path("sdk");
    fs::create_dir_all(&sdk).unwrap();

    let mut config = ws.config();
    config.sdk_dir = Some(sdk);
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::vscode::execute(&config, &cache, &problems).unwrap();

    let doc = ws.read_json("app/.vscode/tasks.json");
    assert_eq!(doc["version"], "2.0.0");
    let tasks = doc["tasks"].as_array().unwrap();
    // Per mode: one sub-task for libA plus the master task.
    assert_eq!(tasks.len(), 4);

    let debug_sub = &tasks[0];
    assert_eq!(debug_sub["type"], "shell");
    assert_eq!(debug_sub["command"], "asconfigc");
    let args = debug_sub["args"].as_array().unwrap();
    assert!(args.iter().any(|a| a == "--debug=true"));
    assert!(args
        .iter()
        .any(|a| a.as_str().unwrap().ends_with("libA")));

    let debug_master = &tasks[1];
    assert_eq!(debug_master["type"], "actionscript");
    assert_eq!(debug_master["asconfig"], "asconfig.json");
    assert_eq!(debug_master["debug"], true);
    assert_eq!(debug_master["dependsOn"], debug_sub["label"]);
    assert!(debug_master["label"]
        .as_str()
        .unwrap()
        .ends_with("(with deps)"));

    let release_master = &tasks[3];
    assert_eq!(release_master["debug"], false);
    assert!(release_master["label"].as_str().unwrap().contains("release"));
}

#[test]
fn clean_project_gets_not_needed_master() {
    let ws = Workspace::new();
    ws.write("libA/src/a/A.as", "package a {\n  public class A {}\n}\n");
    ws.write("libA/bin/libA.swc", "swc");
    ws.stamp_future("libA/bin/libA.swc", 3600);
    let sdk = ws.path("sdk");
    fs::create_dir_all(&sdk).unwrap();

    let mut config = ws.config();
    config.sdk_dir = Some(sdk);
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::vscode::execute(&config, &cache, &problems).unwrap();

    let doc = ws.read_json("libA/.vscode/tasks.json");
    let tasks = doc["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 2);
    for task in tasks {
        assert!(task["label"].as_str().unwrap().ends_with("(not needed)"));
        assert!(task.get("dependsOn").is_none());
    }
}

#[test]
fn existing_mascot_tasks_block_rewrite_unless_purged() {
    let ws = Workspace::new();
    seed_app_with_lib(&ws);
    ws.write(
        "app/.vscode/tasks.json",
        r#"{
  "version": "2.0.0",
  "tasks": [
    {"label": "user: lint", "type": "shell", "command": "lint"},
    {"label": "MASCOT: build old [debug]", "type": "shell", "command": "old"}
  ]
}
"#,
    );
    let sdk = ws.path("sdk");
    fs::create_dir_all(&sdk).unwrap();

    let mut config = ws.config();
    config.sdk_dir = Some(sdk.clone());
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::vscode::execute(&config, &cache, &problems).unwrap();

    // Without purge the stale mascot task blocks the write.
    let doc = ws.read_json("app/.vscode/tasks.json");
    let labels: Vec<&str> = doc["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["label"].as_str().unwrap())
        .collect();
    assert!(labels.contains(&"MASCOT: build old [debug]"));

    let mut config = ws.config();
    config.sdk_dir = Some(sdk);
    config.purge = true;
    emit::vscode::execute(&config, &cache, &problems).unwrap();

    let doc = ws.read_json("app/.vscode/tasks.json");
    let labels: Vec<String> = doc["tasks"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["label"].as_str().unwrap().to_string())
        .collect();
    assert!(labels.iter().any(|l| l == "user: lint"));
    assert!(!labels.iter().any(|l| l == "MASCOT: build old [debug]"));
    assert!(labels.iter().any(|l| l.starts_with("MASCOT: build app")));
}

#[test]
fn library_gets_include_sources_not_main_class() {
    let ws = Workspace::new();
    ws.write("libA/src/a/A.as", "package a {\n  public class A {}\n}\n");

    let config = ws.config();
    let (cache, problems) = ws.cache(&config);
    run_analysis(&config, &cache, &problems);
    emit::asconfig::execute(&config, &cache, &problems).unwrap();

    let asconfig = ws.read_json("libA/asconfig.json");
    assert_eq!(asconfig["compilerOptions"]["include-sources"], json!(["src"]));
    assert_eq!(asconfig["compilerOptions"]["source-path"], json!(["src"]));
    assert!(asconfig.get("mainClass").is_none());
    assert!(asconfig.get("files").is_none());
    assert_eq!(asconfig["copySourcePathAssets"], true);
    assert_eq!(asconfig["config"], "air");
}
