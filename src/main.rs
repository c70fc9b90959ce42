use mascot::cli::commands::{CliArgs, Commands, EmitArgs, FullArgs, PlanArgs, StageArgs};
use mascot::config::MascotConfig;
use mascot::emit;
use mascot::pipeline::{phases, Pipeline};
use mascot::{CacheDir, ProblemLog, VERSION};

use clap::Parser;
use mascot::util::{init_from_env, init_logging, parse_level, LoggingConfig};
use std::path::PathBuf;
use std::process;
use tracing::{debug, error, Level};

fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("mascot v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Scan(stage) => handle_scan(stage),
        Commands::Analyze(stage) => handle_analyze(stage),
        Commands::Deps(stage) => handle_deps(stage),
        Commands::Plan(plan) => handle_plan(plan),
        Commands::Emit(emit_args) => handle_emit(emit_args),
        Commands::Full(full) => handle_full(full),
    };

    process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let level = if let Some(level_str) = &args.log_level {
        parse_level(level_str)
    } else if args.verbose {
        Level::DEBUG
    } else if args.quiet {
        Level::ERROR
    } else {
        return init_from_env();
    };
    init_logging(LoggingConfig::with_level(level));
}

/// Builds the run configuration: environment defaults, then the JSON config
/// file, then CLI flags.
fn build_config(stage: &StageArgs) -> Result<MascotConfig, i32> {
    let mut config = MascotConfig::default();

    if let Some(file) = &stage.config {
        if let Err(e) = config.apply_file(file) {
            error!("Configuration error: {}", e);
            eprintln!("Configuration error: {}", e);
            return Err(1);
        }
    }
    if let Some(workspace) = &stage.workspace {
        config.workspace = workspace.clone();
    }
    if let Some(cache) = &stage.cache {
        config.cache_dir = cache.clone();
    }

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("Configuration error: {}", e);
        return Err(1);
    }
    debug!("Resolved configuration:\n{}", config);
    Ok(config)
}

fn open_cache(config: &MascotConfig) -> Result<(CacheDir, ProblemLog), i32> {
    let cache = CacheDir::new(config.cache_dir.clone());
    if let Err(e) = cache.ensure() {
        error!("Cache error: {:#}", e);
        eprintln!("Cache error: {:#}", e);
        return Err(1);
    }
    let problems = ProblemLog::new(&cache);
    Ok((cache, problems))
}

fn handle_scan(stage: &StageArgs) -> i32 {
    let config = match build_config(stage) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (cache, problems) = match open_cache(&config) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    match phases::scan::execute(&config, &cache, &problems) {
        Ok(projects) => {
            println!("Cataloged {} projects", projects.len());
            0
        }
        Err(e) => {
            error!("Scan failed: {:#}", e);
            eprintln!("Scan failed: {:#}", e);
            1
        }
    }
}

fn handle_analyze(stage: &StageArgs) -> i32 {
    let config = match build_config(stage) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (cache, problems) = match open_cache(&config) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let entries = match phases::analyze::execute(&config, &cache, &problems) {
        Ok(Some(entries)) => entries,
        Ok(None) => return 1,
        Err(e) => {
            error!("Analysis failed: {:#}", e);
            eprintln!("Analysis failed: {:#}", e);
            return 1;
        }
    };

    if !config.amendments.is_empty() {
        if let Err(e) = phases::amend::execute(&config, &cache, &problems) {
            error!("Dependency patching failed: {:#}", e);
            eprintln!("Dependency patching failed: {:#}", e);
            return 1;
        }
    }

    println!("Analyzed {} classes", entries.len());
    0
}

fn handle_deps(stage: &StageArgs) -> i32 {
    let config = match build_config(stage) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let (cache, problems) = match open_cache(&config) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    match phases::dependencies::execute(&cache, &problems) {
        Ok(Some(graph)) => {
            println!("Dependency graph has {} nodes", graph.len());
            0
        }
        Ok(None) => 1,
        Err(e) => {
            error!("Dependency graph failed: {:#}", e);
            eprintln!("Dependency graph failed: {:#}", e);
            1
        }
    }
}

fn handle_plan(plan: &PlanArgs) -> i32 {
    let mut config = match build_config(&plan.stage) {
        Ok(c) => c,
        Err(code) => return code,
    };
    config.rebuild_all = plan.rebuild_all;
    let (cache, problems) = match open_cache(&config) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    let planned = match phases::build_order::execute(&cache, &problems) {
        Ok(Some(tasks)) => tasks,
        Ok(None) => return 1,
        Err(e) => {
            error!("Task planning failed: {:#}", e);
            eprintln!("Task planning failed: {:#}", e);
            return 1;
        }
    };

    match phases::dirty::execute(&config, &cache, &problems) {
        Ok(Some(filtered)) => {
            let remaining: usize = filtered.iter().map(|t| t.num_tasks).sum();
            println!(
                "Planned {} build lists, {} tasks after dirtiness filter",
                planned.len(),
                remaining
            );
            0
        }
        Ok(None) => 1,
        Err(e) => {
            error!("Dirtiness filtering failed: {:#}", e);
            eprintln!("Dirtiness filtering failed: {:#}", e);
            1
        }
    }
}

fn handle_emit(emit_args: &EmitArgs) -> i32 {
    let mut config = match build_config(&emit_args.stage) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Some(sdk) = &emit_args.sdk {
        config.sdk_dir = Some(sdk.clone());
    }
    config.overwrite = emit_args.overwrite;
    config.purge = emit_args.purge;

    if let Err(e) = config.validate_for_emit() {
        error!("Configuration error: {}", e);
        eprintln!("Configuration error: {}", e);
        return 1;
    }
    let (cache, problems) = match open_cache(&config) {
        Ok(pair) => pair,
        Err(code) => return code,
    };

    if let Err(e) = emit::asconfig::execute(&config, &cache, &problems) {
        error!("Config emission failed: {:#}", e);
        eprintln!("Config emission failed: {:#}", e);
        return 1;
    }
    if let Err(e) = emit::vscode::execute(&config, &cache, &problems) {
        error!("Editor config emission failed: {:#}", e);
        eprintln!("Editor config emission failed: {:#}", e);
        return 1;
    }

    println!("Emitted project configuration");
    0
}

fn handle_full(full: &FullArgs) -> i32 {
    let mut config = match build_config(&full.stage) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Some(sdk) = &full.sdk {
        config.sdk_dir = Some(sdk.clone());
    }
    config.overwrite = full.overwrite;
    config.purge = full.purge;
    config.rebuild_all = full.rebuild_all;

    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        eprintln!("Configuration error: {}", e);
        return 1;
    }

    match Pipeline::new(&config).run() {
        Ok(()) => {
            let problems_path: PathBuf = config.cache_dir.join(mascot::cache::PROBLEMS_FILE);
            println!("Pipeline complete. Problems log: {}", problems_path.display());
            0
        }
        Err(e) => {
            error!("Pipeline failed: {:#}", e);
            eprintln!("Pipeline failed: {:#}", e);
            1
        }
    }
}
