use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Workspace-level build configuration generator for ActionScript projects
#[derive(Parser, Debug)]
#[command(
    name = "mascot",
    about = "Workspace-level build configuration generator for ActionScript projects",
    version,
    long_about = "mascot discovers ActionScript projects in a workspace, infers the \
                  inter-project dependency graph from imports and qualified \
                  instantiations, orders the projects topologically, works out which \
                  ones are stale, and emits asconfig.json plus VS Code task files \
                  that drive an external compiler."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    /// Logging level (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Increase verbosity (equivalent to --log-level debug)
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the workspace and write the project catalog
    Scan(StageArgs),

    /// Analyze class files and resolve couplings (applies manual
    /// dependency amendments from the config file, if any)
    Analyze(StageArgs),

    /// Fold couplings into the project dependency graph
    Deps(StageArgs),

    /// Plan per-project build tasks and filter them by dirtiness
    Plan(PlanArgs),

    /// Emit asconfig.json and .vscode files for every project
    Emit(EmitArgs),

    /// Run the entire pipeline end to end
    Full(FullArgs),
}

#[derive(Args, Debug, Clone)]
pub struct StageArgs {
    /// Workspace directory (default: MASCOT_WORKSPACE or ".")
    #[arg(short = 'w', long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,

    /// Cache directory (default: MASCOT_CACHE_DIR or ".mascot")
    #[arg(short = 'C', long, value_name = "DIR")]
    pub cache: Option<PathBuf>,

    /// JSON config file with amendments, asconfig base, workers, settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct PlanArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// Keep every planned task regardless of timestamps
    #[arg(long)]
    pub rebuild_all: bool,
}

#[derive(Args, Debug, Clone)]
pub struct EmitArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// ActionScript SDK directory (default: MASCOT_SDK)
    #[arg(long, value_name = "DIR")]
    pub sdk: Option<PathBuf>,

    /// Replace existing asconfig.json files
    #[arg(long)]
    pub overwrite: bool,

    /// Replace existing editor settings and mascot-owned tasks
    #[arg(long)]
    pub purge: bool,
}

#[derive(Args, Debug, Clone)]
pub struct FullArgs {
    #[command(flatten)]
    pub stage: StageArgs,

    /// ActionScript SDK directory (default: MASCOT_SDK)
    #[arg(long, value_name = "DIR")]
    pub sdk: Option<PathBuf>,

    /// Replace existing asconfig.json files
    #[arg(long)]
    pub overwrite: bool,

    /// Replace existing editor settings and mascot-owned tasks
    #[arg(long)]
    pub purge: bool,

    /// Keep every planned task regardless of timestamps
    #[arg(long)]
    pub rebuild_all: bool,
}
