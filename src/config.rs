//! Configuration for a mascot run.
//!
//! Directory locations and output defaults come from `MASCOT_*` environment
//! variables with sensible fallbacks; structured inputs (manual dependency
//! amendments, the asconfig base object, worker registrations, editor
//! settings) come from an optional JSON config file; CLI flags overlay both.
//!
//! # Environment Variables
//!
//! - `MASCOT_WORKSPACE`: workspace directory - default: "."
//! - `MASCOT_CACHE_DIR`: cache directory - default: ".mascot"
//! - `MASCOT_SDK`: ActionScript SDK directory (required when emitting)
//! - `MASCOT_BIN_DIR`: binary directory name inside a project - default: "bin"
//! - `MASCOT_SRC_DIR`: source root name inside a project - default: "src"
//! - `MASCOT_CONFIG_TYPE`: asconfig `config` value - default: "air"
//! - `MASCOT_LOG_LEVEL`: logging level - default: "info"

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DEFAULT_CACHE_DIR: &str = ".mascot";
const DEFAULT_BIN_DIR: &str = "bin";
const DEFAULT_SRC_DIR: &str = "src";
const DEFAULT_CONFIG_TYPE: &str = "air";
const DEFAULT_COPY_ASSETS: bool = true;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Workspace directory does not exist: {0}")]
    MissingWorkspace(PathBuf),

    #[error("SDK directory is required when emitting configuration. Set MASCOT_SDK or pass --sdk")]
    MissingSdk,

    #[error("SDK directory does not exist: {0}")]
    MissingSdkDir(PathBuf),

    #[error("Directory names must not be empty or contain path separators: {0:?}")]
    InvalidDirName(String),

    #[error("Failed to read config file {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    ParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A manual-dependency hint: couplings the extractor cannot detect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Amendment {
    pub project: PathBuf,
    pub dependencies: Vec<PathBuf>,
}

/// A standalone worker project whose app output goes to a caller-chosen path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalWorker {
    pub project: PathBuf,
    pub output: String,
}

/// An auxiliary compilable unit co-located within another project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalWorker {
    pub file: String,
    pub output: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InternalWorkerSet {
    pub project: PathBuf,
    pub workers: Vec<InternalWorker>,
}

/// The JSON config file shape. Everything is optional; absent fields keep
/// the environment-derived defaults.
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    config: Option<String>,
    #[serde(default)]
    bin_dir: Option<String>,
    #[serde(default)]
    src_dir: Option<String>,
    #[serde(default)]
    copy_assets: Option<bool>,
    #[serde(default)]
    debug: Option<bool>,
    #[serde(default)]
    sdk: Option<PathBuf>,
    #[serde(default)]
    amendments: Vec<Amendment>,
    #[serde(default)]
    asconfig: Option<Value>,
    #[serde(default)]
    settings: Map<String, Value>,
    #[serde(default)]
    external_workers: Vec<ExternalWorker>,
    #[serde(default)]
    internal_workers: Vec<InternalWorkerSet>,
}

#[derive(Debug, Clone)]
pub struct MascotConfig {
    /// Directory containing the project roots side by side.
    pub workspace: PathBuf,
    /// Where the intermediate JSON artifacts and problems.log live.
    pub cache_dir: PathBuf,
    /// ActionScript SDK home, required by the emitters.
    pub sdk_dir: Option<PathBuf>,
    pub bin_dir: String,
    pub src_dir: String,
    /// asconfig `config` value, e.g. "air" or "flex".
    pub config_type: String,
    pub copy_assets: bool,
    /// `compilerOptions.debug` in emitted asconfig files.
    pub debug: bool,
    /// Disables the dirtiness filter: every planned task survives.
    pub rebuild_all: bool,
    /// Replace existing asconfig.json files.
    pub overwrite: bool,
    /// Replace existing editor settings and mascot-owned tasks.
    pub purge: bool,
    pub amendments: Vec<Amendment>,
    /// Caller-supplied base object merged under every emitted asconfig.
    pub asconfig_base: Option<Value>,
    /// Extra keys for .vscode/settings.json; `$sdk` aliases the SDK key.
    pub editor_settings: Map<String, Value>,
    pub external_workers: Vec<ExternalWorker>,
    pub internal_workers: Vec<InternalWorkerSet>,
}

impl Default for MascotConfig {
    fn default() -> Self {
        let workspace = env::var("MASCOT_WORKSPACE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));
        let cache_dir = env::var("MASCOT_CACHE_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CACHE_DIR));
        let sdk_dir = env::var("MASCOT_SDK").ok().map(PathBuf::from);
        let bin_dir = env::var("MASCOT_BIN_DIR").unwrap_or_else(|_| DEFAULT_BIN_DIR.to_string());
        let src_dir = env::var("MASCOT_SRC_DIR").unwrap_or_else(|_| DEFAULT_SRC_DIR.to_string());
        let config_type =
            env::var("MASCOT_CONFIG_TYPE").unwrap_or_else(|_| DEFAULT_CONFIG_TYPE.to_string());

        Self {
            workspace,
            cache_dir,
            sdk_dir,
            bin_dir,
            src_dir,
            config_type,
            copy_assets: DEFAULT_COPY_ASSETS,
            debug: false,
            rebuild_all: false,
            overwrite: false,
            purge: false,
            amendments: Vec::new(),
            asconfig_base: None,
            editor_settings: Map::new(),
            external_workers: Vec::new(),
            internal_workers: Vec::new(),
        }
    }
}

impl MascotConfig {
    /// Overlays the JSON config file onto the current values.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile =
            serde_json::from_str(&text).map_err(|source| ConfigError::ParseFailed {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(config) = file.config {
            self.config_type = config;
        }
        if let Some(bin_dir) = file.bin_dir {
            self.bin_dir = bin_dir;
        }
        if let Some(src_dir) = file.src_dir {
            self.src_dir = src_dir;
        }
        if let Some(copy_assets) = file.copy_assets {
            self.copy_assets = copy_assets;
        }
        if let Some(debug) = file.debug {
            self.debug = debug;
        }
        if let Some(sdk) = file.sdk {
            self.sdk_dir = Some(sdk);
        }
        self.amendments.extend(file.amendments);
        if let Some(base) = file.asconfig {
            self.asconfig_base = Some(base);
        }
        self.editor_settings.extend(file.settings);
        self.external_workers.extend(file.external_workers);
        self.internal_workers.extend(file.internal_workers);
        Ok(())
    }

    /// Checks the invariants every stage relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.workspace.is_dir() {
            return Err(ConfigError::MissingWorkspace(self.workspace.clone()));
        }
        for name in [&self.bin_dir, &self.src_dir] {
            if name.is_empty() || name.contains('/') || name.contains('\\') {
                return Err(ConfigError::InvalidDirName(name.clone()));
            }
        }
        Ok(())
    }

    /// Additional checks for the emit stages, which need an SDK.
    pub fn validate_for_emit(&self) -> Result<(), ConfigError> {
        self.validate()?;
        match &self.sdk_dir {
            None => Err(ConfigError::MissingSdk),
            Some(sdk) if !sdk.is_dir() => Err(ConfigError::MissingSdkDir(sdk.clone())),
            Some(_) => Ok(()),
        }
    }

    /// The registered output override for an external worker project, if any.
    pub fn external_worker_output(&self, project: &Path) -> Option<&str> {
        self.external_workers
            .iter()
            .find(|w| w.project == project)
            .map(|w| w.output.as_str())
    }

    /// Internal workers registered for a project, if any.
    pub fn internal_workers_for(&self, project: &Path) -> Option<&[InternalWorker]> {
        self.internal_workers
            .iter()
            .find(|set| set.project == project)
            .map(|set| set.workers.as_slice())
    }
}

impl fmt::Display for MascotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mascot Configuration:")?;
        writeln!(f, "  Workspace: {}", self.workspace.display())?;
        writeln!(f, "  Cache Dir: {}", self.cache_dir.display())?;
        match &self.sdk_dir {
            Some(sdk) => writeln!(f, "  SDK: {}", sdk.display())?,
            None => writeln!(f, "  SDK: not set")?,
        }
        writeln!(f, "  Bin Dir: {}", self.bin_dir)?;
        writeln!(f, "  Src Dir: {}", self.src_dir)?;
        writeln!(f, "  Config Type: {}", self.config_type)?;
        writeln!(f, "  Copy Assets: {}", self.copy_assets)?;
        writeln!(f, "  Rebuild All: {}", self.rebuild_all)?;
        writeln!(f, "  Amendments: {}", self.amendments.len())?;
        Ok(())
    }
}
