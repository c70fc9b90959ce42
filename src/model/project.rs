//! Project catalog entities produced by the shallow scanner.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::util::fs::join_slashed;

/// An application descriptor (`<name>-app.xml`) found next to the source
/// root, kept only when it names an existing class.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Descriptor {
    pub simple_name: String,
    pub file_name: String,
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_class: Option<RelatedClass>,
}

/// The class a descriptor marks as an application entry point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelatedClass {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

/// One compilable unit: a directory whose immediate children include the
/// source root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub home: PathBuf,
    pub name: String,
    /// Relative to the source root, forward-slashed.
    pub class_files: Vec<String>,
    pub asset_files: Vec<String>,
    pub has_lib_dir: bool,
    pub has_binaries: bool,
    pub has_app_binary: bool,
    pub descriptors: Vec<Descriptor>,
    /// Milliseconds; zero when the project has no class files.
    pub code_timestamp: u64,
    pub binary_timestamp: u64,
    pub is_dirty: bool,
    pub is_app_probability: f64,
}

impl Project {
    pub fn is_app(&self) -> bool {
        self.is_app_probability >= 0.5
    }

    pub fn source_root(&self, src_dir: &str) -> PathBuf {
        self.home.join(src_dir)
    }

    /// Absolute path of a catalog class file.
    pub fn class_file_path(&self, src_dir: &str, rel: &str) -> PathBuf {
        join_slashed(&self.source_root(src_dir), rel)
    }
}

/// Strips every character outside `[A-Za-z0-9$_.\-]` from a directory base
/// name to form the project name.
pub fn project_name(home: &Path) -> String {
    home.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '$' | '_' | '.' | '-'))
        .collect()
}
