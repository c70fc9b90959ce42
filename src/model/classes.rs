//! Class catalog entities produced by the deep scanner.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a coupling was expressed in source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouplingKind {
    Import,
    FqnInstantiation,
    /// Injected by a manual-dependency amendment rather than found in source.
    Patch,
}

/// A class declaration extracted (or inferred) from one catalog class file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedClass {
    pub file: PathBuf,
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub expected_rel_path: String,
    pub path_matches_package: bool,
    /// Home path of the owning project.
    pub project: PathBuf,
}

/// A directed reference from one class to another, resolved against the
/// project catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupling {
    pub class_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    pub expected_rel_path: String,
    pub kind: CouplingKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matching_project: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_class_file: Option<PathBuf>,
    pub class_exists: bool,
}

/// One row of `classes.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassEntry {
    pub analyzed_class: AnalyzedClass,
    pub class_couplings: Vec<Coupling>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coupling_kind_serializes_snake_case() {
        let json = serde_json::to_string(&CouplingKind::FqnInstantiation).unwrap();
        assert_eq!(json, "\"fqn_instantiation\"");
        let json = serde_json::to_string(&CouplingKind::Patch).unwrap();
        assert_eq!(json, "\"patch\"");
    }

    #[test]
    fn test_class_entry_round_trip() {
        let entry = ClassEntry {
            analyzed_class: AnalyzedClass {
                file: PathBuf::from("/w/app/src/m/M.as"),
                class_name: "M".to_string(),
                package: Some("m".to_string()),
                expected_rel_path: "m/M.as".to_string(),
                path_matches_package: true,
                project: PathBuf::from("/w/app"),
            },
            class_couplings: vec![Coupling {
                class_name: "A".to_string(),
                package: Some("a".to_string()),
                expected_rel_path: "a/A.as".to_string(),
                kind: CouplingKind::Import,
                matching_project: Some(PathBuf::from("/w/libA")),
                expected_class_file: Some(PathBuf::from("/w/libA/src/a/A.as")),
                class_exists: true,
            }],
        };
        let json = serde_json::to_string_pretty(&entry).unwrap();
        let back: ClassEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back.analyzed_class.class_name, "M");
        assert_eq!(back.class_couplings.len(), 1);
        assert_eq!(back.class_couplings[0].kind, CouplingKind::Import);
    }
}
