//! Resolution of couplings against the project catalog.
//!
//! First match wins, in catalog order, then class-file order within a
//! project; the choice is recorded on the coupling so downstream consumers
//! and tests can verify it. Resolution is stable across runs because both
//! orders are preserved from the catalog.

use std::path::PathBuf;

use crate::model::Project;
use crate::util::fs::to_forward_slashes;

struct CandidateClass {
    project: PathBuf,
    abs_path: PathBuf,
    /// Forward-slashed absolute form used for suffix matching.
    abs_slashed: String,
}

pub struct Resolver {
    candidates: Vec<CandidateClass>,
}

impl Resolver {
    pub fn new(projects: &[Project], src_dir: &str) -> Self {
        let mut candidates = Vec::new();
        for project in projects {
            for rel in &project.class_files {
                let abs_path = project.class_file_path(src_dir, rel);
                let abs_slashed = to_forward_slashes(&abs_path);
                candidates.push(CandidateClass {
                    project: project.home.clone(),
                    abs_path,
                    abs_slashed,
                });
            }
        }
        Self { candidates }
    }

    /// The first catalog class file whose absolute path ends in
    /// `/<expected_rel_path>`. The separator keeps `A.as` from matching
    /// `NotA.as`.
    pub fn resolve(&self, expected_rel_path: &str) -> Option<(&PathBuf, &PathBuf)> {
        let suffix = format!("/{}", expected_rel_path);
        self.candidates
            .iter()
            .find(|c| c.abs_slashed.ends_with(&suffix))
            .map(|c| (&c.project, &c.abs_path))
    }
}
