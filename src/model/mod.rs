//! Serde data model for the cache artifacts that flow between pipeline stages.

pub mod classes;
pub mod graph;
pub mod project;

pub use classes::{AnalyzedClass, ClassEntry, Coupling, CouplingKind};
pub use graph::{BuildTask, DependencyNode, RootClass};
pub use project::{Descriptor, Project, RelatedClass};
