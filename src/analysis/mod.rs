//! Static source analysis: regex-grade declaration and coupling extraction,
//! plus resolution of couplings against the project catalog.

pub mod extract;
pub mod resolve;

pub use extract::{Declaration, RawCoupling, SourceExtractor};
pub use resolve::Resolver;
