//! Regex-grade extraction of declarations and couplings from ActionScript
//! source text.
//!
//! This is deliberately not a parser: the downstream goal is coupling
//! discovery, not compilation. Declarations split across comments or built
//! at runtime escape detection; such cases surface through the problems
//! channel, not through heroic recovery.

use anyhow::{Context, Result};
use regex::Regex;

use crate::model::CouplingKind;

const IDENT: &str = r"[A-Za-z_$][A-Za-z0-9_$]*";

/// The package and class declared at the top of a `.as` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// `None` covers both `package {` and a missing package statement.
    pub package: Option<String>,
    pub class_name: Option<String>,
}

/// An outgoing reference as written in source, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCoupling {
    pub qualified_name: String,
    pub kind: CouplingKind,
}

pub struct SourceExtractor {
    package_re: Regex,
    class_re: Regex,
    import_re: Regex,
    new_fqn_re: Regex,
}

impl SourceExtractor {
    pub fn new() -> Result<Self> {
        let dotted = format!(r"{IDENT}(?:\.{IDENT})*");
        Ok(Self {
            package_re: Regex::new(&format!(r"package(?:\s+({dotted}))?\s*\{{"))
                .context("invalid package pattern")?,
            class_re: Regex::new(&format!(r"\bclass\s+({IDENT})"))
                .context("invalid class pattern")?,
            import_re: Regex::new(&format!(r"\bimport\s+({dotted})\s*;"))
                .context("invalid import pattern")?,
            // At least one dot: a bare `new X` is not a coupling.
            new_fqn_re: Regex::new(&format!(r"\bnew\s+({IDENT}(?:\.{IDENT})+)"))
                .context("invalid instantiation pattern")?,
        })
    }

    /// First `package … {` and first `class …` occurrences in the text.
    pub fn declaration(&self, text: &str) -> Declaration {
        let package = self
            .package_re
            .captures(text)
            .and_then(|cap| cap.get(1).map(|m| m.as_str().to_string()));
        let class_name = self
            .class_re
            .captures(text)
            .map(|cap| cap[1].to_string());
        Declaration {
            package,
            class_name,
        }
    }

    /// Every `import …;` followed by every qualified `new …`, each in
    /// document order.
    pub fn couplings(&self, text: &str) -> Vec<RawCoupling> {
        let mut out = Vec::new();
        for cap in self.import_re.captures_iter(text) {
            out.push(RawCoupling {
                qualified_name: cap[1].to_string(),
                kind: CouplingKind::Import,
            });
        }
        for cap in self.new_fqn_re.captures_iter(text) {
            out.push(RawCoupling {
                qualified_name: cap[1].to_string(),
                kind: CouplingKind::FqnInstantiation,
            });
        }
        out
    }
}

/// Splits a dotted qualified name into `(package, class)`.
pub fn split_qualified(qualified: &str) -> (Option<String>, String) {
    match qualified.rsplit_once('.') {
        Some((pkg, class)) => (Some(pkg.to_string()), class.to_string()),
        None => (None, qualified.to_string()),
    }
}
