//! Path and timestamp helpers shared by the scanner and the emitters.

use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Renders a path with forward slashes regardless of platform.
///
/// Catalog entries and coupling resolution compare paths as strings, so
/// normalization happens once, at the moment a path enters the catalog.
pub fn to_forward_slashes(path: &Path) -> String {
    let raw = path.to_string_lossy();
    if raw.contains('\\') {
        raw.replace('\\', "/")
    } else {
        raw.into_owned()
    }
}

/// Joins a forward-slashed relative path onto a base directory.
pub fn join_slashed(base: &Path, rel: &str) -> PathBuf {
    let mut out = base.to_path_buf();
    for part in rel.split('/').filter(|p| !p.is_empty()) {
        out.push(part);
    }
    out
}

/// Infers a package from a forward-slashed relative class-file path:
/// directory separators become dots, the basename is dropped. A file at the
/// source root has no package.
pub fn package_from_rel_path(rel: &str) -> Option<String> {
    let dir = rel.rsplit_once('/')?.0;
    if dir.is_empty() {
        None
    } else {
        Some(dir.replace('/', "."))
    }
}

/// The relative path a class is expected to live at, given its package.
pub fn expected_rel_path(package: Option<&str>, class_name: &str, extension: &str) -> String {
    match package {
        Some(pkg) if !pkg.is_empty() => {
            format!("{}/{}.{}", pkg.replace('.', "/"), class_name, extension)
        }
        _ => format!("{}.{}", class_name, extension),
    }
}

/// File basename without its extension.
pub fn file_stem(rel_or_name: &str) -> &str {
    let base = rel_or_name.rsplit('/').next().unwrap_or(rel_or_name);
    match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    }
}

/// Lowercased extension of a forward-slashed path, if any.
pub fn extension(rel: &str) -> Option<String> {
    let base = rel.rsplit('/').next().unwrap_or(rel);
    let (stem, ext) = base.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

fn system_time_ms(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Most recent of mtime and ctime, in milliseconds since the epoch.
///
/// ctime is only observable on Unix; elsewhere the creation time substitutes
/// when the platform reports one.
pub fn timestamp_ms(meta: &Metadata) -> u64 {
    let modified = meta.modified().map(system_time_ms).unwrap_or(0);

    #[cfg(unix)]
    let changed = {
        use std::os::unix::fs::MetadataExt;
        let secs = meta.ctime().max(0) as u64;
        let nanos = meta.ctime_nsec().max(0) as u64;
        secs * 1000 + nanos / 1_000_000
    };
    #[cfg(not(unix))]
    let changed = meta.created().map(system_time_ms).unwrap_or(0);

    modified.max(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_from_rel_path() {
        assert_eq!(package_from_rel_path("a/b/C.as"), Some("a.b".to_string()));
        assert_eq!(package_from_rel_path("a/C.as"), Some("a".to_string()));
        assert_eq!(package_from_rel_path("C.as"), None);
    }

    #[test]
    fn test_expected_rel_path() {
        assert_eq!(expected_rel_path(Some("a.b"), "C", "as"), "a/b/C.as");
        assert_eq!(expected_rel_path(None, "Main", "as"), "Main.as");
        assert_eq!(expected_rel_path(Some(""), "Main", "as"), "Main.as");
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("a/b/C.as"), "C");
        assert_eq!(file_stem("Main.mxml"), "Main");
        assert_eq!(file_stem("noext"), "noext");
        assert_eq!(file_stem(".hidden"), ".hidden");
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("a/B.AS"), Some("as".to_string()));
        assert_eq!(extension("a/B.mxml"), Some("mxml".to_string()));
        assert_eq!(extension("a/README"), None);
    }

    #[test]
    fn test_join_slashed() {
        let base = Path::new("/w/app/src");
        assert_eq!(join_slashed(base, "m/M.as"), PathBuf::from("/w/app/src/m/M.as"));
    }

    #[test]
    fn test_timestamp_ms_is_recent() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let meta = file.path().metadata().unwrap();
        let now = system_time_ms(SystemTime::now());
        let ts = timestamp_ms(&meta);
        assert!(ts > 0);
        assert!(ts <= now + 1000);
    }
}
