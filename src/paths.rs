// MyPC Gateway - Path Normalization
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Single source of truth for path canonicalization used by zone
// containment checks. Purely lexical: never touches the disk, never
// fails. Case folding matches the platform filesystem (insensitive on
// Windows/macOS, sensitive elsewhere).

use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

/// Normalize a path for containment comparison.
///
/// - Empty input stays empty (matches no zone by construction).
/// - Relative paths are resolved against the current directory.
/// - `.` segments are dropped; `..` consumes the preceding segment and
///   cannot escape the filesystem root.
/// - Symlinks are NOT resolved: normalization must succeed for paths
///   that do not exist yet (new files, mkdir targets).
///
/// Idempotent: `normalize(normalize(p)) == normalize(p)`.
pub fn normalize(path: &str) -> PathBuf {
    if path.is_empty() {
        return PathBuf::new();
    }

    let raw = Path::new(path);
    let absolute = if raw.is_absolute() {
        raw.to_path_buf()
    } else {
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(raw),
            Err(_) => raw.to_path_buf(),
        }
    };

    let mut prefix: Option<PathBuf> = None;
    let mut has_root = false;
    let mut segments: Vec<std::ffi::OsString> = Vec::new();

    for comp in absolute.components() {
        match comp {
            Component::Prefix(p) => prefix = Some(PathBuf::from(p.as_os_str())),
            Component::RootDir => has_root = true,
            Component::CurDir => {}
            Component::ParentDir => {
                // Absolute paths only: `..` at the root is a no-op.
                segments.pop();
            }
            Component::Normal(part) => segments.push(part.to_os_string()),
        }
    }

    let mut out = prefix.unwrap_or_default();
    if has_root {
        out.push(MAIN_SEPARATOR.to_string());
    }
    for seg in segments {
        out.push(seg);
    }
    out
}

/// Case-fold a normalized path into the string form used for
/// containment comparison. Folding only applies on filesystems that
/// are case-insensitive by default.
pub fn fold_case(path: &Path) -> String {
    let s = path.to_string_lossy();
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        s.to_lowercase()
    } else {
        s.to_string()
    }
}

/// Append the platform separator if absent. Used ONLY for prefix tests
/// in containment, never for equality, so a zone root is never
/// conflated with its trailing-slash variant.
pub fn with_trailing_separator(folded: &str) -> String {
    if folded.ends_with(MAIN_SEPARATOR) {
        folded.to_string()
    } else {
        format!("{}{}", folded, MAIN_SEPARATOR)
    }
}

/// Platform default safe zones: the user's Documents, Downloads and
/// Desktop directories. Falls back to `~/Documents` etc. when the
/// platform lookup has no answer for a directory.
pub fn default_zone_dirs() -> Vec<PathBuf> {
    let home = dirs::home_dir();
    let fallback = |name: &str| home.as_ref().map(|h| h.join(name));

    [
        dirs::document_dir().or_else(|| fallback("Documents")),
        dirs::download_dir().or_else(|| fallback("Downloads")),
        dirs::desktop_dir().or_else(|| fallback("Desktop")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_path_stays_empty() {
        assert_eq!(normalize(""), PathBuf::new());
    }

    #[test]
    fn absolute_path_passes_through() {
        assert_eq!(normalize("/home/alice/notes.txt"), PathBuf::from("/home/alice/notes.txt"));
    }

    #[test]
    fn dot_segments_removed() {
        assert_eq!(normalize("/home/./alice/./x"), PathBuf::from("/home/alice/x"));
    }

    #[test]
    fn parent_segments_resolved() {
        assert_eq!(normalize("/home/alice/../bob/file"), PathBuf::from("/home/bob/file"));
    }

    #[test]
    fn parent_cannot_escape_root() {
        assert_eq!(normalize("/../../etc/passwd"), PathBuf::from("/etc/passwd"));
    }

    #[test]
    fn relative_path_becomes_absolute() {
        let n = normalize("some/relative/file.txt");
        assert!(n.is_absolute(), "expected absolute, got {:?}", n);
    }

    #[test]
    fn normalization_is_idempotent() {
        for p in ["/home/alice/../bob/x", "/a/./b/c", "rel/path", "/"] {
            let once = normalize(p);
            let twice = normalize(&once.to_string_lossy());
            assert_eq!(once, twice, "not idempotent for {}", p);
        }
    }

    #[test]
    fn trailing_separator_added_once() {
        let sep = MAIN_SEPARATOR;
        let z = format!("{}home{}alice", sep, sep);
        let t = with_trailing_separator(&z);
        assert!(t.ends_with(sep));
        assert_eq!(with_trailing_separator(&t), t);
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    #[test]
    fn fold_case_preserves_on_case_sensitive_fs() {
        assert_eq!(fold_case(Path::new("/Home/Alice")), "/Home/Alice");
    }

    #[test]
    fn default_zones_non_empty_with_home() {
        if dirs::home_dir().is_some() {
            let zones = default_zone_dirs();
            assert_eq!(zones.len(), 3);
            assert!(zones.iter().all(|z| z.is_absolute()));
        }
    }
}
