// MyPC Gateway - Safe Zone Registry
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Immutable, ordered set of safe zones: the root directories where
// mutation is permitted. Built once at startup from config.json or
// platform defaults (Documents, Downloads, Desktop). Containment is
// case-folded and directory-boundary aware, so zone .../Doc never
// claims .../Documents/x.

use crate::paths;
use std::path::PathBuf;

/// One configured safe zone, canonicalized once at load time.
#[derive(Debug, Clone)]
pub struct SafeZone {
    /// The path as configured (shown to users in zone listings).
    pub raw: String,
    /// Normalized absolute form.
    pub canonical: PathBuf,
    /// Case-folded form used for containment comparison.
    folded: String,
}

impl SafeZone {
    fn new(raw: &str) -> Self {
        let canonical = paths::normalize(raw);
        let folded = paths::fold_case(&canonical);
        Self {
            raw: raw.to_string(),
            canonical,
            folded,
        }
    }

    /// True iff `path` equals this zone's root or lies under it.
    /// Prefix tests use the separator-terminated zone form so string
    /// prefixes without a directory boundary never match.
    pub fn contains(&self, path: &str) -> bool {
        let folded_path = paths::fold_case(&paths::normalize(path));
        if folded_path.is_empty() {
            return false;
        }
        if folded_path == self.folded {
            return true;
        }
        folded_path.starts_with(&paths::with_trailing_separator(&self.folded))
    }
}

/// The ordered zone collection. No mutation after construction;
/// reconfiguration requires a process restart.
#[derive(Debug, Clone)]
pub struct ZoneRegistry {
    zones: Vec<SafeZone>,
}

impl ZoneRegistry {
    /// Build from configured zone paths; empty input falls back to the
    /// platform defaults so the registry is never empty.
    pub fn new(configured: &[String]) -> Self {
        let raw: Vec<String> = if configured.is_empty() {
            paths::default_zone_dirs()
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect()
        } else {
            configured.to_vec()
        };

        Self {
            zones: raw.iter().map(|z| SafeZone::new(z)).collect(),
        }
    }

    /// Build from explicit paths, no defaults. For tests and one-shot
    /// CLI checks against synthetic zone sets.
    pub fn from_paths(zone_paths: &[&str]) -> Self {
        Self {
            zones: zone_paths.iter().map(|z| SafeZone::new(z)).collect(),
        }
    }

    pub fn zones(&self) -> &[SafeZone] {
        &self.zones
    }

    /// True iff `path` is contained in at least one configured zone.
    pub fn is_in_any_zone(&self, path: &str) -> bool {
        self.zones.iter().any(|z| z.contains(path))
    }

    /// Formatted zone list for denial messages and user-facing listings.
    pub fn describe(&self) -> String {
        self.zones
            .iter()
            .map(|z| format!("  - {}", z.canonical.display()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zone_contains_itself() {
        let registry = ZoneRegistry::from_paths(&["/home/alice/Documents"]);
        assert!(registry.is_in_any_zone("/home/alice/Documents"));
    }

    #[test]
    fn zone_contains_children() {
        let registry = ZoneRegistry::from_paths(&["/home/alice/Documents"]);
        assert!(registry.is_in_any_zone("/home/alice/Documents/notes.txt"));
        assert!(registry.is_in_any_zone("/home/alice/Documents/sub/deep/file"));
    }

    #[test]
    fn prefix_collision_rejected() {
        // Zone /home/u/Doc must NOT contain /home/u/Documents/file.txt
        let registry = ZoneRegistry::from_paths(&["/home/u/Doc"]);
        assert!(!registry.is_in_any_zone("/home/u/Documents/file.txt"));
        assert!(registry.is_in_any_zone("/home/u/Doc/file.txt"));
    }

    #[test]
    fn outside_paths_rejected() {
        let registry = ZoneRegistry::from_paths(&["/home/alice/Documents"]);
        assert!(!registry.is_in_any_zone("/etc/passwd"));
        assert!(!registry.is_in_any_zone("/home/alice"));
        assert!(!registry.is_in_any_zone(""));
    }

    #[test]
    fn traversal_normalized_before_check() {
        let registry = ZoneRegistry::from_paths(&["/home/alice/Documents"]);
        assert!(!registry.is_in_any_zone("/home/alice/Documents/../.ssh/id_rsa"));
        assert!(registry.is_in_any_zone("/home/alice/Documents/a/../b.txt"));
    }

    #[test]
    fn multiple_zones_checked_in_order() {
        let registry = ZoneRegistry::from_paths(&["/zone/a", "/zone/b"]);
        assert!(registry.is_in_any_zone("/zone/a/x"));
        assert!(registry.is_in_any_zone("/zone/b/y"));
        assert!(!registry.is_in_any_zone("/zone/c/z"));
    }

    #[test]
    fn empty_config_falls_back_to_defaults() {
        if dirs::home_dir().is_some() {
            let registry = ZoneRegistry::new(&[]);
            assert!(!registry.zones().is_empty());
        }
    }

    #[test]
    fn describe_lists_every_zone() {
        let registry = ZoneRegistry::from_paths(&["/zone/a", "/zone/b"]);
        let listing = registry.describe();
        assert!(listing.contains("/zone/a"));
        assert!(listing.contains("/zone/b"));
    }
}
