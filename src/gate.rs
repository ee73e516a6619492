// MyPC Gateway - Permission Gate (Primary Enforcement Point)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Every mutating file tool call passes through here BEFORE touching
// disk. The gate is the sole place encoding the read/write/copy/move
// asymmetry:
//   Read                          — allowed anywhere
//   Write / Delete / CreateDir    — target must be in a safe zone
//   Move                          — BOTH endpoints must be in safe zones
//   Copy                          — only the DESTINATION must be in a zone
// The Copy asymmetry is intentional: arbitrary host files may be
// imported INTO a zone, but zone contents may not be copied out.
// The gate performs no existence checks; callers handle those.

use crate::zones::ZoneRegistry;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Closed set of filesystem operation kinds. Every file tool maps to
/// exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Read,
    Write,
    Move,
    Copy,
    Delete,
    CreateDirectory,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Read => "Read",
            Self::Write => "Write",
            Self::Move => "Move",
            Self::Copy => "Copy",
            Self::Delete => "Delete",
            Self::CreateDirectory => "CreateDirectory",
        };
        f.write_str(name)
    }
}

impl FromStr for OperationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "move" => Ok(Self::Move),
            "copy" => Ok(Self::Copy),
            "delete" => Ok(Self::Delete),
            "mkdir" | "create_directory" | "createdirectory" => Ok(Self::CreateDirectory),
            _ => Err(format!(
                "unknown operation '{}' (expected read/write/move/copy/delete/mkdir)",
                s
            )),
        }
    }
}

/// One gate question: an operation plus its path(s). Move and Copy
/// carry the destination in `secondary`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathQuery {
    pub op: OperationKind,
    pub primary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl PathQuery {
    pub fn new(op: OperationKind, primary: &str) -> Self {
        Self {
            op,
            primary: primary.to_string(),
            secondary: None,
        }
    }

    pub fn with_destination(op: OperationKind, primary: &str, secondary: &str) -> Self {
        Self {
            op,
            primary: primary.to_string(),
            secondary: Some(secondary.to_string()),
        }
    }
}

/// Gate decision, never partially allowed. The reason is user-facing:
/// denials name the violated zone requirement and list the configured
/// zones so the caller can self-correct.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub allowed: bool,
    pub reason: String,
}

impl Decision {
    fn allow(reason: &str) -> Self {
        Self {
            allowed: true,
            reason: reason.to_string(),
        }
    }

    fn deny(reason: String) -> Self {
        Self {
            allowed: false,
            reason,
        }
    }
}

/// The gate: pure decision function over an immutable zone registry.
/// Safe for unsynchronized concurrent use.
#[derive(Debug, Clone)]
pub struct PermissionGate {
    registry: ZoneRegistry,
}

impl PermissionGate {
    pub fn new(registry: ZoneRegistry) -> Self {
        Self { registry }
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.registry
    }

    /// Decide whether an operation is permitted. Priority order:
    /// Read short-circuits to allow; Move checks source then
    /// destination; Copy checks only the destination.
    pub fn decide(&self, query: &PathQuery) -> Decision {
        match query.op {
            OperationKind::Read => Decision::allow("Read operations are allowed anywhere"),

            OperationKind::Write | OperationKind::Delete | OperationKind::CreateDirectory => {
                if self.registry.is_in_any_zone(&query.primary) {
                    Decision::allow("Path is in a safe zone")
                } else {
                    Decision::deny(format!(
                        "{} operation denied. Path must be in a safe zone.\nPath: {}\n\nSafe Zones:\n{}",
                        query.op,
                        query.primary,
                        self.registry.describe(),
                    ))
                }
            }

            OperationKind::Move => {
                let Some(dest) = query.secondary.as_deref() else {
                    return Decision::deny("Move requires a destination path.".to_string());
                };
                if !self.registry.is_in_any_zone(&query.primary) {
                    return Decision::deny(format!(
                        "Cannot move from outside a safe zone.\nSource: {}\n\nSafe Zones:\n{}",
                        query.primary,
                        self.registry.describe(),
                    ));
                }
                if !self.registry.is_in_any_zone(dest) {
                    return Decision::deny(format!(
                        "Cannot move to outside a safe zone.\nDestination: {}\n\nSafe Zones:\n{}",
                        dest,
                        self.registry.describe(),
                    ));
                }
                Decision::allow("Both endpoints are in safe zones")
            }

            OperationKind::Copy => {
                let Some(dest) = query.secondary.as_deref() else {
                    return Decision::deny("Copy requires a destination path.".to_string());
                };
                // Source may be anywhere: import is allowed, export is not.
                if self.registry.is_in_any_zone(dest) {
                    Decision::allow("Copy destination is in a safe zone")
                } else {
                    Decision::deny(format!(
                        "Copy destination must be in a safe zone.\nDestination: {}\n\nSafe Zones:\n{}",
                        dest,
                        self.registry.describe(),
                    ))
                }
            }
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::ZoneRegistry;

    fn gate() -> PermissionGate {
        PermissionGate::new(ZoneRegistry::from_paths(&["/home/alice/Documents"]))
    }

    #[test]
    fn read_allowed_anywhere() {
        let g = gate();
        for p in ["/etc/passwd", "/home/alice/Documents/x", "/anything"] {
            let d = g.decide(&PathQuery::new(OperationKind::Read, p));
            assert!(d.allowed, "Read should be allowed for {}: {}", p, d.reason);
        }
    }

    #[test]
    fn write_allowed_inside_zone() {
        let d = gate().decide(&PathQuery::new(
            OperationKind::Write,
            "/home/alice/Documents/notes.txt",
        ));
        assert!(d.allowed, "{}", d.reason);
    }

    #[test]
    fn write_denied_outside_zone() {
        let d = gate().decide(&PathQuery::new(OperationKind::Write, "/etc/hosts"));
        assert!(!d.allowed);
        assert!(d.reason.contains("Write operation denied"));
        assert!(
            d.reason.contains("/home/alice/Documents"),
            "denial must list configured zones: {}",
            d.reason
        );
    }

    #[test]
    fn write_denied_on_prefix_collision() {
        // Documents2 shares a string prefix with the zone but is outside it
        let d = gate().decide(&PathQuery::new(
            OperationKind::Write,
            "/home/alice/Documents2/notes.txt",
        ));
        assert!(!d.allowed, "prefix collision must be denied");
    }

    #[test]
    fn delete_zone_root_allowed() {
        let d = gate().decide(&PathQuery::new(
            OperationKind::Delete,
            "/home/alice/Documents",
        ));
        assert!(d.allowed, "zone root equality case: {}", d.reason);
    }

    #[test]
    fn delete_denied_outside_zone() {
        let d = gate().decide(&PathQuery::new(OperationKind::Delete, "/home/alice/.bashrc"));
        assert!(!d.allowed);
        assert!(d.reason.contains("Delete operation denied"));
    }

    #[test]
    fn mkdir_follows_write_rule() {
        let g = gate();
        let inside = g.decide(&PathQuery::new(
            OperationKind::CreateDirectory,
            "/home/alice/Documents/newdir",
        ));
        assert!(inside.allowed);

        let outside = g.decide(&PathQuery::new(OperationKind::CreateDirectory, "/opt/newdir"));
        assert!(!outside.allowed);
        assert!(outside.reason.contains("CreateDirectory operation denied"));
    }

    #[test]
    fn copy_into_zone_allowed_from_anywhere() {
        let d = gate().decide(&PathQuery::with_destination(
            OperationKind::Copy,
            "/outside/file.txt",
            "/home/alice/Documents/file.txt",
        ));
        assert!(d.allowed, "import into zone must be allowed: {}", d.reason);
    }

    #[test]
    fn copy_out_of_zone_denied() {
        let d = gate().decide(&PathQuery::with_destination(
            OperationKind::Copy,
            "/home/alice/Documents/file.txt",
            "/outside/file.txt",
        ));
        assert!(!d.allowed, "export via copy must be denied");
        assert!(d.reason.contains("Copy destination must be in a safe zone"));
        assert!(d.reason.contains("/outside/file.txt"));
    }

    #[test]
    fn move_requires_both_endpoints_in_zone() {
        let g = gate();

        // Same arguments that Copy would allow
        let import = g.decide(&PathQuery::with_destination(
            OperationKind::Move,
            "/outside/a",
            "/home/alice/Documents/b",
        ));
        assert!(!import.allowed, "move from outside must be denied");
        assert!(import.reason.contains("Cannot move from outside"));

        let export = g.decide(&PathQuery::with_destination(
            OperationKind::Move,
            "/home/alice/Documents/a",
            "/outside/b",
        ));
        assert!(!export.allowed, "move to outside must be denied");
        assert!(export.reason.contains("Cannot move to outside"));

        let internal = g.decide(&PathQuery::with_destination(
            OperationKind::Move,
            "/home/alice/Documents/a",
            "/home/alice/Documents/sub/b",
        ));
        assert!(internal.allowed, "{}", internal.reason);
    }

    #[test]
    fn move_and_copy_without_destination_denied() {
        let g = gate();
        let m = g.decide(&PathQuery::new(OperationKind::Move, "/home/alice/Documents/a"));
        assert!(!m.allowed);
        let c = g.decide(&PathQuery::new(OperationKind::Copy, "/home/alice/Documents/a"));
        assert!(!c.allowed);
    }

    #[test]
    fn empty_path_never_in_zone() {
        let d = gate().decide(&PathQuery::new(OperationKind::Write, ""));
        assert!(!d.allowed);
    }

    #[test]
    fn operation_kind_parses_from_cli_strings() {
        assert_eq!("read".parse::<OperationKind>().unwrap(), OperationKind::Read);
        assert_eq!("Copy".parse::<OperationKind>().unwrap(), OperationKind::Copy);
        assert_eq!(
            "mkdir".parse::<OperationKind>().unwrap(),
            OperationKind::CreateDirectory
        );
        assert!("chown".parse::<OperationKind>().is_err());
    }
}
