// MyPC Gateway - File Tools
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Tool executors behind the MCP transport. Permission model:
//   READ tools  — allowed anywhere
//   WRITE tools — safe zones only, gate consulted BEFORE touching disk
//   COPY        — into safe zones from anywhere, never out of them
// Every function returns a descriptive string, success and failure
// alike. Nothing here raises across the tool boundary; the transport
// only ever sees text. Denials render the gate reason verbatim.

use crate::encoding;
use crate::gate::{OperationKind, PathQuery, PermissionGate};
use chrono::{DateTime, Local};
use std::fs;
use std::path::Path;
use std::time::SystemTime;

const DEFAULT_MAX_LINES: usize = 500;

fn format_size(size: u64) -> String {
    if size < 1024 {
        format!("{} B", size)
    } else if size < 1024 * 1024 {
        format!("{} KB", size / 1024)
    } else {
        format!("{} MB", size / (1024 * 1024))
    }
}

fn format_time(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M").to_string()
}

fn format_time_long(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S").to_string()
}

// ============================================================================
// READ TOOLS — allowed anywhere
// ============================================================================

/// List directory contents with sizes and modification times.
pub fn list_directory(path: &str) -> String {
    let dir = Path::new(path);
    if !dir.exists() {
        return format!("Error: Path does not exist: {}", path);
    }
    if !dir.is_dir() {
        return format!("Error: Not a directory: {}", path);
    }

    let entries = match fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => return format!("Error listing directory: {}", e),
    };

    let mut lines = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(_) => continue,
        };
        let name = entry.file_name().to_string_lossy().to_string();
        match entry.metadata() {
            Ok(meta) => {
                let mtime = meta
                    .modified()
                    .map(format_time)
                    .unwrap_or_else(|_| "unknown".to_string());
                if meta.is_dir() {
                    lines.push(format!("[DIR]  {}/  ({})", name, mtime));
                } else {
                    lines.push(format!("[FILE] {}  ({}, {})", name, format_size(meta.len()), mtime));
                }
            }
            Err(_) => lines.push(format!("[???]  {}  (Permission Denied)", name)),
        }
    }

    if lines.is_empty() {
        return format!("Directory is empty: {}", path);
    }
    lines.sort();
    format!("Contents of {}:\n{}", path, lines.join("\n"))
}

/// Read a text file, truncated at `max_lines`. Non-UTF-8 content goes
/// through the ordered encoding fallback instead of failing.
pub fn read_file(path: &str, max_lines: Option<usize>) -> String {
    let max_lines = max_lines.unwrap_or(DEFAULT_MAX_LINES);
    let file = Path::new(path);
    if !file.exists() {
        return format!("Error: File does not exist: {}", path);
    }
    if !file.is_file() {
        return format!("Error: Not a file: {}", path);
    }

    let bytes = match fs::read(file) {
        Ok(b) => b,
        Err(e) => return format!("Error reading file: {}", e),
    };
    let content = encoding::decode(&bytes);

    let mut lines: Vec<&str> = Vec::new();
    for (i, line) in content.lines().enumerate() {
        if i >= max_lines {
            return format!(
                "{}\n\n... (truncated at {} lines)",
                lines.join("\n"),
                max_lines
            );
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Detailed info about a file or directory, including whether it sits
/// inside a safe zone.
pub fn get_file_info(gate: &PermissionGate, path: &str) -> String {
    let target = Path::new(path);
    if !target.exists() {
        return format!("Error: Path does not exist: {}", path);
    }

    let meta = match fs::metadata(target) {
        Ok(m) => m,
        Err(e) => return format!("Error getting file info: {}", e),
    };

    let in_zone = if gate.zones().is_in_any_zone(path) { "Yes" } else { "No" };
    let canonical = crate::paths::normalize(path);

    let mut info = vec![
        format!("Path: {}", canonical.display()),
        format!("Type: {}", if meta.is_dir() { "Directory" } else { "File" }),
        format!("Size: {} bytes", meta.len()),
    ];
    if let Ok(t) = meta.created() {
        info.push(format!("Created: {}", format_time_long(t)));
    }
    if let Ok(t) = meta.modified() {
        info.push(format!("Modified: {}", format_time_long(t)));
    }
    if let Ok(t) = meta.accessed() {
        info.push(format!("Accessed: {}", format_time_long(t)));
    }
    info.push(format!("In Safe Zone: {}", in_zone));

    if meta.is_dir() {
        match fs::read_dir(target) {
            Ok(entries) => info.push(format!("Items: {}", entries.count())),
            Err(_) => info.push("Items: (Permission Denied)".to_string()),
        }
    }

    info.join("\n")
}

/// List the configured safe zones.
pub fn list_safe_zones(gate: &PermissionGate) -> String {
    format!(
        "Safe Zones (write operations allowed):\n{}",
        gate.zones().describe()
    )
}

// ============================================================================
// WRITE TOOLS — safe zones only
// ============================================================================

/// Write content to a file. Parent directories are created as needed.
pub fn write_file(gate: &PermissionGate, path: &str, content: &str) -> String {
    let decision = gate.decide(&PathQuery::new(OperationKind::Write, path));
    if !decision.allowed {
        return format!("Error: {}", decision.reason);
    }

    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            if let Err(e) = fs::create_dir_all(parent) {
                return format!("Error creating parent directory: {}", e);
            }
        }
    }

    match fs::write(path, content) {
        Ok(()) => format!("File written successfully: {} ({} bytes)", path, content.len()),
        Err(e) => format!("Error writing file: {}", e),
    }
}

/// Replace `old_text` with `new_text` in a file. `count` caps how many
/// occurrences are replaced; pass a negative count to replace all.
pub fn edit_file(gate: &PermissionGate, path: &str, old_text: &str, new_text: &str, count: i64) -> String {
    let decision = gate.decide(&PathQuery::new(OperationKind::Write, path));
    if !decision.allowed {
        return format!("Error: {}", decision.reason);
    }

    if !Path::new(path).exists() {
        return format!("Error: File does not exist: {}", path);
    }

    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) => return format!("Error reading file: {}", e),
    };
    let content = encoding::decode(&bytes);

    if !content.contains(old_text) {
        // Whitespace hint: same tokens, different indentation
        let squash = |s: &str| s.split_whitespace().collect::<Vec<_>>().join(" ");
        if squash(&content).contains(&squash(old_text)) {
            return "Error: Text found but with different whitespace/indentation. Provide an exact match.".to_string();
        }
        return "Error: The old_text was not found in the file.".to_string();
    }

    let new_content = if count < 0 {
        content.replace(old_text, new_text)
    } else {
        content.replacen(old_text, new_text, count as usize)
    };

    if new_content == content {
        return "Warning: No changes were made.".to_string();
    }

    match fs::write(path, new_content) {
        Ok(()) => format!("File edited successfully: {}", path),
        Err(e) => format!("Error editing file: {}", e),
    }
}

/// Move or rename a file/directory. Both endpoints must be in safe zones.
pub fn move_file(gate: &PermissionGate, source: &str, destination: &str) -> String {
    let decision = gate.decide(&PathQuery::with_destination(
        OperationKind::Move,
        source,
        destination,
    ));
    if !decision.allowed {
        return format!("Error: {}", decision.reason);
    }

    if !Path::new(source).exists() {
        return format!("Error: Source does not exist: {}", source);
    }

    match fs::rename(source, destination) {
        Ok(()) => format!("Moved: {} -> {}", source, destination),
        Err(e) => format!("Error moving file: {}", e),
    }
}

/// Delete a file or directory tree. Permanent, there is no recycle bin.
pub fn delete_file(gate: &PermissionGate, path: &str) -> String {
    let decision = gate.decide(&PathQuery::new(OperationKind::Delete, path));
    if !decision.allowed {
        return format!("Error: {}", decision.reason);
    }

    let target = Path::new(path);
    if !target.exists() {
        return format!("Error: Path does not exist: {}", path);
    }

    let result = if target.is_dir() {
        fs::remove_dir_all(target)
    } else {
        fs::remove_file(target)
    };

    match result {
        Ok(()) => format!("Permanently deleted: {}", path),
        Err(e) => format!("Error deleting: {}", e),
    }
}

/// Create a directory (and parents). Idempotent: an already-existing
/// directory is success.
pub fn create_directory(gate: &PermissionGate, path: &str) -> String {
    let decision = gate.decide(&PathQuery::new(OperationKind::CreateDirectory, path));
    if !decision.allowed {
        return format!("Error: {}", decision.reason);
    }

    match fs::create_dir_all(path) {
        Ok(()) => format!("Directory created: {}", path),
        Err(e) => format!("Error creating directory: {}", e),
    }
}

// ============================================================================
// COPY — special: INTO safe zone only
// ============================================================================

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<u64> {
    fs::create_dir_all(dst)?;
    let mut copied = 0;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copied += copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}

/// Copy a file or directory. Source may be anywhere on the host; the
/// destination must be in a safe zone.
pub fn copy_file(gate: &PermissionGate, source: &str, destination: &str) -> String {
    let decision = gate.decide(&PathQuery::with_destination(
        OperationKind::Copy,
        source,
        destination,
    ));
    if !decision.allowed {
        return format!("Error: {}", decision.reason);
    }

    let src = Path::new(source);
    if !src.exists() {
        return format!("Error: Source does not exist: {}", source);
    }

    if src.is_dir() {
        match copy_dir_recursive(src, Path::new(destination)) {
            Ok(n) => format!("Copied: {} -> {} ({} files)", source, destination, n),
            Err(e) => format!("Error copying: {}", e),
        }
    } else {
        if let Some(parent) = Path::new(destination).parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                if let Err(e) = fs::create_dir_all(parent) {
                    return format!("Error creating parent directory: {}", e);
                }
            }
        }
        match fs::copy(src, destination) {
            Ok(_) => format!("Copied: {} -> {}", source, destination),
            Err(e) => format!("Error copying: {}", e),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
