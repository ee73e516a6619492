// MyPC Gateway - MCP Transport (JSON-RPC 2.0 over HTTP)
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// ALL agent tool calls route through this transport. Exposes the
// gated file tools: mypc_list_directory, mypc_read_file,
// mypc_get_file_info, mypc_list_safe_zones, mypc_get_download_url,
// mypc_write_file, mypc_edit_file, mypc_move_file, mypc_copy_file,
// mypc_delete_file, mypc_create_directory.
//
// The tool boundary never raises: every result (success, denial,
// I/O failure) is a text content item. Callers distinguish outcomes
// by message content, not protocol error codes.

use crate::download::{self, DownloadError};
use crate::router::AppState;
use crate::tools;
use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::{json, Value};
use std::sync::Arc;

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "mypc-gate";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// JSON-RPC success envelope
fn rpc_response(id: &Value, result: Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    })
}

/// JSON-RPC error envelope
fn rpc_error(id: &Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": { "code": code, "message": message },
    })
}

/// MCP tool definition helper
fn tool_def(name: &str, description: &str, properties: Value, required: Vec<&str>) -> Value {
    json!({
        "name": name,
        "description": description,
        "inputSchema": {
            "type": "object",
            "properties": properties,
            "required": required,
        }
    })
}

/// Return all tool definitions
fn tool_definitions() -> Vec<Value> {
    vec![
        // ====== READ TOOLS (allowed anywhere) ======
        tool_def(
            "mypc_list_directory",
            "List contents of a directory with sizes and modification times. (READ - allowed anywhere)",
            json!({
                "path": {"type": "string", "description": "Absolute path to the directory"}
            }),
            vec!["path"],
        ),
        tool_def(
            "mypc_read_file",
            "Read a text file. Unknown encodings fall back through UTF-8/UTF-16. (READ - allowed anywhere)",
            json!({
                "path": {"type": "string", "description": "Absolute path to the file"},
                "max_lines": {"type": "integer", "description": "Maximum lines to read (default 500)", "default": 500}
            }),
            vec!["path"],
        ),
        tool_def(
            "mypc_get_file_info",
            "Get detailed information about a file or directory, including safe-zone membership. (READ - allowed anywhere)",
            json!({
                "path": {"type": "string", "description": "Path to the file or directory"}
            }),
            vec!["path"],
        ),
        tool_def(
            "mypc_list_safe_zones",
            "List all configured safe zones where write operations are allowed.",
            json!({}),
            vec![],
        ),
        tool_def(
            "mypc_get_download_url",
            "Get a direct download URL for a file. The file MUST be in a safe zone.",
            json!({
                "path": {"type": "string", "description": "Absolute path to the file"}
            }),
            vec!["path"],
        ),

        // ====== WRITE TOOLS (safe zones only) ======
        tool_def(
            "mypc_write_file",
            "Write content to a file. (WRITE - safe zones only)",
            json!({
                "path": {"type": "string", "description": "Absolute path to the file (must be in a safe zone)"},
                "content": {"type": "string", "description": "Text content to write"}
            }),
            vec!["path", "content"],
        ),
        tool_def(
            "mypc_edit_file",
            "Edit a file by exact text replacement. (WRITE - safe zones only)",
            json!({
                "path": {"type": "string", "description": "Absolute path to the file"},
                "old_text": {"type": "string", "description": "Text to replace (must match exactly)"},
                "new_text": {"type": "string", "description": "Replacement text"},
                "count": {"type": "integer", "description": "Occurrences to replace (default 1, -1 for all)", "default": 1}
            }),
            vec!["path", "old_text", "new_text"],
        ),
        tool_def(
            "mypc_move_file",
            "Move or rename a file/directory. (WRITE - both paths must be in safe zones)",
            json!({
                "source": {"type": "string", "description": "Source path (must be in a safe zone)"},
                "destination": {"type": "string", "description": "Destination path (must be in a safe zone)"}
            }),
            vec!["source", "destination"],
        ),
        tool_def(
            "mypc_delete_file",
            "Permanently delete a file or directory. There is no recycle bin. (WRITE - safe zones only)",
            json!({
                "path": {"type": "string", "description": "Path to delete (must be in a safe zone)"}
            }),
            vec!["path"],
        ),
        tool_def(
            "mypc_create_directory",
            "Create a directory and any missing parents. Idempotent. (WRITE - safe zones only)",
            json!({
                "path": {"type": "string", "description": "Path for the new directory (must be in a safe zone)"}
            }),
            vec!["path"],
        ),

        // ====== COPY (special: INTO safe zone only) ======
        tool_def(
            "mypc_copy_file",
            "Copy a file or directory. Source may be anywhere; destination must be in a safe zone.",
            json!({
                "source": {"type": "string", "description": "Source path (can be anywhere)"},
                "destination": {"type": "string", "description": "Destination path (must be in a safe zone)"}
            }),
            vec!["source", "destination"],
        ),
    ]
}

/// Wrap tool output as an MCP text content item
fn text_content(text: String) -> Value {
    json!({"type": "text", "text": text})
}

/// Summarize tool params for logging (truncate large values)
fn param_summary(args: &Value) -> String {
    let s = args.to_string();
    if s.len() > 200 {
        format!("{}…", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}

/// Dispatch one tool call. Always returns a text content item.
fn handle_tool_call(name: &str, args: &Value, state: &AppState) -> Value {
    let gate = &state.gate;
    let str_arg = |key: &str| args.get(key).and_then(|v| v.as_str()).unwrap_or("");

    match name {
        "mypc_list_directory" => text_content(tools::list_directory(str_arg("path"))),

        "mypc_read_file" => {
            let max_lines = args
                .get("max_lines")
                .and_then(|v| v.as_u64())
                .map(|n| n as usize);
            text_content(tools::read_file(str_arg("path"), max_lines))
        }

        "mypc_get_file_info" => text_content(tools::get_file_info(gate, str_arg("path"))),

        "mypc_list_safe_zones" => text_content(tools::list_safe_zones(gate)),

        "mypc_get_download_url" => {
            let path = str_arg("path");
            let text = match download::build_url(state, path) {
                Ok(url) => format!("Download URL: {}", url),
                Err(DownloadError::OutsideSafeZone(p)) => format!(
                    "Error: Download denied. File must be in a safe zone: {}\n\nSafe Zones:\n{}",
                    p,
                    gate.zones().describe(),
                ),
                Err(e) => format!("Error: {}", e),
            };
            text_content(text)
        }

        "mypc_write_file" => {
            text_content(tools::write_file(gate, str_arg("path"), str_arg("content")))
        }

        "mypc_edit_file" => {
            let count = args.get("count").and_then(|v| v.as_i64()).unwrap_or(1);
            text_content(tools::edit_file(
                gate,
                str_arg("path"),
                str_arg("old_text"),
                str_arg("new_text"),
                count,
            ))
        }

        "mypc_move_file" => text_content(tools::move_file(
            gate,
            str_arg("source"),
            str_arg("destination"),
        )),

        "mypc_copy_file" => text_content(tools::copy_file(
            gate,
            str_arg("source"),
            str_arg("destination"),
        )),

        "mypc_delete_file" => text_content(tools::delete_file(gate, str_arg("path"))),

        "mypc_create_directory" => text_content(tools::create_directory(gate, str_arg("path"))),

        _ => text_content(format!("Error: unknown tool '{}'", name)),
    }
}

/// Process one JSON-RPC message. Returns None for notifications.
fn process_message(msg: &Value, state: &AppState) -> Option<Value> {
    let method = msg["method"].as_str().unwrap_or("");
    let id = &msg["id"];
    let params = &msg["params"];

    log::debug!("MCP request: {}", method);

    match method {
        "initialize" => Some(rpc_response(
            id,
            json!({
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": { "tools": {} },
                "serverInfo": {
                    "name": SERVER_NAME,
                    "version": SERVER_VERSION,
                }
            }),
        )),

        "notifications/initialized" => None,

        "tools/list" => Some(rpc_response(id, json!({ "tools": tool_definitions() }))),

        "tools/call" => {
            let name = params["name"].as_str().unwrap_or("");
            let args = params.get("arguments").cloned().unwrap_or(json!({}));

            log::info!("CALL {} | {}", name, param_summary(&args));

            let result = handle_tool_call(name, &args, state);

            let text = result.get("text").and_then(|v| v.as_str()).unwrap_or("");
            if text.starts_with("Error") {
                let snippet: String = text.chars().take(200).collect();
                log::warn!("FAIL {} | {}", name, snippet);
            }

            Some(rpc_response(id, json!({ "content": [result] })))
        }

        "ping" => Some(rpc_response(id, json!({}))),

        _ => {
            if id.is_null() {
                None
            } else {
                Some(rpc_error(id, -32601, &format!("Unknown method: {}", method)))
            }
        }
    }
}

/// HTTP carrier for the transport: one JSON-RPC message per POST body.
/// Validates the Host header against the expected local origin. The
/// router rewrites inbound Host before the request lands here, which
/// is what lets non-local clients through this check (known weakness,
/// see router.rs).
pub async fn handle(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Response {
    let expected = state.config.expected_host();
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    if host != expected {
        log::warn!("Rejected transport request with Host '{}' (expected '{}')", host, expected);
        return (StatusCode::MISDIRECTED_REQUEST, "Invalid Host header").into_response();
    }

    let msg: Value = match serde_json::from_str(&body) {
        Ok(v) => v,
        Err(e) => {
            let err = rpc_error(&Value::Null, -32700, &format!("Parse error: {}", e));
            return (StatusCode::OK, axum::Json(err)).into_response();
        }
    };

    match process_message(&msg, &state) {
        Some(response) => (StatusCode::OK, axum::Json(response)).into_response(),
        // Notification: acknowledged, no body
        None => StatusCode::ACCEPTED.into_response(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
