// MyPC Gateway - Configuration
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// Loads config.json once at startup: safe zones, port, public domain,
// screenshots directory. Environment variables in zone paths are
// expanded ($VAR, ${VAR}, %VAR% and leading ~). The loaded value is
// immutable; reconfiguration requires a process restart.

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_port() -> u16 {
    9999
}

fn default_domain() -> String {
    "localhost".to_string()
}

fn default_screenshots_dir() -> String {
    "screenshots".to_string()
}

/// Gateway configuration loaded from config.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Directories where mutation is permitted. Empty ⇒ platform
    /// defaults (Documents, Downloads, Desktop).
    #[serde(default)]
    pub safe_zones: Vec<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public host used when minting download URLs.
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Directory served under /screenshots/ (created at startup).
    #[serde(default = "default_screenshots_dir")]
    pub screenshots_dir: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            safe_zones: Vec::new(),
            port: default_port(),
            domain: default_domain(),
            screenshots_dir: default_screenshots_dir(),
        }
    }
}

impl GatewayConfig {
    /// Load config from JSON file. A missing or unparseable file falls
    /// back to defaults with a warning so the gateway always starts.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            log::warn!("Config not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let mut config: Self = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                log::warn!("Invalid config at {:?} ({}), using defaults", path, e);
                return Ok(Self::default());
            }
        };
        config.safe_zones = config
            .safe_zones
            .iter()
            .map(|z| expand_env_vars(z))
            .collect();
        Ok(config)
    }

    /// Save config to JSON file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Base URL for download links: http://<domain>:<port>
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.domain, self.port)
    }

    /// The Host value the MCP transport expects. Inbound Host headers
    /// are rewritten to this before they reach the transport.
    pub fn expected_host(&self) -> String {
        format!("localhost:{}", self.port)
    }
}

/// Expand environment variables in a path string.
/// Supports Windows %VAR%, Unix $VAR and ${VAR}, and a leading ~.
pub fn expand_env_vars(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut chars = path.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '%' => {
                // Windows style: %USERPROFILE%
                let mut name = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '%' {
                        closed = true;
                        break;
                    }
                    name.push(c);
                }
                match std::env::var(&name) {
                    Ok(val) if closed => out.push_str(&val),
                    _ => {
                        out.push('%');
                        out.push_str(&name);
                        if closed {
                            out.push('%');
                        }
                    }
                }
            }
            '$' => {
                let braced = chars.peek() == Some(&'{');
                if braced {
                    chars.next();
                }
                let mut name = String::new();
                while let Some(&c) = chars.peek() {
                    if braced && c == '}' {
                        chars.next();
                        break;
                    }
                    if !braced && !(c.is_alphanumeric() || c == '_') {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                match std::env::var(&name) {
                    Ok(val) => out.push_str(&val),
                    Err(_) => {
                        out.push('$');
                        if braced {
                            out.push('{');
                            out.push_str(&name);
                            out.push('}');
                        } else {
                            out.push_str(&name);
                        }
                    }
                }
            }
            _ => out.push(c),
        }
    }

    // Leading ~ expands to the home directory
    if let Some(rest) = out.strip_prefix('~') {
        if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') {
            if let Some(home) = dirs::home_dir() {
                return format!("{}{}", home.to_string_lossy(), rest);
            }
        }
    }

    out
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_when_file_missing() {
        let config = GatewayConfig::load(Path::new("/nonexistent/config.json")).unwrap();
        assert!(config.safe_zones.is_empty());
        assert_eq!(config.port, 9999);
        assert_eq!(config.domain, "localhost");
    }

    #[test]
    fn loads_safe_zones_from_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut f = std::fs::File::create(&path).unwrap();
        write!(f, r#"{{"safe_zones": ["/data/share"], "port": 8080}}"#).unwrap();

        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.safe_zones, vec!["/data/share".to_string()]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.expected_host(), "localhost:8080");
    }

    #[test]
    fn invalid_json_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{not json").unwrap();
        let config = GatewayConfig::load(&path).unwrap();
        assert_eq!(config.port, 9999);
        assert!(config.safe_zones.is_empty());
    }

    #[test]
    fn expands_unix_env_vars() {
        std::env::set_var("MYPC_TEST_ZONE", "/srv/zone");
        assert_eq!(expand_env_vars("$MYPC_TEST_ZONE/docs"), "/srv/zone/docs");
        assert_eq!(expand_env_vars("${MYPC_TEST_ZONE}/docs"), "/srv/zone/docs");
    }

    #[test]
    fn expands_windows_env_vars() {
        std::env::set_var("MYPC_TEST_WIN", "/srv/win");
        assert_eq!(expand_env_vars("%MYPC_TEST_WIN%/docs"), "/srv/win/docs");
    }

    #[test]
    fn unknown_vars_kept_verbatim() {
        assert_eq!(expand_env_vars("$MYPC_NO_SUCH_VAR/x"), "$MYPC_NO_SUCH_VAR/x");
        assert_eq!(expand_env_vars("%MYPC_NO_SUCH_VAR%/x"), "%MYPC_NO_SUCH_VAR%/x");
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            let expanded = expand_env_vars("~/Documents");
            assert_eq!(expanded, format!("{}/Documents", home.to_string_lossy()));
        }
    }
}
