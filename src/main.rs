// MyPC Gateway - Main Entry Point
// Copyright 2026 Joseph Stone - All Rights Reserved
//
// CLI and combined HTTP server. All tool calls route through this gateway.
// Usage:
//   mypc-gate serve                              # Run combined HTTP server (MCP + downloads)
//   mypc-gate check <op> <path> [destination]    # One-shot gate check, exit 1 on deny
//   mypc-gate url <path>                         # Mint a download URL for a zone file
//   mypc-gate zones                              # List configured safe zones
//   mypc-gate status                             # Show gateway status

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mypc_gate::config::GatewayConfig;
use mypc_gate::download;
use mypc_gate::gate::{OperationKind, PathQuery, PermissionGate};
use mypc_gate::router::{self, AppState};
use mypc_gate::zones::ZoneRegistry;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, UdpSocket};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mypc-gate")]
#[command(author = "Joseph Stone")]
#[command(version)]
#[command(about = "MyPC Gateway - zone-gated file tools over MCP with HTTP downloads")]
struct Cli {
    /// Gateway config file (JSON)
    #[arg(short, long, default_value = "config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the combined HTTP server (MCP transport + download/screenshot routes)
    Serve,

    /// One-shot gate check — prints the decision, exits 1 on deny
    Check {
        /// Operation (read, write, move, copy, delete, mkdir)
        op: String,

        /// Primary path
        path: String,

        /// Destination path (move and copy only)
        destination: Option<String>,
    },

    /// Mint a download URL for a file in a safe zone
    Url {
        /// Absolute path to the file
        path: String,
    },

    /// List configured safe zones
    Zones,

    /// Show gateway status
    Status,
}

/// Discover the local address a default route would use. No packets
/// are sent; connect() on UDP only selects a source address.
fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    match socket.local_addr().ok()? {
        SocketAddr::V4(addr) => Some(*addr.ip()),
        SocketAddr::V6(_) => None,
    }
}

fn local_ipv6() -> Option<Ipv6Addr> {
    let socket = UdpSocket::bind("[::]:0").ok()?;
    socket.connect("[2001:4860:4860::8888]:80").ok()?;
    match socket.local_addr().ok()? {
        SocketAddr::V6(addr) => Some(*addr.ip()),
        SocketAddr::V4(_) => None,
    }
}

async fn serve(state: Arc<AppState>) -> Result<()> {
    let port = state.config.port;

    // Screenshots mount must exist before ServeDir touches it
    std::fs::create_dir_all(&state.config.screenshots_dir)
        .with_context(|| format!("Failed to create screenshots dir {:?}", state.config.screenshots_dir))?;

    log::info!("MyPC Gateway v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Safe Zones:\n{}", state.gate.zones().describe());
    log::info!("Local URL:   http://localhost:{}", port);
    if let Some(ip) = local_ipv4() {
        log::info!("Network URL: http://{}:{}", ip, port);
    }
    if let Some(ip) = local_ipv6() {
        log::info!("IPv6 URL:    http://[{}]:{}", ip, port);
    }

    let app = router::build(state);

    // "::" binds dual-stack where the OS allows it
    let addr: SocketAddr = SocketAddr::new(Ipv6Addr::UNSPECIFIED.into(), port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    axum::serve(listener, app)
        .await
        .context("Server terminated")?;

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging (safe if already init)
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();

    let cli = Cli::parse();

    let config = GatewayConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config from {:?}", cli.config))?;

    let registry = ZoneRegistry::new(&config.safe_zones);
    let gate = PermissionGate::new(registry);
    let state = Arc::new(AppState { gate, config });

    match &cli.command {
        Commands::Serve => {
            let runtime = tokio::runtime::Runtime::new().context("Failed to start runtime")?;
            runtime.block_on(serve(state))?;
        }

        Commands::Check { op, path, destination } => {
            let op: OperationKind = op.parse().map_err(|e: String| anyhow::anyhow!(e))?;
            let query = match destination {
                Some(dest) => PathQuery::with_destination(op, path, dest),
                None => PathQuery::new(op, path),
            };

            let decision = state.gate.decide(&query);
            println!("{}", serde_json::to_string_pretty(&decision)?);

            if !decision.allowed {
                std::process::exit(1);
            }
        }

        Commands::Url { path } => {
            let url = download::build_url(&state, path)?;
            println!("{}", url);
        }

        Commands::Zones => {
            println!("Safe Zones:");
            println!("{}", state.gate.zones().describe());
        }

        Commands::Status => {
            println!("MyPC Gateway v{}", env!("CARGO_PKG_VERSION"));
            println!("Config: {:?}", cli.config);
            println!("Base URL: {}", state.config.base_url());
            println!("Screenshots dir: {}", state.config.screenshots_dir);
            println!();
            println!("Safe Zones:");
            println!("{}", state.gate.zones().describe());
            println!();
            println!("Permissions:");
            println!("  Read             anywhere");
            println!("  Write/Delete     safe zones only");
            println!("  CreateDirectory  safe zones only");
            println!("  Move             both endpoints in safe zones");
            println!("  Copy             destination in a safe zone (import only)");
        }
    }

    Ok(())
}
