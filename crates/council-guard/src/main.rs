//! # council-guard (binary)
//!
//! Role-enforcing JSON-RPC proxy for agent tool servers.
//!
//! Sits between an MCP-style agent client (on our stdin/stdout) and a
//! spawned tool server, denying `tools/call` requests the role is not
//! permitted to make.
//!
//! ## Usage
//!
//! ```text
//! council-guard --role codex --policy .council/permissions.json -- \
//!     npx some-tool-server --stdio
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use council_guard::{Authorizer, ProxySession};
use council_policy::PolicyStore;

/// Role-enforcing JSON-RPC proxy for agent tool servers.
#[derive(Parser)]
#[command(name = "council-guard", about = "JSON-RPC authorization proxy")]
struct Cli {
    /// Agent role whose permission set gates tool calls (e.g., codex, claude).
    #[arg(long)]
    role: String,

    /// Path to the policy document.
    #[arg(long, default_value = ".council/permissions.json")]
    policy: PathBuf,

    /// Tool server command to spawn (everything after `--`).
    #[arg(last = true, required = true)]
    command: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never mix into the JSON-RPC stream on stdout.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("council_guard=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let policy = PolicyStore::load(&cli.policy);
    let authorizer = Authorizer::new(policy, &cli.role);

    tracing::info!(
        role = %cli.role,
        server = %cli.command.join(" "),
        "starting authorization proxy"
    );

    let session = ProxySession::spawn(
        authorizer,
        &cli.command,
        tokio::io::stdin(),
        tokio::io::stdout(),
    )?;

    match session.run(shutdown_signal()).await? {
        // The tool server exited on its own; mirror its exit code.
        Some(code) => std::process::exit(code),
        // Shut down by signal.
        None => Ok(()),
    }
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = sigterm.recv() => {}
            }
        }
        Err(_) => {
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
