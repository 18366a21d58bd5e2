//! review-pilot-mcp: MCP server exposing AI code-review tooling
//!
//! Long-running stdio server: reads line-delimited JSON-RPC requests, routes
//! them through the tool catalog, and writes responses. Exits on stream
//! closure or termination signal.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use review_pilot_mcp::config;
use review_pilot_mcp::mcp::server::McpServer;
use review_pilot_mcp::mcp::transport::spawn_writer;
use review_pilot_mcp::tools::ToolDeps;

/// MCP server exposing AI code-review tools.
///
/// Provides report generation, pull request analysis, review configuration,
/// review commands, and agent health checks to MCP clients over stdio.
#[derive(Parser, Debug)]
#[command(name = "review-pilot-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN, // Default to warn for unknown levels
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber for logging.
///
/// Logs go to stderr; stdout carries only MCP messages.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Entry point for the review-pilot-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    // Load configuration (a missing file falls back to defaults)
    let mut cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // The credential may arrive via the environment; inject it here so the
    // report handler never reads ambient state at call time.
    if cfg.upstream.api_key.is_none() {
        if let Ok(key) = std::env::var("REVIEW_PILOT_API_KEY") {
            if !key.is_empty() {
                cfg.upstream.api_key = Some(key);
            }
        }
    }

    // Initialise logging
    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    // Display GPL license notice (required by GPLv3 Section 5d)
    eprintln!(
        "review-pilot-mcp {}  Copyright (C) 2026  The Embedded Society",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!("This program comes with ABSOLUTELY NO WARRANTY.");
    eprintln!("This is free software, licensed under GPL-3.0-or-later.");
    eprintln!("Source: {}", env!("CARGO_PKG_REPOSITORY"));
    eprintln!();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        upstream = %cfg.upstream.base_url,
        credential_configured = cfg.upstream.api_key.is_some(),
        "Starting review-pilot-mcp server"
    );

    let deps = ToolDeps::from_config(&cfg);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let result = runtime.block_on(async {
        let (sink, writer) = spawn_writer();
        let mut server = McpServer::new(deps, sink);

        info!("MCP server ready, waiting for client connection...");

        let run_result = server.run().await;

        // Dropping the server releases the last sink; the writer drains
        // pending responses and exits.
        drop(server);
        match writer.await {
            Ok(write_result) => run_result.and(write_result),
            Err(e) => Err(std::io::Error::other(e)),
        }
    });

    match result {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn quiet_wins_over_verbose() {
        assert_eq!(get_log_level(3, true, "debug"), Level::ERROR);
    }

    #[test]
    fn config_level_applies_without_flags() {
        assert_eq!(get_log_level(0, false, "info"), Level::INFO);
        assert_eq!(get_log_level(0, false, "bogus"), Level::WARN);
    }
}
