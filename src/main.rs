//! Hotel Analytics MCP Server
//!
//! Serves the hotel analytics dashboards over the Model Context Protocol,
//! backed by the analytics GraphQL service.

mod api;
mod config;
mod dashboard;
mod debug;
mod error;
mod filters;
mod graphql;
mod metrics;
mod queries;
mod server;
mod views;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use tracing_subscriber::EnvFilter;

use crate::api::AnalyticsClient;
use crate::config::{Config, ENDPOINT_ENV_VAR};
use crate::dashboard::DashboardLoader;
use crate::debug::DebugLogger;
use crate::graphql::GraphQLClient;
use crate::server::HotelAnalyticsServer;

#[derive(Parser, Debug)]
#[command(name = "hotel-analytics-mcp")]
#[command(author, version, about = "Hotel Analytics MCP Server", long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// GraphQL endpoint, overrides the environment and the config file
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Enable debug mode (traces every tool call to a file)
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::resolve(
        args.config.as_deref(),
        args.endpoint,
        std::env::var(ENDPOINT_ENV_VAR).ok(),
    )?;
    let debug_enabled = args.debug || config.debug;

    // stdout carries the MCP stream, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_level(debug_enabled))),
        )
        .with_writer(std::io::stderr)
        .init();

    let debug = Arc::new(DebugLogger::new(debug_enabled));

    if debug_enabled {
        debug.log("Hotel Analytics MCP Server starting...");
        if let Some(path) = &args.config {
            debug.log(&format!("Config file: {}", path.display()));
        }
        if let Some(path) = debug.trace_path() {
            tracing::info!(path = %path.display(), "Trace file");
        }
    }

    tracing::info!(
        endpoint = %config.endpoint,
        timeout_seconds = config.timeout_seconds,
        "Using analytics endpoint"
    );

    let graphql_client = GraphQLClient::new(&config)?;
    let analytics = AnalyticsClient::new(graphql_client);
    let loader = Arc::new(DashboardLoader::new(Arc::new(analytics)));

    let server = HotelAnalyticsServer::new(loader, debug.clone());

    debug.log("Server initialized, starting stdio transport...");

    let service = server.serve(stdio()).await?;
    service.waiting().await?;

    Ok(())
}

fn default_log_level(debug_enabled: bool) -> &'static str {
    if debug_enabled {
        "debug"
    } else {
        "info"
    }
}
