use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::Router;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use pharmacy::PharmacyModule;
use rxkit::config::module_config_or_default;
use rxkit::runtime::{drain_worker, wait_for_shutdown};
use rxkit::telemetry::init_logging;
use rxkit::{AppConfig, QueuedWorker, TaskQueue};
use rxkit_auth::{AuthConfig, AuthState, authenticate};
use tokio_util::sync::CancellationToken;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Name of the module section holding the token settings
const AUTH_MODULE: &str = "auth";

/// Pharmacy Server - multi-tenant pharmacy management backend
#[derive(Parser)]
#[command(name = "pharmacy-server")]
#[command(about = "Pharmacy Server - multi-tenant pharmacy management backend")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // defaults -> YAML (if provided) -> env (PHARMACY__*) -> CLI overrides
    let mut config = AppConfig::load_layered(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.override_port(port);
    }

    init_logging(&config.logging, cli.verbose)?;
    tracing::info!("Pharmacy Server starting");

    if cli.print_config {
        println!("Effective configuration:\n{}", config.to_pretty_json()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");
    let auth: AuthConfig = module_config_or_default(config, AUTH_MODULE)?;
    AuthState::from_config(&auth)?;
    PharmacyModule::from_provider(config, TaskQueue::new())?;
    println!("Configuration is valid");
    println!("{}", config.to_pretty_json()?);
    Ok(())
}

async fn run_server(config: AppConfig) -> Result<()> {
    let auth: AuthConfig = module_config_or_default(&config, AUTH_MODULE)?;
    let auth_state = AuthState::from_config(&auth)?;

    let queue = TaskQueue::new();
    let module = PharmacyModule::from_provider(&config, queue.clone())?;
    module.bootstrap().await.context("bootstrap seed failed")?;

    let cancel = CancellationToken::new();
    let worker = QueuedWorker::new(queue).spawn(cancel.clone());

    let app = build_router(&module, auth_state, cancel.clone());
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "HTTP server listening");

    let shutdown = cancel.clone();
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = wait_for_shutdown().await {
                tracing::error!(error = %e, "shutdown signal handling failed");
            }
            // Requests still in flight end as cancelled.
            shutdown.cancel();
        })
        .await;

    // Stop taking new work; the item in flight runs to completion.
    cancel.cancel();
    let drained = drain_worker(worker, Duration::from_secs(config.server.shutdown_timeout_secs)).await;
    tracing::info!(drained, "Pharmacy Server stopped");

    served.context("HTTP server failed")
}

fn build_router(
    module: &PharmacyModule,
    auth_state: AuthState,
    shutdown: CancellationToken,
) -> Router {
    module
        .router(shutdown)
        .layer(axum::middleware::from_fn_with_state(auth_state, authenticate))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}
