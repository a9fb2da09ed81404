//! # Vidora Server
//!
//! REST backend for the Vidora video platform.
//!
//! ## Architecture
//!
//! The server is built on Axum and uses:
//! - PostgreSQL for persistent storage
//! - Cloudinary for video, thumbnail and profile image hosting
//! - JWT access/refresh tokens delivered as cookies and in response bodies

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidora_core::{application::AppUnitOfWork, database::PostgresStore};
use vidora_server::{AppState, create_app, infra::config::Config, media::CloudinaryStore};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "vidora-server")]
#[command(about = "Video sharing platform API server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT")]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST")]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply database migrations and exit
    Migrate {
        #[arg(long, env = "DATABASE_URL")]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Some(Command::Db(DbCommand::Migrate { database_url })) => run_db_migrate(&database_url).await,
        None => run_server(cli.serve).await,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_db_migrate(database_url: &str) -> anyhow::Result<()> {
    let store = PostgresStore::connect(database_url, 1)
        .await
        .context("failed to connect to PostgreSQL for migrations")?;
    store.migrate().await.context("database migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host {
        config.server_host = host;
    }
    info!(?config, "configuration loaded");

    tokio::fs::create_dir_all(&config.upload_temp_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create upload directory {}",
                config.upload_temp_dir.display()
            )
        })?;

    let store = PostgresStore::connect(&config.database_url, config.database_max_connections)
        .await
        .context("failed to connect to PostgreSQL")?;
    store.migrate().await.context("database migration failed")?;

    let unit_of_work = Arc::new(AppUnitOfWork::from_postgres(&store));
    let media = Arc::new(CloudinaryStore::new(config.cloudinary.clone()));
    let config = Arc::new(config);
    let state = AppState::new(unit_of_work, Arc::clone(&config), media);

    let app = create_app(state);
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Starting Vidora server on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
