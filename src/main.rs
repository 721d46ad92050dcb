use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use employee_registry::audit::TableAuditStore;
use employee_registry::config::AppConfig;
use employee_registry::database::Database;
use employee_registry::{router, AppState, EmployeeRegistry};

#[derive(Parser)]
#[command(name = "employee-registry")]
#[command(about = "Employee records service with a per-mutation audit table")]
struct Args {
    /// Configuration file (defaults to ./registry.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "employee_registry=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting employee registry");

    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.server_port = port;
    }
    info!("Configuration loaded");

    let database = Database::new(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    info!("Database connected");

    database
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed");

    // The audit table is only reached on the first write; bad settings show
    // up there rather than here.
    let audit_store = TableAuditStore::new(
        config.audit.connection_string.clone(),
        config.audit.table_name.clone(),
        config.audit.cache_table_ready,
    );
    info!(
        "Audit store configured (table {:?}, failure policy {:?})",
        audit_store.table_name(),
        config.audit.failure_policy
    );

    let registry = EmployeeRegistry::new(
        Arc::new(database),
        Arc::new(audit_store),
        config.audit.failure_policy,
    );

    let addr = config.bind_address();
    let app = router(AppState { config, registry });

    info!("Server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
