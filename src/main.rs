use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use conductor::api::{self, AppState};
use conductor::config::ServerConfig;
use conductor::store::postgres::{PgExecutionStore, PgTaskLogStore, PgWorkflowStore};
use conductor::tasks;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("conductor={},tower_http=info", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(20)
        .connect(&config.database_url())
        .await?;

    sqlx::migrate!().run(&pool).await?;

    let registry = Arc::new(tasks::builtin_registry());

    let state = AppState {
        workflows: Arc::new(PgWorkflowStore::new(pool.clone())),
        executions: Arc::new(PgExecutionStore::new(pool.clone())),
        task_logs: Arc::new(PgTaskLogStore::new(pool.clone())),
        registry,
        pool: Some(pool),
    };

    let app = api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "starting conductor API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
