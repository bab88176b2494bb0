use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use barberbook::backend::postgrest::PostgrestBackend;
use barberbook::backend::sqlite::SqliteBackend;
use barberbook::backend::Backend;
use barberbook::config::{AppConfig, BackendKind};
use barberbook::handlers;
use barberbook::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    config.validate()?;
    let offset = config.business_offset()?;

    let backend: Box<dyn Backend> = match config.backend {
        BackendKind::Postgrest => {
            tracing::info!("using hosted backend (url: {})", config.baas_url);
            Box::new(PostgrestBackend::new(
                config.baas_url.clone(),
                config.baas_api_key.clone(),
            ))
        }
        BackendKind::Sqlite => {
            tracing::info!("using local SQLite backend (path: {})", config.database_url);
            Box::new(SqliteBackend::open(&config.database_url)?)
        }
    };

    let state = Arc::new(AppState {
        backend,
        config: config.clone(),
        offset,
    });

    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
