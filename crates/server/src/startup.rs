use std::{net::SocketAddr, sync::Arc, time::Duration};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};
use service::store::{MongoStore, RecordStore};

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_default();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn load_config() -> anyhow::Result<configs::AppConfig> {
    // config.toml is optional; without it the server binding comes from
    // SERVER_HOST/SERVER_PORT and the database section from
    // MONGODB_URI / MONGODB_DB.
    let mut cfg = configs::load_or_env();
    cfg.normalize_and_validate()?;
    Ok(cfg)
}

/// Public entry: build the app and run the HTTP server
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging();

    let cfg = load_config()?;

    // Store handle: one client per process, injected into the services.
    let db = models::db::connect(&cfg.database).await?;
    models::db::ensure_indexes(&db).await?;
    let store: Arc<dyn RecordStore> = Arc::new(MongoStore::new(
        db,
        Duration::from_secs(cfg.database.op_timeout_secs),
    ));
    let state = ServerState { store };

    // Build router
    let cors = build_cors();
    let app: Router = routes::build_router(cors, state);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port).parse()?;
    info!(%addr, "starting movie api");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
