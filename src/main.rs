use ads_api::repository::{
    DynAdRepository, DynEventRepository, InMemoryRepository, PostgresRepository,
};
use ads_api::routes::{create_router, AppState};
use ads_api::service::{AdStore, AnalyticsRecorder};
use ads_api::utils::get_env;
use axum::serve;
use dotenvy::dotenv;
use sqlx::postgres::PgPoolOptions;
use sqlx::{Pool, Postgres};
use std::env;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_TRACING_LEVEL: &str = "ads_api=debug";
const DATABASE_MAX_CONNECTIONS: u32 = 20;

#[tokio::main]
async fn main() {
    _ = dotenv();
    let server_address = get_env("SERVER_ADDRESS");
    configure_tracing();
    let state = create_state().await;
    let listener = create_listener(&server_address).await;
    let router = create_router(state);
    serve(listener, router)
        .await
        .expect("Server failed to start");
}

fn configure_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or(DEFAULT_TRACING_LEVEL.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn create_state() -> AppState {
    let (ad_repository, event_repository): (DynAdRepository, DynEventRepository) =
        match env::var("DATABASE_URL") {
            Ok(database_url) => {
                let pool = create_db_connection_pool(&database_url).await;
                let repository = Arc::new(PostgresRepository::new(pool));
                (repository.clone(), repository)
            }
            Err(_) => {
                tracing::warn!("DATABASE_URL not set, storing ads and events in memory");
                let repository = Arc::new(InMemoryRepository::new());
                (repository.clone(), repository)
            }
        };
    let ads = AdStore::new(ad_repository);
    let analytics = AnalyticsRecorder::new(event_repository, ads.clone());
    AppState { ads, analytics }
}

async fn create_db_connection_pool(database_url: &str) -> Pool<Postgres> {
    PgPoolOptions::new()
        .max_connections(DATABASE_MAX_CONNECTIONS)
        .connect(database_url)
        .await
        .expect("Creating database connection pool failed")
}

async fn create_listener(server_address: &str) -> TcpListener {
    let listener = TcpListener::bind(&server_address)
        .await
        .expect("Creating tcp listener failed");
    tracing::info!("Listening on address: {}", server_address);
    listener
}
