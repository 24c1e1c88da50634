use std::{path::Path, sync::Arc};

use anyhow::Context;
use itbook_browser::{
    catalog_client::{CatalogClient, NetworkActivity},
    config::Config,
    console::{Console, Renderer},
    session::FetchCoordinator,
    storage::SqlMemoStore,
};
use migration::MigratorTrait;
use sea_orm::Database;
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt::SubscriberBuilder, prelude::*};

type BrowserResult<T> = anyhow::Result<T>;

#[tokio::main]
async fn main() -> BrowserResult<()> {
    // Respect RUST_LOG if set, default to info for our crate and warn for deps.
    let default_filter = format!(
        "{}=info,reqwest=warn,sea_orm=warn,sqlx=warn",
        env!("CARGO_PKG_NAME")
    );
    let env_filter = std::env::var("RUST_LOG").unwrap_or(default_filter);
    SubscriberBuilder::default()
        .with_env_filter(EnvFilter::new(env_filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .pretty()
        .finish()
        .with(ErrorLayer::default())
        .init();
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting itbook browser");

    // Load environment variables from .env files
    if Path::new(".env.local").exists() {
        dotenvy::from_filename(".env.local")?;
    } else if Path::new(".env").exists() {
        dotenvy::from_filename(".env")?;
    };
    let config = Config::load()?;
    config.validate()?;

    let db_conn = Database::connect(&config.db_connection_string)
        .await
        .with_context(|| "Failed to open memo database")?;
    migration::Migrator::up(&db_conn, None)
        .await
        .with_context(|| "Failed to run database migrations")?;

    let activity = NetworkActivity::new();
    let client = CatalogClient::new(&config.base_url, config.request_timeout)?
        .with_activity(activity.clone());
    tracing::info!(base_url = %config.base_url, page_size = config.page_size, advance = ?config.page_advance, "configured catalog client");

    run_console(config, client, activity, db_conn).await
}

async fn run_console(
    config: Config,
    client: CatalogClient,
    activity: NetworkActivity,
    db: sea_orm::DatabaseConnection,
) -> BrowserResult<()> {
    let renderer = Arc::new(Renderer {
        price: config.price,
        labels: config.labels.clone(),
    });
    let coordinator = FetchCoordinator::new(
        Arc::new(client),
        renderer.clone(),
        config.page_size,
        config.page_advance,
    );
    let memos = Arc::new(SqlMemoStore::new(db));
    Console::new(coordinator, memos, renderer)
        .run(activity.subscribe())
        .await
}
