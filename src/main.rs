mod accounts;
mod admin;
mod auth;
mod catalog;
mod config;
mod db;
mod entities;
mod error;
mod forms;
mod media;
mod models;
mod ratings;
mod reviews;
mod routes;
mod slugs;
mod templates;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{config::Config, media::MediaStore};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub media: MediaStore,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,reelbase=debug,sqlx=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let db = db::connect_and_migrate(&config.database_url).await?;
    auth::ensure_admin(&db, &config).await?;

    tokio::fs::create_dir_all(&config.media_root).await?;
    let media = MediaStore::new(config.media_root.clone(), config.max_image_dimension);

    let state = Arc::new(AppState { config: config.clone(), db, media });
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, media_root = %config.media_root.display(), "listening");
    axum::serve(listener, app).await?;

    Ok(())
}
