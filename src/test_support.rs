use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ConnectOptions, Database, DatabaseConnection};

use crate::{
    AppState,
    config::Config,
    entities::{genre, movie, person, user},
    media::MediaStore,
};

/// Fresh in-memory database. One connection, so every query sees the same
/// schema.
pub async fn setup_db() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub fn media_store() -> MediaStore {
    let root =
        std::env::temp_dir().join(format!("reelbase-test-{}", uuid::Uuid::new_v4().simple()));
    MediaStore::new(root, 700)
}

pub fn config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        media_root: std::env::temp_dir(),
        max_image_dimension: 700,
        session_ttl_days: 1,
        secure_cookies: false,
        admin_username: None,
        admin_password: None,
    }
}

pub fn state(db: DatabaseConnection) -> Arc<AppState> {
    Arc::new(AppState { config: Arc::new(config()), db, media: media_store() })
}

/// Inserts a user without paying for a real password hash.
pub async fn user(db: &DatabaseConnection, username: &str) -> user::Model {
    user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set("!".to_string()),
        is_staff: Set(false),
        date_joined: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn genre(db: &DatabaseConnection, name: &str) -> genre::Model {
    genre::ActiveModel { name: Set(name.to_string()), added_by: Set(None), ..Default::default() }
        .insert(db)
        .await
        .unwrap()
}

pub async fn person(db: &DatabaseConnection, full_name: &str, intro: &str) -> person::Model {
    person::ActiveModel {
        full_name: Set(full_name.to_string()),
        intro: Set(intro.to_string()),
        image: Set(person::DEFAULT_IMAGE.to_string()),
        date_of_birth: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn movie(
    db: &DatabaseConnection,
    title: &str,
    release_date: &str,
    genre_id: Option<i32>,
) -> movie::Model {
    movie::ActiveModel {
        title: Set(title.to_string()),
        poster: Set(movie::DEFAULT_POSTER.to_string()),
        release_date: Set(release_date.to_string()),
        official_trailer: Set("https://example.com/trailer".to_string()),
        country_of_origin: Set("USA".to_string()),
        genre_id: Set(genre_id),
        duration: Set("120 min".to_string()),
        awards: Set(String::new()),
        num_of_rating: Set(0),
        total_rating: Set(0),
        num_of_reviews: Set(0),
        average_rating: Set(0),
        added_by: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}
