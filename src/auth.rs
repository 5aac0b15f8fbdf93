//! Password accounts, cookie sessions and the request guards layered in
//! front of handlers.

use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{
    extract::{Request, State},
    body::Body,
    http::{
        HeaderValue,
        header::{CONTENT_LENGTH, SET_COOKIE},
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use cookie::{Cookie, SameSite};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};
use tracing::{debug, info, warn};

use crate::{
    AppState,
    config::Config,
    entities::{session, user},
    error::{AppError, AppResult, ErrorPage, unique_violation},
    templates,
};

pub const SESSION_COOKIE: &str = "session";
pub const FLASH_COOKIE: &str = "flash";

#[derive(Clone, Debug, PartialEq)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub is_staff: bool,
}

impl From<user::Model> for AuthUser {
    fn from(u: user::Model) -> Self {
        Self { id: u.id, username: u.username, is_staff: u.is_staff }
    }
}

/// Per-request view of the visitor, available to every handler.
#[derive(Clone, Debug, Default)]
pub struct PageContext {
    pub user: Option<AuthUser>,
    pub flash: Option<String>,
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hash: {e}"))?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
}

pub async fn username_taken(db: &DatabaseConnection, username: &str) -> AppResult<bool> {
    let existing =
        user::Entity::find().filter(user::Column::Username.eq(username)).one(db).await?;
    Ok(existing.is_some())
}

pub async fn register(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    is_staff: bool,
) -> AppResult<user::Model> {
    let model = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)?),
        is_staff: Set(is_staff),
        date_joined: Set(jiff::Timestamp::now().as_second()),
        ..Default::default()
    };

    match model.insert(db).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "registered user");
            Ok(user)
        },
        Err(err) if unique_violation(&err).is_some() => {
            Err(AppError::Conflict(format!("username {username} is already taken")))
        },
        Err(err) => Err(err.into()),
    }
}

pub async fn authenticate(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> AppResult<Option<user::Model>> {
    let found = user::Entity::find().filter(user::Column::Username.eq(username)).one(db).await?;
    Ok(found.filter(|u| verify_password(password, &u.password_hash)))
}

pub async fn start_session(db: &DatabaseConnection, user_id: i32, ttl_days: i64) -> AppResult<String> {
    let token = uuid::Uuid::new_v4().simple().to_string();
    let expires_at = jiff::Timestamp::now().as_second() + ttl_days * 86_400;
    session::ActiveModel {
        token: Set(token.clone()),
        user_id: Set(user_id),
        expires_at: Set(expires_at),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(user_id = user_id, "session started");
    Ok(token)
}

pub async fn end_session(db: &DatabaseConnection, token: &str) -> AppResult<()> {
    session::Entity::delete_many().filter(session::Column::Token.eq(token)).exec(db).await?;
    Ok(())
}

pub async fn user_for_token(db: &DatabaseConnection, token: &str) -> AppResult<Option<AuthUser>> {
    let Some((sess, user)) = session::Entity::find()
        .filter(session::Column::Token.eq(token))
        .find_also_related(user::Entity)
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    if sess.expires_at < jiff::Timestamp::now().as_second() {
        debug!(user_id = sess.user_id, "session expired");
        session::Entity::delete_by_id(sess.id).exec(db).await?;
        return Ok(None);
    }

    Ok(user.map(AuthUser::from))
}

/// Creates or promotes the configured staff account.
pub async fn ensure_admin(db: &DatabaseConnection, config: &Config) -> AppResult<()> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(());
    };

    match user::Entity::find().filter(user::Column::Username.eq(username.as_str())).one(db).await? {
        Some(existing) => {
            let mut active: user::ActiveModel = existing.into();
            active.is_staff = Set(true);
            active.password_hash = Set(hash_password(password)?);
            active.update(db).await?;
            info!(username = %username, "staff account refreshed");
        },
        None => {
            register(db, username, password, true).await?;
            info!(username = %username, "staff account created");
        },
    }
    Ok(())
}

pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token))
        .path("/")
        .http_only(true)
        .secure(config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::days(config.session_ttl_days))
        .build()
}

pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, "")).path("/").max_age(time::Duration::ZERO).build()
}

/// Queues a one-shot message for the next rendered page.
pub fn with_flash(jar: CookieJar, message: &str) -> CookieJar {
    jar.add(
        Cookie::build((FLASH_COOKIE, urlencoding::encode(message).into_owned()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build(),
    )
}

/// Outermost guard: resolves the session cookie and pending flash message
/// into a [`PageContext`] extension, and expires the flash once consumed.
pub async fn load_session(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let user = match jar.get(SESSION_COOKIE) {
        Some(cookie) => match user_for_token(&state.db, cookie.value()).await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "failed to resolve session");
                None
            },
        },
        None => None,
    };

    let flash = jar
        .get(FLASH_COOKIE)
        .and_then(|c| urlencoding::decode(c.value()).ok().map(|m| m.into_owned()))
        .filter(|m| !m.is_empty());
    let had_flash = flash.is_some();

    let ctx = PageContext { user, flash };
    req.extensions_mut().insert(ctx.clone());
    let mut resp = next.run(req).await;

    // Error pages are rendered without a visitor; redo them with the nav
    // of whoever is signed in.
    if let Some(page) = resp.extensions_mut().remove::<ErrorPage>() {
        let body = templates::error_page(&ctx, page.status, &page.message);
        resp.headers_mut().remove(CONTENT_LENGTH);
        *resp.body_mut() = Body::from(body);
    }

    if had_flash && !sets_cookie(&resp, FLASH_COOKIE) {
        if let Ok(value) = HeaderValue::from_str(&removal_cookie(FLASH_COOKIE).to_string()) {
            resp.headers_mut().append(SET_COOKIE, value);
        }
    }
    resp
}

/// Authentication guard: anonymous visitors are sent to the login page and
/// come back to the requested path afterwards.
pub async fn require_login(mut req: Request, next: Next) -> Response {
    let user = req.extensions().get::<PageContext>().and_then(|ctx| ctx.user.clone());
    let Some(user) = user else {
        let target = req.uri().path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
        let location = format!("/user/login/?next={}", urlencoding::encode(target));
        return Redirect::to(&location).into_response();
    };
    req.extensions_mut().insert(user);
    next.run(req).await
}

/// Authorization guard for catalog maintenance. Must run after
/// [`require_login`].
pub async fn require_staff(req: Request, next: Next) -> Response {
    let is_staff = req.extensions().get::<AuthUser>().is_some_and(|u| u.is_staff);
    if !is_staff {
        return AppError::forbidden("Only staff can manage the catalog.").into_response();
    }
    next.run(req).await
}

fn sets_cookie(resp: &Response, name: &str) -> bool {
    let prefix = format!("{name}=");
    resp.headers()
        .get_all(SET_COOKIE)
        .iter()
        .any(|v| v.to_str().is_ok_and(|s| s.starts_with(&prefix)))
}
