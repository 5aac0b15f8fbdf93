use std::sync::Arc;

use axum::{
    Extension,
    extract::{Form, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{info, warn};

use crate::{
    AppState,
    auth::{self, PageContext, SESSION_COOKIE},
    error::AppResult,
    forms::{FieldErrors, LoginForm, NextQuery, SignUpForm, safe_next},
    routes::{flash_redirect, unprocessable},
    templates,
};

const BAD_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

pub async fn signup_form(Extension(ctx): Extension<PageContext>) -> Html<String> {
    Html(templates::signup_page(&ctx, "", &FieldErrors::default()))
}

pub async fn signup_submit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    jar: CookieJar,
    Form(form): Form<SignUpForm>,
) -> AppResult<Response> {
    let mut errors = form.check();
    if errors.get("username").is_empty() && auth::username_taken(&state.db, &form.username).await? {
        errors.add("username", "A user with that username already exists.");
    }
    if !errors.is_empty() {
        return Ok(unprocessable(templates::signup_page(&ctx, &form.username, &errors)));
    }

    auth::register(&state.db, &form.username, &form.password1, false).await?;
    Ok(flash_redirect(jar, "Your account was created. You can log in now.", "/user/login/"))
}

pub async fn login_form(
    Extension(ctx): Extension<PageContext>,
    Query(query): Query<NextQuery>,
) -> Html<String> {
    let next = safe_next(query.next.as_deref());
    Html(templates::login_page(&ctx, "", next, None))
}

pub async fn login_submit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    let next = safe_next(form.next.as_deref()).to_string();

    let Some(user) = auth::authenticate(&state.db, form.username.trim(), &form.password).await?
    else {
        warn!(username = %form.username, "failed login");
        let page = templates::login_page(&ctx, &form.username, &next, Some(BAD_LOGIN));
        return Ok((StatusCode::UNAUTHORIZED, Html(page)).into_response());
    };

    let token = auth::start_session(&state.db, user.id, state.config.session_ttl_days).await?;
    info!(user_id = user.id, username = %user.username, "logged in");
    let jar = jar.add(auth::session_cookie(token, &state.config));
    Ok((jar, Redirect::to(&next)).into_response())
}

pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> AppResult<Response> {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        auth::end_session(&state.db, cookie.value()).await?;
    }
    let jar = jar.add(auth::removal_cookie(SESSION_COOKIE));
    let page = templates::logout_page(&PageContext::default());
    Ok((jar, Html(page)).into_response())
}
