use std::sync::Arc;

use axum::{
    Extension, Router,
    extract::{DefaultBodyLimit, Form, Path, State},
    http::StatusCode,
    middleware::{from_fn, from_fn_with_state},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use axum_extra::extract::CookieJar;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::{
    AppState, accounts, admin,
    auth::{self, AuthUser, PageContext},
    catalog,
    error::AppResult,
    forms::{FieldErrors, RatingForm, ReviewForm, SearchForm},
    ratings, reviews, templates,
};

const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

pub fn router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/", get(home))
        .route("/show/{slug}/", get(show_movie))
        .route("/list/{genre}/", get(genre_movies))
        .route("/show-reviews/{slug}/", get(show_reviews))
        .route("/person/{slug}/", get(person_detail))
        .route("/search", get(search_form).post(search_submit))
        .route("/user/signup/", get(accounts::signup_form).post(accounts::signup_submit))
        .route("/user/login/", get(accounts::login_form).post(accounts::login_submit))
        .route("/user/logout/", get(accounts::logout).post(accounts::logout));

    let members = Router::new()
        .route("/rate/{slug}/", get(rate_form).post(rate_submit))
        .route("/review/{slug}/", get(review_form).post(review_submit))
        .route("/update-review/{slug}/", get(update_review_form).post(update_review_submit))
        .route("/delete-review/{slug}/", get(delete_review_confirm).post(delete_review_submit))
        .route_layer(from_fn(auth::require_login));

    // route_layer order: the last one added runs first.
    let staff = Router::new()
        .route("/admin/", get(admin::dashboard))
        .route("/admin/genres", axum::routing::post(admin::create_genre))
        .route("/admin/people", axum::routing::post(admin::create_person))
        .route("/admin/movies", axum::routing::post(admin::create_movie))
        .route("/admin/credits/cast", axum::routing::post(admin::add_cast))
        .route("/admin/credits/director", axum::routing::post(admin::add_director))
        .route("/admin/credits/producer", axum::routing::post(admin::add_producer))
        .route("/admin/credits/crew", axum::routing::post(admin::add_crew))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .route_layer(from_fn(auth::require_staff))
        .route_layer(from_fn(auth::require_login));

    Router::new()
        .merge(public)
        .merge(members)
        .merge(staff)
        .nest_service("/media", ServeDir::new(state.media.root()))
        .layer(from_fn_with_state(state.clone(), auth::load_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub(crate) fn unprocessable(body: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
}

pub(crate) fn flash_redirect(jar: CookieJar, message: &str, to: &str) -> Response {
    (auth::with_flash(jar, message), Redirect::to(to)).into_response()
}

pub async fn home(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
) -> AppResult<Html<String>> {
    let movies = catalog::home(&state.db).await?;
    Ok(Html(templates::home_page(&ctx, &movies)))
}

pub async fn show_movie(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let detail = catalog::movie_detail(&state.db, &slug).await?;
    Ok(Html(templates::movie_page(&ctx, &detail)))
}

pub async fn genre_movies(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Path(genre): Path<String>,
) -> AppResult<Html<String>> {
    let listing = catalog::movies_by_genre(&state.db, &genre).await?;
    Ok(Html(templates::genre_page(&ctx, &listing)))
}

pub async fn person_detail(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let detail = catalog::person_detail(&state.db, &slug).await?;
    Ok(Html(templates::person_page(&ctx, &detail)))
}

pub async fn search_form(Extension(ctx): Extension<PageContext>) -> Html<String> {
    Html(templates::search_page(&ctx, "", &FieldErrors::default()))
}

pub async fn search_submit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Form(form): Form<SearchForm>,
) -> AppResult<Response> {
    let keyword = match form.check() {
        Ok(keyword) => keyword,
        Err(errors) => return Ok(unprocessable(templates::search_page(&ctx, &form.keyword, &errors))),
    };
    let results = catalog::search(&state.db, &keyword).await?;
    Ok(Html(templates::search_results_page(&ctx, &keyword, &results)).into_response())
}

pub async fn rate_form(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let movie = catalog::movie_by_slug(&state.db, &slug).await?;
    ratings::ensure_can_rate(&state.db, user.id, movie.id).await?;
    Ok(Html(templates::rate_page(&ctx, &movie, "", &FieldErrors::default())))
}

pub async fn rate_submit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Form(form): Form<RatingForm>,
) -> AppResult<Response> {
    let movie = catalog::movie_by_slug(&state.db, &slug).await?;
    ratings::ensure_can_rate(&state.db, user.id, movie.id).await?;

    let value = match form.check() {
        Ok(value) => value,
        Err(errors) => {
            return Ok(unprocessable(templates::rate_page(&ctx, &movie, &form.rating, &errors)));
        },
    };

    ratings::submit(&state.db, user.id, movie.id, value).await?;
    Ok(flash_redirect(jar, "Thanks for rating!", "/"))
}

pub async fn show_reviews(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let (movie, entries) = reviews::list_for_movie(&state.db, &slug).await?;
    Ok(Html(templates::reviews_page(&ctx, &movie, &entries)))
}

pub async fn review_form(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let movie = catalog::movie_by_slug(&state.db, &slug).await?;
    reviews::ensure_can_review(&state.db, user.id, movie.id).await?;
    Ok(Html(templates::review_page(&ctx, &movie, "", &FieldErrors::default())))
}

pub async fn review_submit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let movie = catalog::movie_by_slug(&state.db, &slug).await?;
    reviews::ensure_can_review(&state.db, user.id, movie.id).await?;

    let text = match form.check() {
        Ok(text) => text,
        Err(errors) => {
            return Ok(unprocessable(templates::review_page(&ctx, &movie, &form.review, &errors)));
        },
    };

    reviews::create(&state.db, user.id, movie.id, &text).await?;
    Ok(flash_redirect(jar, "Your review was posted.", "/"))
}

pub async fn update_review_form(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let review = reviews::owned_review(&state.db, &slug, user.id).await?;
    let movie = reviews::movie_of(&state.db, &review).await?;
    Ok(Html(templates::update_review_page(
        &ctx,
        &review,
        &movie,
        &review.review,
        &FieldErrors::default(),
    )))
}

pub async fn update_review_submit(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
    jar: CookieJar,
    Form(form): Form<ReviewForm>,
) -> AppResult<Response> {
    let review = reviews::owned_review(&state.db, &slug, user.id).await?;

    let text = match form.check() {
        Ok(text) => text,
        Err(errors) => {
            let movie = reviews::movie_of(&state.db, &review).await?;
            return Ok(unprocessable(templates::update_review_page(
                &ctx,
                &review,
                &movie,
                &form.review,
                &errors,
            )));
        },
    };

    reviews::update(&state.db, review, &text).await?;
    Ok(flash_redirect(jar, "Your review was updated.", "/"))
}

pub async fn delete_review_confirm(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
) -> AppResult<Html<String>> {
    let review = reviews::owned_review(&state.db, &slug, user.id).await?;
    let movie = reviews::movie_of(&state.db, &review).await?;
    Ok(Html(templates::delete_review_page(&ctx, &review, &movie)))
}

pub async fn delete_review_submit(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(slug): Path<String>,
    jar: CookieJar,
) -> AppResult<Response> {
    let review = reviews::owned_review(&state.db, &slug, user.id).await?;
    reviews::delete(&state.db, review).await?;
    Ok(flash_redirect(jar, "Your review was deleted.", "/"))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use sea_orm::EntityTrait;
    use tower::ServiceExt;

    use super::*;
    use crate::{entities::movie, test_support};

    async fn body_text(resp: Response) -> String {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn form_post(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn session_cookie_of(resp: &Response) -> String {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with("session="))
            .and_then(|v| v.split(';').next())
            .unwrap()
            .to_string()
    }

    async fn login(app: &Router, username: &str) -> String {
        let resp = app
            .clone()
            .oneshot(form_post(
                "/user/login/",
                &format!("username={username}&password=long+enough"),
                None,
            ))
            .await
            .unwrap();
        session_cookie_of(&resp)
    }

    fn sets_flash(resp: &Response) -> bool {
        resp.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(|v| v.starts_with("flash=") && !v.starts_with("flash=;"))
    }

    fn get_with(uri: &str, cookie: &str) -> Request<Body> {
        Request::get(uri).header(header::COOKIE, cookie).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn home_renders_latest_movies() {
        let db = test_support::setup_db().await;
        test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let app = router(test_support::state(db));

        let resp = app.oneshot(Request::get("/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(body_text(resp).await.contains("Heat"));
    }

    #[tokio::test]
    async fn unknown_movie_is_404() {
        let db = test_support::setup_db().await;
        let app = router(test_support::state(db));

        let resp =
            app.oneshot(Request::get("/show/nope/").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn anonymous_rating_redirects_to_login() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let app = router(test_support::state(db));

        let uri = format!("/rate/{}/", movie.slug);
        let resp = app.oneshot(Request::get(&uri).body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::SEE_OTHER);
        let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
        assert_eq!(location, "/user/login/?next=%2Frate%2Fheat-none-1995-12-15%2F");
    }

    #[tokio::test]
    async fn members_are_kept_out_of_admin() {
        let db = test_support::setup_db().await;
        auth::register(&db, "member", "long enough", false).await.unwrap();
        let app = router(test_support::state(db));

        let login = app
            .clone()
            .oneshot(form_post("/user/login/", "username=member&password=long+enough", None))
            .await
            .unwrap();
        let cookie = session_cookie_of(&login);

        let resp = app
            .oneshot(Request::get("/admin/").header(header::COOKIE, cookie).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn signup_login_and_rate() {
        let db = test_support::setup_db().await;
        let heat = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let app = router(test_support::state(db.clone()));

        let signup = app
            .clone()
            .oneshot(form_post(
                "/user/signup/",
                "username=neil&password1=long+enough&password2=long+enough",
                None,
            ))
            .await
            .unwrap();
        assert_eq!(signup.status(), StatusCode::SEE_OTHER);
        assert_eq!(signup.headers().get(header::LOCATION).unwrap(), "/user/login/");

        let next = format!("/rate/{}/", heat.slug);
        let login = app
            .clone()
            .oneshot(form_post(
                "/user/login/",
                &format!("username=neil&password=long+enough&next={}", urlencoding::encode(&next)),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(login.status(), StatusCode::SEE_OTHER);
        assert_eq!(login.headers().get(header::LOCATION).unwrap().to_str().unwrap(), next);
        let cookie = session_cookie_of(&login);

        let invalid = app.clone().oneshot(form_post(&next, "rating=11", Some(&cookie))).await.unwrap();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let rated = app.clone().oneshot(form_post(&next, "rating=9", Some(&cookie))).await.unwrap();
        assert_eq!(rated.status(), StatusCode::SEE_OTHER);

        let again = app.oneshot(form_post(&next, "rating=3", Some(&cookie))).await.unwrap();
        assert_eq!(again.status(), StatusCode::FORBIDDEN);

        let stored = movie::Entity::find_by_id(heat.id).one(&db).await.unwrap().unwrap();
        assert_eq!((stored.num_of_rating, stored.total_rating, stored.average_rating), (1, 9, 9));
    }

    #[tokio::test]
    async fn only_the_author_can_edit_or_delete_a_review() {
        let db = test_support::setup_db().await;
        let heat = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let author = auth::register(&db, "neil", "long enough", false).await.unwrap();
        auth::register(&db, "vincent", "long enough", false).await.unwrap();
        let review = reviews::create(&db, author.id, heat.id, "Tense.").await.unwrap();
        let app = router(test_support::state(db.clone()));
        let cookie = login(&app, "vincent").await;

        let edit = format!("/update-review/{}/", review.slug);
        let remove = format!("/delete-review/{}/", review.slug);

        let form = app.clone().oneshot(get_with(&edit, &cookie)).await.unwrap();
        assert_eq!(form.status(), StatusCode::FORBIDDEN);
        assert!(body_text(form).await.contains("vincent"));

        let edited =
            app.clone().oneshot(form_post(&edit, "review=Mine+now", Some(&cookie))).await.unwrap();
        assert_eq!(edited.status(), StatusCode::FORBIDDEN);

        let confirm = app.clone().oneshot(get_with(&remove, &cookie)).await.unwrap();
        assert_eq!(confirm.status(), StatusCode::FORBIDDEN);

        let deleted = app.oneshot(form_post(&remove, "", Some(&cookie))).await.unwrap();
        assert_eq!(deleted.status(), StatusCode::FORBIDDEN);

        let (_, listed) = reviews::list_for_movie(&db, &heat.slug).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].review.review, "Tense.");
        let stored = movie::Entity::find_by_id(heat.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.num_of_reviews, 1);
    }

    #[tokio::test]
    async fn author_edits_then_deletes_a_review() {
        let db = test_support::setup_db().await;
        let heat = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let author = auth::register(&db, "neil", "long enough", false).await.unwrap();
        let review = reviews::create(&db, author.id, heat.id, "Tense.").await.unwrap();
        let app = router(test_support::state(db.clone()));
        let cookie = login(&app, "neil").await;

        let edit = format!("/update-review/{}/", review.slug);
        let blank = app.clone().oneshot(form_post(&edit, "review=+", Some(&cookie))).await.unwrap();
        assert_eq!(blank.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let edited = app
            .clone()
            .oneshot(form_post(&edit, "review=Tense+and+long.", Some(&cookie)))
            .await
            .unwrap();
        assert_eq!(edited.status(), StatusCode::SEE_OTHER);
        assert!(sets_flash(&edited));
        let (_, listed) = reviews::list_for_movie(&db, &heat.slug).await.unwrap();
        assert_eq!(listed[0].review.review, "Tense and long.");
        assert_eq!(listed[0].review.slug, review.slug);

        let remove = format!("/delete-review/{}/", review.slug);
        let confirm = app.clone().oneshot(get_with(&remove, &cookie)).await.unwrap();
        assert_eq!(confirm.status(), StatusCode::OK);

        let deleted = app.clone().oneshot(form_post(&remove, "", Some(&cookie))).await.unwrap();
        assert_eq!(deleted.status(), StatusCode::SEE_OTHER);
        assert!(sets_flash(&deleted));

        let again = app.oneshot(form_post(&remove, "", Some(&cookie))).await.unwrap();
        assert_eq!(again.status(), StatusCode::NOT_FOUND);

        let stored = movie::Entity::find_by_id(heat.id).one(&db).await.unwrap().unwrap();
        assert_eq!(stored.num_of_reviews, 0);
        assert!(reviews::list_for_movie(&db, &heat.slug).await.unwrap().1.is_empty());
    }
}
