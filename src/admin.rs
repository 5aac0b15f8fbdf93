//! Staff-only catalog maintenance. Every handler here sits behind
//! `require_login` and `require_staff`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    Extension,
    extract::{Form, Multipart, State},
    response::{Html, Response},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::{
    AppState,
    auth::{AuthUser, PageContext},
    catalog,
    error::{AppError, AppResult},
    forms::{CastForm, CreditForm, CrewForm, FieldErrors, GenreForm, MovieForm, PersonForm},
    media::{UNREADABLE_IMAGE, Upload, is_supported_image},
    routes::{flash_redirect, unprocessable},
    templates,
};

const DASHBOARD: &str = "/admin/";

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
) -> AppResult<Html<String>> {
    let index = catalog::index(&state.db).await?;
    Ok(Html(templates::admin_page(&ctx, &index, &[])))
}

async fn rejected(state: &AppState, ctx: &PageContext, errors: &FieldErrors) -> AppResult<Response> {
    let index = catalog::index(&state.db).await?;
    let messages: Vec<String> = errors.messages().map(str::to_string).collect();
    Ok(unprocessable(templates::admin_page(ctx, &index, &messages)))
}

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Form(form): Form<GenreForm>,
) -> AppResult<Response> {
    let name = match form.check() {
        Ok(name) => name,
        Err(errors) => return rejected(&state, &ctx, &errors).await,
    };
    let genre = catalog::create_genre(&state.db, &name, Some(user.id)).await?;
    Ok(flash_redirect(jar, &format!("Genre \"{}\" added.", genre.name), DASHBOARD))
}

pub async fn create_person(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut parts = read_multipart(multipart).await?;
    let form = PersonForm {
        full_name: parts.text("full_name"),
        intro: parts.text("intro"),
        date_of_birth: Some(parts.text("date_of_birth")).filter(|d| !d.trim().is_empty()),
    };

    let mut errors = form.check();
    let photo = parts.image("image", &mut errors);
    if !errors.is_empty() {
        return rejected(&state, &ctx, &errors).await;
    }

    let person = match catalog::create_person(&state.db, &state.media, &form, photo).await {
        Err(AppError::BadRequest(message)) => {
            errors.add("image", message);
            return rejected(&state, &ctx, &errors).await;
        },
        other => other?,
    };
    Ok(flash_redirect(jar, &format!("{} added.", person.full_name), DASHBOARD))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    multipart: Multipart,
) -> AppResult<Response> {
    let mut parts = read_multipart(multipart).await?;
    let mut errors = FieldErrors::default();

    let genre_id = match parts.text("genre_id").trim() {
        "" => None,
        raw => match raw.parse::<i32>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("genre_id", "Select a valid genre.");
                None
            },
        },
    };
    let form = MovieForm {
        title: parts.text("title"),
        release_date: parts.text("release_date"),
        official_trailer: parts.text("official_trailer"),
        country_of_origin: parts.text("country_of_origin"),
        genre_id,
        duration: parts.text("duration"),
        awards: parts.text("awards"),
    };

    for message in form.check().messages() {
        errors.add("movie", message);
    }
    let poster = parts.image("poster", &mut errors);
    if !errors.is_empty() {
        return rejected(&state, &ctx, &errors).await;
    }

    let movie =
        match catalog::create_movie(&state.db, &state.media, &form, poster, Some(user.id)).await {
            Err(AppError::BadRequest(message)) => {
                errors.add("poster", message);
                return rejected(&state, &ctx, &errors).await;
            },
            other => other?,
        };
    Ok(flash_redirect(jar, &format!("{} added.", movie.title), DASHBOARD))
}

pub async fn add_cast(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Form(form): Form<CastForm>,
) -> AppResult<Response> {
    catalog::add_cast(&state.db, &form, Some(user.id)).await?;
    Ok(flash_redirect(jar, "Cast member added.", DASHBOARD))
}

pub async fn add_director(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Form(form): Form<CreditForm>,
) -> AppResult<Response> {
    catalog::add_director(&state.db, &form, Some(user.id)).await?;
    Ok(flash_redirect(jar, "Director added.", DASHBOARD))
}

pub async fn add_producer(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    jar: CookieJar,
    Form(form): Form<CreditForm>,
) -> AppResult<Response> {
    catalog::add_producer(&state.db, &form, Some(user.id)).await?;
    Ok(flash_redirect(jar, "Producer added.", DASHBOARD))
}

pub async fn add_crew(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<PageContext>,
    jar: CookieJar,
    Form(form): Form<CrewForm>,
) -> AppResult<Response> {
    let errors = form.check();
    if !errors.is_empty() {
        return rejected(&state, &ctx, &errors).await;
    }
    catalog::add_crew(&state.db, &form).await?;
    Ok(flash_redirect(jar, "Crew member added.", DASHBOARD))
}

#[derive(Debug, Default)]
struct MultipartParts {
    text: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl MultipartParts {
    fn text(&mut self, name: &str) -> String {
        self.text.remove(name).unwrap_or_default()
    }

    /// Takes the upload for `name`, if one was chosen, recording an error
    /// when it is plainly not an image. Full decoding happens when it is
    /// stored.
    fn image(&mut self, name: &str, errors: &mut FieldErrors) -> Option<Upload> {
        let upload = self.files.remove(name)?;
        if !is_supported_image(&upload.file_name) || image::guess_format(&upload.bytes).is_err() {
            errors.add(name, UNREADABLE_IMAGE);
            return None;
        }
        Some(upload)
    }
}

async fn read_multipart(mut multipart: Multipart) -> AppResult<MultipartParts> {
    let mut parts = MultipartParts::default();
    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let bytes = field.bytes().await?;
                // Browsers send an empty part when no file was picked.
                if file_name.is_empty() || bytes.is_empty() {
                    continue;
                }
                debug!(field = %name, file = %file_name, bytes = bytes.len(), "received upload");
                parts.files.insert(name, Upload { file_name, bytes: bytes.to_vec() });
            },
            None => {
                let value = field.text().await?;
                parts.text.insert(name, value);
            },
        }
    }
    Ok(parts)
}
