use axum::http::StatusCode;
use maud::{DOCTYPE, Markup, html};

use crate::{
    auth::PageContext,
    entities::{genre, movie, person, review},
    forms::{FieldErrors, RATING_CHOICES},
    models::{CatalogIndex, GenreListing, MovieDetail, PersonDetail, ReviewEntry, SearchResults},
};

const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

const INPUT: &str = "mt-2 w-full rounded-md border border-gray-300 px-3 py-2 focus:border-blue-500 focus:outline-none focus:ring-1 focus:ring-blue-500";
const BUTTON: &str =
    "rounded-md bg-blue-600 px-4 py-2 font-semibold text-white hover:bg-blue-700";
const CARD: &str = "bg-white shadow rounded-lg p-8";
const LINK: &str = "text-blue-600 hover:text-blue-800";

pub fn home_page(ctx: &PageContext, movies: &[movie::Model]) -> String {
    page(
        "Movies",
        ctx,
        html! {
            div class=(CARD) {
                h1 class="text-3xl font-bold text-gray-900" { "Latest releases" }
                (search_box(""))
            }
            @if movies.is_empty() {
                div class="mt-8 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "The catalog is empty." }
                }
            } @else {
                div class="mt-8 grid gap-6 sm:grid-cols-2" {
                    @for movie in movies {
                        (movie_card(movie))
                    }
                }
            }
        },
    )
}

pub fn genre_page(ctx: &PageContext, listing: &GenreListing) -> String {
    page(
        &listing.genre.name,
        ctx,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { (listing.genre.name) }
            @if listing.movies.is_empty() {
                p class="mt-6 text-gray-600" { "No movies in this genre yet." }
            } @else {
                div class="mt-8 grid gap-6 sm:grid-cols-2" {
                    @for movie in &listing.movies {
                        (movie_card(movie))
                    }
                }
            }
        },
    )
}

pub fn movie_page(ctx: &PageContext, detail: &MovieDetail) -> String {
    let movie = &detail.movie;
    page(
        &movie.title,
        ctx,
        html! {
            div class=(CARD) {
                div class="flex flex-col gap-8 md:flex-row" {
                    img class="w-full md:w-64 rounded-md object-cover" src=(media_url(&movie.poster)) alt=(movie.title);
                    div class="flex-1" {
                        h1 class="text-3xl font-bold text-gray-900" { (movie.title) }
                        p class="mt-2 text-gray-600" {
                            (movie.release_date)
                            @if let Some(genre) = &detail.genre {
                                " · " a class=(LINK) href=(genre_url(genre)) { (genre.name) }
                            }
                            " · " (movie.duration)
                            " · " (movie.country_of_origin)
                        }
                        (rating_summary(movie))
                        @if !movie.awards.is_empty() {
                            p class="mt-4 text-gray-700" { span class="font-semibold" { "Awards: " } (movie.awards) }
                        }
                        div class="mt-6 flex flex-wrap gap-4 text-sm" {
                            a class=(LINK) href=(movie.official_trailer) target="_blank" rel="noopener noreferrer" { "Official trailer" }
                            a class=(LINK) href=(format!("/rate/{}/", movie.slug)) { "Rate" }
                            a class=(LINK) href=(format!("/review/{}/", movie.slug)) { "Write a review" }
                            a class=(LINK) href=(format!("/show-reviews/{}/", movie.slug)) {
                                "Reviews (" (movie.num_of_reviews) ")"
                            }
                        }
                    }
                }

                div class="mt-8 grid gap-6 md:grid-cols-2" {
                    (people_list("Directed by", &detail.directors))
                    (people_list("Produced by", &detail.producers))
                }

                @if !detail.cast.is_empty() {
                    h2 class="mt-8 text-xl font-semibold text-gray-900" { "Cast" }
                    ul class="mt-2 space-y-1" {
                        @for member in &detail.cast {
                            li class="text-gray-700" {
                                a class=(LINK) href=(person_url(&member.person)) { (member.person.full_name) }
                                @if let Some(character) = &member.character {
                                    span class="text-gray-500" { " as " (character) }
                                }
                                @if member.star {
                                    span class="ml-2 text-xs font-semibold text-yellow-600" { "★ star" }
                                }
                            }
                        }
                    }
                }

                @if !detail.crew.is_empty() {
                    h2 class="mt-8 text-xl font-semibold text-gray-900" { "Crew" }
                    ul class="mt-2 space-y-1" {
                        @for member in &detail.crew {
                            li class="text-gray-700" { (member.name) span class="text-gray-500" { " · " (member.role) } }
                        }
                    }
                }
            }
        },
    )
}

pub fn person_page(ctx: &PageContext, detail: &PersonDetail) -> String {
    let person = &detail.person;
    page(
        &person.full_name,
        ctx,
        html! {
            div class=(CARD) {
                div class="flex flex-col gap-8 md:flex-row" {
                    img class="w-full md:w-56 rounded-md object-cover" src=(media_url(&person.image)) alt=(person.full_name);
                    div class="flex-1" {
                        h1 class="text-3xl font-bold text-gray-900" { (person.full_name) }
                        @if let Some(dob) = &person.date_of_birth {
                            p class="mt-1 text-sm text-gray-500" { "Born " (dob) }
                        }
                        p class="mt-4 whitespace-pre-line text-gray-700" { (person.intro) }
                    }
                }
                @if !detail.acted.is_empty() {
                    h2 class="mt-8 text-xl font-semibold text-gray-900" { "Acting" }
                    ul class="mt-2 space-y-1" {
                        @for role in &detail.acted {
                            li class="text-gray-700" {
                                a class=(LINK) href=(movie_url(&role.movie)) { (role.movie.title) }
                                @if let Some(character) = &role.character {
                                    span class="text-gray-500" { " as " (character) }
                                }
                            }
                        }
                    }
                }
                (movie_links("Directing", &detail.directed))
                (movie_links("Producing", &detail.produced))
            }
        },
    )
}

pub fn rate_page(
    ctx: &PageContext,
    movie: &movie::Model,
    selected: &str,
    errors: &FieldErrors,
) -> String {
    page(
        "Rate",
        ctx,
        html! {
            div class="max-w-xl mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Rate " (movie.title) }
                    form class="mt-6 space-y-6" method="post" action=(format!("/rate/{}/", movie.slug)) {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="rating" { "Your Rating:" }
                            select class=(INPUT) name="rating" id="rating" required {
                                @for n in RATING_CHOICES {
                                    @let value = n.to_string();
                                    option value=(value) selected[value == selected] { (n) }
                                }
                            }
                            (field_errors(errors, "rating"))
                        }
                        button class=(BUTTON) type="submit" { "Submit" }
                    }
                }
            }
        },
    )
}

pub fn reviews_page(ctx: &PageContext, movie: &movie::Model, reviews: &[ReviewEntry]) -> String {
    let me = ctx.user.as_ref().map(|u| u.id);
    page(
        "Reviews",
        ctx,
        html! {
            div class="flex items-start justify-between gap-6" {
                h1 class="text-3xl font-bold text-gray-900" {
                    "Reviews of " a class=(LINK) href=(movie_url(movie)) { (movie.title) }
                }
                a class=(LINK) href=(format!("/review/{}/", movie.slug)) { "Write a review" }
            }
            @if reviews.is_empty() {
                p class="mt-6 text-gray-600" { "No reviews yet." }
            } @else {
                div class="mt-8 space-y-4" {
                    @for entry in reviews {
                        div class="bg-white shadow rounded-lg p-6" {
                            p class="text-sm text-gray-500" {
                                span class="font-semibold text-gray-700" { (entry.author) }
                                " · " (format_timestamp(entry.review.created_at))
                            }
                            p class="mt-3 whitespace-pre-line text-gray-800" { (entry.review.review) }
                            @if me == Some(entry.review.user_id) {
                                div class="mt-4 flex gap-4 text-sm" {
                                    a class=(LINK) href=(format!("/update-review/{}/", entry.review.slug)) { "Edit" }
                                    a class="text-red-600 hover:text-red-800" href=(format!("/delete-review/{}/", entry.review.slug)) { "Delete" }
                                }
                            }
                        }
                    }
                }
            }
        },
    )
}

pub fn review_page(ctx: &PageContext, movie: &movie::Model, text: &str, errors: &FieldErrors) -> String {
    page(
        "Write a review",
        ctx,
        html! {
            div class="max-w-2xl mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Review " (movie.title) }
                    (review_form(&format!("/review/{}/", movie.slug), text, errors, "Post review"))
                }
            }
        },
    )
}

pub fn update_review_page(
    ctx: &PageContext,
    review: &review::Model,
    movie: &movie::Model,
    text: &str,
    errors: &FieldErrors,
) -> String {
    page(
        "Edit review",
        ctx,
        html! {
            div class="max-w-2xl mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Edit your review of " (movie.title) }
                    (review_form(&format!("/update-review/{}/", review.slug), text, errors, "Save"))
                }
            }
        },
    )
}

pub fn delete_review_page(ctx: &PageContext, review: &review::Model, movie: &movie::Model) -> String {
    page(
        "Delete review",
        ctx,
        html! {
            div class="max-w-xl mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Delete review" }
                    p class="mt-4 text-gray-700" {
                        "Are you sure you want to delete your review of " (movie.title) "?"
                    }
                    blockquote class="mt-4 border-l-4 border-gray-300 pl-4 text-gray-600" { (review.review) }
                    form class="mt-6 flex items-center gap-4" method="post" action=(format!("/delete-review/{}/", review.slug)) {
                        button class="rounded-md bg-red-600 px-4 py-2 font-semibold text-white hover:bg-red-700" type="submit" { "Yes, delete" }
                        a class=(LINK) href=(format!("/show-reviews/{}/", movie.slug)) { "Cancel" }
                    }
                }
            }
        },
    )
}

pub fn search_page(ctx: &PageContext, keyword: &str, errors: &FieldErrors) -> String {
    page(
        "Search",
        ctx,
        html! {
            div class="max-w-xl mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Search" }
                    p class="mt-2 text-gray-600" { "Enter an exact movie title or person name." }
                    (search_box(keyword))
                    (field_errors(errors, "keyword"))
                }
            }
        },
    )
}

pub fn search_results_page(ctx: &PageContext, keyword: &str, results: &SearchResults) -> String {
    page(
        "Search results",
        ctx,
        html! {
            div class="flex items-start justify-between gap-6" {
                div {
                    h1 class="text-3xl font-bold text-gray-900" { "Results" }
                    p class="mt-2 text-gray-600" { "for “" (keyword) "”" }
                }
                a class=(LINK) href="/search" { "New search" }
            }
            @if results.is_empty() {
                div class="mt-10 bg-white shadow rounded-lg p-8" {
                    p class="text-gray-600" { "Nothing matched." }
                }
            } @else {
                @if !results.movies.is_empty() {
                    h2 class="mt-10 text-xl font-semibold text-gray-900" { "Movies" }
                    div class="mt-4 grid gap-6 sm:grid-cols-2" {
                        @for movie in &results.movies { (movie_card(movie)) }
                    }
                }
                @if !results.people.is_empty() {
                    h2 class="mt-10 text-xl font-semibold text-gray-900" { "People" }
                    ul class="mt-4 space-y-2" {
                        @for person in &results.people {
                            li { a class=(LINK) href=(person_url(person)) { (person.full_name) } }
                        }
                    }
                }
            }
        },
    )
}

pub fn signup_page(ctx: &PageContext, username: &str, errors: &FieldErrors) -> String {
    page(
        "Sign up",
        ctx,
        html! {
            div class="max-w-md mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Create an account" }
                    form class="mt-6 space-y-6" method="post" action="/user/signup/" {
                        div {
                            label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                            input class=(INPUT) name="username" id="username" value=(username) maxlength="150" required;
                            (field_errors(errors, "username"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password1" { "Password" }
                            input class=(INPUT) type="password" name="password1" id="password1" required;
                            (field_errors(errors, "password1"))
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password2" { "Password confirmation" }
                            input class=(INPUT) type="password" name="password2" id="password2" required;
                            (field_errors(errors, "password2"))
                        }
                        button class=(format!("w-full {BUTTON}")) type="submit" { "Sign up" }
                    }
                    p class="mt-6 text-sm text-gray-600" {
                        "Already registered? " a class=(LINK) href="/user/login/" { "Log in" }
                    }
                }
            }
        },
    )
}

pub fn login_page(ctx: &PageContext, username: &str, next: &str, error: Option<&str>) -> String {
    page(
        "Log in",
        ctx,
        html! {
            div class="max-w-md mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "Log in" }
                    @if let Some(error) = error {
                        p class="mt-4 rounded-md bg-red-50 px-4 py-2 text-sm text-red-700" { (error) }
                    }
                    form class="mt-6 space-y-6" method="post" action="/user/login/" {
                        input type="hidden" name="next" value=(next);
                        div {
                            label class="block text-sm font-medium text-gray-700" for="username" { "Username" }
                            input class=(INPUT) name="username" id="username" value=(username) required;
                        }
                        div {
                            label class="block text-sm font-medium text-gray-700" for="password" { "Password" }
                            input class=(INPUT) type="password" name="password" id="password" required;
                        }
                        button class=(format!("w-full {BUTTON}")) type="submit" { "Log in" }
                    }
                    p class="mt-6 text-sm text-gray-600" {
                        "No account yet? " a class=(LINK) href="/user/signup/" { "Sign up" }
                    }
                }
            }
        },
    )
}

pub fn logout_page(ctx: &PageContext) -> String {
    page(
        "Logged out",
        ctx,
        html! {
            div class="max-w-md mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" { "You have been logged out" }
                    a class=(format!("mt-6 inline-block {LINK}")) href="/user/login/" { "Log in again" }
                }
            }
        },
    )
}

pub fn admin_page(ctx: &PageContext, index: &CatalogIndex, errors: &[String]) -> String {
    page(
        "Catalog admin",
        ctx,
        html! {
            h1 class="text-3xl font-bold text-gray-900" { "Catalog admin" }
            @if !errors.is_empty() {
                ul class="mt-6 rounded-md bg-red-50 px-6 py-4 text-sm text-red-700 list-disc" {
                    @for error in errors { li { (error) } }
                }
            }
            div class="mt-8 grid gap-6 lg:grid-cols-2" {
                div class=(CARD) {
                    h2 class="text-xl font-semibold text-gray-900" { "New genre" }
                    form class="mt-4 space-y-4" method="post" action="/admin/genres" {
                        input class=(INPUT) name="name" placeholder="Name" required;
                        button class=(BUTTON) type="submit" { "Add genre" }
                    }
                }

                div class=(CARD) {
                    h2 class="text-xl font-semibold text-gray-900" { "New person" }
                    form class="mt-4 space-y-4" method="post" action="/admin/people" enctype="multipart/form-data" {
                        input class=(INPUT) name="full_name" placeholder="Full name" maxlength="250" required;
                        textarea class=(INPUT) name="intro" placeholder="Intro" rows="3" required {}
                        input class=(INPUT) type="date" name="date_of_birth";
                        input class=(INPUT) type="file" name="image" accept="image/*";
                        button class=(BUTTON) type="submit" { "Add person" }
                    }
                }

                div class=(CARD) {
                    h2 class="text-xl font-semibold text-gray-900" { "New movie" }
                    form class="mt-4 space-y-4" method="post" action="/admin/movies" enctype="multipart/form-data" {
                        input class=(INPUT) name="title" placeholder="Title" required;
                        input class=(INPUT) type="date" name="release_date" required;
                        input class=(INPUT) type="url" name="official_trailer" placeholder="Trailer URL" required;
                        input class=(INPUT) name="country_of_origin" placeholder="Country of origin" required;
                        select class=(INPUT) name="genre_id" {
                            option value="" { "No genre" }
                            @for genre in &index.genres { (genre_option(genre)) }
                        }
                        input class=(INPUT) name="duration" placeholder="Duration" maxlength="700" required;
                        textarea class=(INPUT) name="awards" placeholder="Awards" rows="2" {}
                        input class=(INPUT) type="file" name="poster" accept="image/*";
                        button class=(BUTTON) type="submit" { "Add movie" }
                    }
                }

                div class=(CARD) {
                    h2 class="text-xl font-semibold text-gray-900" { "Credits" }
                    form class="mt-4 space-y-4" method="post" action="/admin/credits/cast" {
                        h3 class="text-sm font-semibold text-gray-700" { "Cast" }
                        (movie_select(&index.movies))
                        (person_select(&index.people))
                        input class=(INPUT) name="character" placeholder="Character";
                        label class="flex items-center gap-2 text-sm text-gray-700" {
                            input type="checkbox" name="star"; "Star"
                        }
                        button class=(BUTTON) type="submit" { "Add cast member" }
                    }
                    @for (label, action) in [("Director", "/admin/credits/director"), ("Producer", "/admin/credits/producer")] {
                        form class="mt-6 space-y-4" method="post" action=(action) {
                            h3 class="text-sm font-semibold text-gray-700" { (label) }
                            (movie_select(&index.movies))
                            (person_select(&index.people))
                            button class=(BUTTON) type="submit" { "Add " (label.to_lowercase()) }
                        }
                    }
                    form class="mt-6 space-y-4" method="post" action="/admin/credits/crew" {
                        h3 class="text-sm font-semibold text-gray-700" { "Crew" }
                        (movie_select(&index.movies))
                        input class=(INPUT) name="name" placeholder="Name" maxlength="250" required;
                        input class=(INPUT) name="role" placeholder="Role" maxlength="250" required;
                        button class=(BUTTON) type="submit" { "Add crew member" }
                    }
                }
            }
        },
    )
}

pub fn error_page(ctx: &PageContext, status: StatusCode, message: &str) -> String {
    page(
        "Error",
        ctx,
        html! {
            div class="max-w-xl mx-auto" {
                div class=(CARD) {
                    h1 class="text-2xl font-bold text-gray-900" {
                        (status.as_u16()) " " (status.canonical_reason().unwrap_or("Error"))
                    }
                    p class="mt-4 text-gray-700" { (message) }
                    a class=(format!("mt-6 inline-block {LINK}")) href="/" { "Back" }
                }
            }
        },
    )
}

fn page(title: &str, ctx: &PageContext, body: Markup) -> String {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) " · reelbase" }
                script src=(TAILWIND_CDN) {}
            }
            body class="min-h-screen bg-gray-50" {
                (nav(ctx))
                main class="max-w-5xl mx-auto px-6 py-10" {
                    @if let Some(flash) = &ctx.flash {
                        div class="mb-6 rounded-md bg-green-50 px-4 py-3 text-sm text-green-800" { (flash) }
                    }
                    (body)
                }
            }
        }
    }
    .into_string()
}

fn nav(ctx: &PageContext) -> Markup {
    html! {
        nav class="bg-white shadow" {
            div class="max-w-5xl mx-auto flex items-center justify-between px-6 py-4" {
                a class="text-xl font-bold text-gray-900" href="/" { "reelbase" }
                div class="flex items-center gap-4 text-sm" {
                    a class=(LINK) href="/search" { "Search" }
                    @if let Some(user) = &ctx.user {
                        @if user.is_staff {
                            a class=(LINK) href="/admin/" { "Admin" }
                        }
                        span class="text-gray-600" { (user.username) }
                        a class=(LINK) href="/user/logout/" { "Log out" }
                    } @else {
                        a class=(LINK) href="/user/login/" { "Log in" }
                        a class=(LINK) href="/user/signup/" { "Sign up" }
                    }
                }
            }
        }
    }
}

fn search_box(keyword: &str) -> Markup {
    html! {
        form class="mt-6 flex gap-3" method="post" action="/search" {
            input class=(INPUT) name="keyword" value=(keyword) maxlength="400" placeholder="Exact title or name" required;
            button class=(format!("mt-2 {BUTTON}")) type="submit" { "Search" }
        }
    }
}

fn review_form(action: &str, text: &str, errors: &FieldErrors, submit: &str) -> Markup {
    html! {
        form class="mt-6 space-y-6" method="post" action=(action) {
            div {
                label class="block text-sm font-medium text-gray-700" for="review" { "Review" }
                textarea class=(INPUT) name="review" id="review" rows="8" required { (text) }
                (field_errors(errors, "review"))
            }
            button class=(BUTTON) type="submit" { (submit) }
        }
    }
}

fn movie_card(movie: &movie::Model) -> Markup {
    html! {
        a class="block bg-white shadow rounded-lg p-6 hover:shadow-md" href=(movie_url(movie)) {
            div class="flex gap-4" {
                img class="h-32 w-24 rounded object-cover" src=(media_url(&movie.poster)) alt=(movie.title);
                div {
                    h2 class="text-xl font-semibold text-gray-900" { (movie.title) }
                    p class="mt-1 text-sm text-gray-500" { (movie.release_date) }
                    (rating_summary(movie))
                }
            }
        }
    }
}

fn rating_summary(movie: &movie::Model) -> Markup {
    html! {
        p class="mt-2 text-sm text-gray-700" {
            @if movie.num_of_rating > 0 {
                span class="font-semibold" { (movie.average_rating) "/10" }
                span class="text-gray-500" { " from " (movie.num_of_rating) " rating" @if movie.num_of_rating != 1 { "s" } }
            } @else {
                span class="text-gray-500" { "Not rated yet" }
            }
        }
    }
}

fn people_list(label: &str, people: &[person::Model]) -> Markup {
    html! {
        div class="border-l-4 border-blue-500 pl-4" {
            h3 class="text-sm font-semibold text-gray-700" { (label) }
            @if people.is_empty() {
                p class="mt-2 text-sm text-gray-500" { "None listed." }
            } @else {
                ul class="mt-2 space-y-1" {
                    @for person in people {
                        li class="text-sm" { a class=(LINK) href=(person_url(person)) { (person.full_name) } }
                    }
                }
            }
        }
    }
}

fn movie_links(label: &str, movies: &[movie::Model]) -> Markup {
    html! {
        @if !movies.is_empty() {
            h2 class="mt-8 text-xl font-semibold text-gray-900" { (label) }
            ul class="mt-2 space-y-1" {
                @for movie in movies {
                    li { a class=(LINK) href=(movie_url(movie)) { (movie.title) } span class="text-gray-500" { " (" (movie.release_date) ")" } }
                }
            }
        }
    }
}

fn field_errors(errors: &FieldErrors, field: &str) -> Markup {
    html! {
        @for message in errors.get(field) {
            p class="mt-2 text-sm text-red-600" { (message) }
        }
    }
}

fn genre_option(genre: &genre::Model) -> Markup {
    html! { option value=(genre.id) { (genre.name) } }
}

fn movie_select(movies: &[movie::Model]) -> Markup {
    html! {
        select class=(INPUT) name="movie_id" required {
            @for movie in movies {
                option value=(movie.id) { (movie.title) " (" (movie.release_date) ")" }
            }
        }
    }
}

fn person_select(people: &[person::Model]) -> Markup {
    html! {
        select class=(INPUT) name="person_id" required {
            @for person in people {
                option value=(person.id) { (person.full_name) }
            }
        }
    }
}

fn movie_url(movie: &movie::Model) -> String {
    format!("/show/{}/", movie.slug)
}

fn person_url(person: &person::Model) -> String {
    format!("/person/{}/", person.slug)
}

fn genre_url(genre: &genre::Model) -> String {
    format!("/list/{}/", urlencoding::encode(&genre.name))
}

fn media_url(path: &str) -> String {
    let encoded: Vec<String> =
        path.split('/').map(|segment| urlencoding::encode(segment).into_owned()).collect();
    format!("/media/{}", encoded.join("/"))
}

fn format_timestamp(seconds: i64) -> String {
    jiff::Timestamp::from_second(seconds)
        .map(|ts| ts.strftime("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_default()
}
