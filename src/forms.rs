use std::{borrow::Cow, collections::BTreeMap};

use jiff::civil::Date;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

pub const RATING_CHOICES: std::ops::RangeInclusive<i64> = 1..=10;

/// Field name to messages, in a stable order for rendering.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.0.values().flatten().map(String::as_str)
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::default();
        for (field, kinds) in errors.field_errors() {
            for err in kinds {
                let message =
                    err.message.clone().map(|m| m.to_string()).unwrap_or_else(|| "Invalid value".to_string());
                out.add(&field, message);
            }
        }
        out
    }
}

fn validation_result(form: &impl Validate) -> FieldErrors {
    form.validate().err().map(FieldErrors::from).unwrap_or_default()
}

pub fn validate_required(value: &String) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("is_required").with_message(Cow::from("This field is required.")));
    }
    Ok(())
}

fn validate_rating(value: &String) -> Result<(), ValidationError> {
    match value.trim().parse::<i64>() {
        Ok(n) if RATING_CHOICES.contains(&n) => Ok(()),
        _ => Err(ValidationError::new("choice")
            .with_message(Cow::from("Select a rating between 1 and 10."))),
    }
}

fn validate_username(value: &String) -> Result<(), ValidationError> {
    let ok = !value.is_empty()
        && value.chars().count() <= 150
        && value.chars().all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if ok {
        return Ok(());
    }
    Err(ValidationError::new("username").with_message(Cow::from(
        "Enter a username of up to 150 letters, digits and @/./+/-/_ characters.",
    )))
}

fn validate_iso_date(value: &String) -> Result<(), ValidationError> {
    if value.trim().parse::<Date>().is_ok() {
        return Ok(());
    }
    Err(ValidationError::new("date").with_message(Cow::from("Enter a date as YYYY-MM-DD.")))
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct RatingForm {
    #[serde(default)]
    #[validate(custom(function = "validate_rating"))]
    pub rating: String,
}

impl RatingForm {
    pub fn check(&self) -> Result<i64, FieldErrors> {
        let errors = validation_result(self);
        if !errors.is_empty() {
            return Err(errors);
        }
        self.rating.trim().parse().map_err(|_| {
            let mut errors = FieldErrors::default();
            errors.add("rating", "Select a rating between 1 and 10.");
            errors
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ReviewForm {
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub review: String,
}

impl ReviewForm {
    pub fn check(&self) -> Result<String, FieldErrors> {
        let errors = validation_result(self);
        if errors.is_empty() { Ok(self.review.trim().to_string()) } else { Err(errors) }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SearchForm {
    #[serde(default)]
    #[validate(
        custom(function = "validate_required"),
        length(max = 400, message = "Ensure this value has at most 400 characters.")
    )]
    pub keyword: String,
}

impl SearchForm {
    pub fn check(&self) -> Result<String, FieldErrors> {
        let errors = validation_result(self);
        if errors.is_empty() { Ok(self.keyword.trim().to_string()) } else { Err(errors) }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct SignUpForm {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 8, message = "This password is too short. It must contain at least 8 characters."))]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

impl SignUpForm {
    /// Checks that need no database; username uniqueness is checked by the
    /// handler.
    pub fn check(&self) -> FieldErrors {
        let mut errors = validation_result(self);
        if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }
        errors
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NextQuery {
    pub next: Option<String>,
}

/// Only same-site absolute paths are followed after login. Browsers read
/// `/\host` like `//host`, so backslashes are refused outright.
pub fn safe_next(next: Option<&str>) -> &str {
    match next {
        Some(path) if path.starts_with('/') && !path.starts_with("//") && !path.contains('\\') => {
            path
        },
        _ => "/",
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct GenreForm {
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub name: String,
}

impl GenreForm {
    pub fn check(&self) -> Result<String, FieldErrors> {
        let errors = validation_result(self);
        if errors.is_empty() { Ok(self.name.trim().to_string()) } else { Err(errors) }
    }
}

#[derive(Debug, Default, Validate)]
pub struct PersonForm {
    #[validate(
        custom(function = "validate_required"),
        length(max = 250, message = "Ensure this value has at most 250 characters.")
    )]
    pub full_name: String,
    #[validate(custom(function = "validate_required"))]
    pub intro: String,
    pub date_of_birth: Option<String>,
}

impl PersonForm {
    pub fn check(&self) -> FieldErrors {
        let mut errors = validation_result(self);
        if let Some(dob) = &self.date_of_birth {
            if let Err(err) = validate_iso_date(dob) {
                errors.add("date_of_birth", err.message.unwrap_or_default());
            }
        }
        errors
    }
}

#[derive(Debug, Default, Validate)]
pub struct MovieForm {
    #[validate(custom(function = "validate_required"))]
    pub title: String,
    #[validate(custom(function = "validate_iso_date"))]
    pub release_date: String,
    #[validate(url(message = "Enter a valid URL."))]
    pub official_trailer: String,
    #[validate(custom(function = "validate_required"))]
    pub country_of_origin: String,
    pub genre_id: Option<i32>,
    #[validate(
        custom(function = "validate_required"),
        length(max = 700, message = "Ensure this value has at most 700 characters.")
    )]
    pub duration: String,
    pub awards: String,
}

impl MovieForm {
    pub fn check(&self) -> FieldErrors {
        validation_result(self)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CastForm {
    pub movie_id: i32,
    pub person_id: i32,
    #[serde(default)]
    pub character: String,
    #[serde(default)]
    pub star: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreditForm {
    pub movie_id: i32,
    pub person_id: i32,
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct CrewForm {
    pub movie_id: i32,
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub name: String,
    #[serde(default)]
    #[validate(custom(function = "validate_required"))]
    pub role: String,
}

impl CrewForm {
    pub fn check(&self) -> FieldErrors {
        validation_result(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_must_be_a_choice() {
        assert_eq!(RatingForm { rating: "8".into() }.check(), Ok(8));
        assert_eq!(RatingForm { rating: " 10 ".into() }.check(), Ok(10));
        for bad in ["0", "11", "-3", "seven", ""] {
            let errors = RatingForm { rating: bad.into() }.check().unwrap_err();
            assert_eq!(errors.get("rating"), ["Select a rating between 1 and 10."]);
        }
    }

    #[test]
    fn blank_review_is_rejected() {
        let errors = ReviewForm { review: "   ".into() }.check().unwrap_err();
        assert_eq!(errors.get("review"), ["This field is required."]);
        assert_eq!(ReviewForm { review: " Great. ".into() }.check(), Ok("Great.".to_string()));
    }

    #[test]
    fn search_keyword_is_required_and_bounded() {
        assert!(SearchForm { keyword: "".into() }.check().is_err());
        assert!(SearchForm { keyword: "x".repeat(401) }.check().is_err());
        assert_eq!(SearchForm { keyword: " Heat ".into() }.check(), Ok("Heat".to_string()));
    }

    #[test]
    fn signup_checks_username_and_passwords() {
        let form = SignUpForm {
            username: "bad name!".into(),
            password1: "short".into(),
            password2: "other".into(),
        };
        let errors = form.check();
        assert_eq!(errors.get("username").len(), 1);
        assert_eq!(errors.get("password1").len(), 1);
        assert_eq!(errors.get("password2"), ["The two password fields didn't match."]);

        let ok = SignUpForm {
            username: "film.fan+1@home".into(),
            password1: "long enough".into(),
            password2: "long enough".into(),
        };
        assert!(ok.check().is_empty());
    }

    #[test]
    fn movie_form_requires_dates_and_urls() {
        let form = MovieForm {
            title: "Heat".into(),
            release_date: "15/12/1995".into(),
            official_trailer: "not a url".into(),
            country_of_origin: "USA".into(),
            duration: "170 min".into(),
            ..Default::default()
        };
        let errors = form.check();
        assert_eq!(errors.get("release_date"), ["Enter a date as YYYY-MM-DD."]);
        assert_eq!(errors.get("official_trailer"), ["Enter a valid URL."]);
        assert!(errors.get("title").is_empty());
    }

    #[test]
    fn next_redirects_stay_on_site() {
        assert_eq!(safe_next(Some("/rate/heat/")), "/rate/heat/");
        assert_eq!(safe_next(Some("//evil.example")), "/");
        assert_eq!(safe_next(Some("/\\evil.example")), "/");
        assert_eq!(safe_next(Some("/search\\..")), "/");
        assert_eq!(safe_next(Some("https://evil.example")), "/");
        assert_eq!(safe_next(None), "/");
    }
}
