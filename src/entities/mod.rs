pub mod cast;
pub mod crew;
pub mod director;
pub mod genre;
pub mod movie;
pub mod person;
pub mod producer;
pub mod rating;
pub mod review;
pub mod session;
pub mod user;

use sea_orm::{ActiveValue, Value};

/// Value carried by an active model field, if any.
pub(crate) fn field<V: Into<Value>>(value: &ActiveValue<V>) -> Option<&V> {
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v),
        ActiveValue::NotSet => None,
    }
}

/// Slugs are assigned once, when the row is first inserted without one.
pub(crate) fn needs_slug(slug: &ActiveValue<String>, insert: bool) -> bool {
    insert && field(slug).is_none_or(|s| s.is_empty())
}
