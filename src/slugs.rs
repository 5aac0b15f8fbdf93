//! URL identifiers for people, movies and reviews.
//!
//! Each slug is the slugified identifying fields joined with `-`
//! (`heat-none-1995-12-15`), not run together as `heatnone1995-12-15`.
//! Slugs are assigned once on insert (see the `before_save` hooks in
//! `entities`) and never recomputed, so links stay stable when a title or bio
//! is edited.

use jiff::Timestamp;
use slug::slugify;

pub fn person_slug(full_name: &str, intro: &str) -> String {
    join(&[full_name, intro])
}

pub fn movie_slug(title: &str, genre: Option<&str>, release_date: &str) -> String {
    join(&[title, genre.unwrap_or("none"), release_date])
}

pub fn review_slug(
    username: &str,
    movie_title: &str,
    created_at: i64,
) -> Result<String, jiff::Error> {
    let ts = Timestamp::from_second(created_at)?;
    Ok(join(&[username, movie_title, &ts.to_string()]))
}

fn join(parts: &[&str]) -> String {
    parts.iter().map(|p| slugify(p)).filter(|s| !s.is_empty()).collect::<Vec<_>>().join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_slug_combines_title_genre_and_date() {
        assert_eq!(
            movie_slug("Inception", Some("Sci-Fi"), "2010-07-16"),
            "inception-sci-fi-2010-07-16"
        );
    }

    #[test]
    fn movie_without_genre_uses_placeholder() {
        assert_eq!(movie_slug("Heat", None, "1995-12-15"), "heat-none-1995-12-15");
    }

    #[test]
    fn person_slug_skips_empty_parts() {
        assert_eq!(person_slug("Zoë Saldaña", ""), "zoe-saldana");
        assert_eq!(person_slug("Ken Watanabe", "Japanese actor."), "ken-watanabe-japanese-actor");
    }

    #[test]
    fn review_slug_includes_timestamp() {
        let slug = review_slug("alice", "The Matrix", 1_700_000_000).unwrap();
        assert_eq!(slug, "alice-the-matrix-2023-11-14t22-13-20z");
    }
}
