//! Browsing queries and staff maintenance of movies, people and credits.

use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, QuerySelect,
};
use tracing::{debug, info, warn};

use crate::{
    entities::{cast, crew, director, genre, movie, person, producer},
    error::{AppError, AppResult, unique_violation},
    forms::{CastForm, CreditForm, CrewForm, MovieForm, PersonForm},
    media::{MediaKind, MediaStore, Upload},
    models::{CastMember, CatalogIndex, GenreListing, MovieDetail, PersonDetail, Role, SearchResults},
};

pub const HOME_LIMIT: u64 = 4;

/// The most recently released movies, newest first.
pub async fn home(db: &DatabaseConnection) -> AppResult<Vec<movie::Model>> {
    let movies = movie::Entity::find()
        .order_by_desc(movie::Column::ReleaseDate)
        .order_by_desc(movie::Column::Id)
        .limit(HOME_LIMIT)
        .all(db)
        .await?;
    Ok(movies)
}

pub async fn movie_by_slug(db: &DatabaseConnection, slug: &str) -> AppResult<movie::Model> {
    movie::Entity::find()
        .filter(movie::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound("movie"))
}

pub async fn person_by_slug(db: &DatabaseConnection, slug: &str) -> AppResult<person::Model> {
    person::Entity::find()
        .filter(person::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound("person"))
}

/// Genre names are not unique; the oldest genre with the name wins.
pub async fn movies_by_genre(db: &DatabaseConnection, name: &str) -> AppResult<GenreListing> {
    let genre = genre::Entity::find()
        .filter(genre::Column::Name.eq(name))
        .order_by_asc(genre::Column::Id)
        .one(db)
        .await?
        .ok_or(AppError::NotFound("genre"))?;

    let movies = movie::Entity::find()
        .filter(movie::Column::GenreId.eq(genre.id))
        .order_by_asc(movie::Column::Id)
        .all(db)
        .await?;

    Ok(GenreListing { genre, movies })
}

pub async fn movie_detail(db: &DatabaseConnection, slug: &str) -> AppResult<MovieDetail> {
    let movie = movie_by_slug(db, slug).await?;
    let genre = movie.find_related(genre::Entity).one(db).await?;

    let directors = director::Entity::find()
        .filter(director::Column::MovieId.eq(movie.id))
        .order_by_asc(director::Column::Id)
        .find_also_related(person::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, p)| p)
        .collect();

    let producers = producer::Entity::find()
        .filter(producer::Column::MovieId.eq(movie.id))
        .order_by_asc(producer::Column::Id)
        .find_also_related(person::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, p)| p)
        .collect();

    let cast = cast::Entity::find()
        .filter(cast::Column::MovieId.eq(movie.id))
        .order_by_desc(cast::Column::Star)
        .order_by_asc(cast::Column::Id)
        .find_also_related(person::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(c, p)| {
            p.map(|person| CastMember { person, character: c.character, star: c.star })
        })
        .collect();

    let crew = crew::Entity::find()
        .filter(crew::Column::MovieId.eq(movie.id))
        .order_by_asc(crew::Column::Id)
        .all(db)
        .await?;

    Ok(MovieDetail { movie, genre, directors, producers, cast, crew })
}

pub async fn person_detail(db: &DatabaseConnection, slug: &str) -> AppResult<PersonDetail> {
    let person = person_by_slug(db, slug).await?;

    let mut acted: Vec<Role> = cast::Entity::find()
        .filter(cast::Column::PersonId.eq(person.id))
        .find_also_related(movie::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(c, m)| m.map(|movie| Role { movie, character: c.character }))
        .collect();
    acted.sort_by(|a, b| b.movie.release_date.cmp(&a.movie.release_date));

    let mut directed: Vec<movie::Model> = director::Entity::find()
        .filter(director::Column::PersonId.eq(person.id))
        .find_also_related(movie::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, m)| m)
        .collect();
    directed.sort_by(|a, b| b.release_date.cmp(&a.release_date));

    let mut produced: Vec<movie::Model> = producer::Entity::find()
        .filter(producer::Column::PersonId.eq(person.id))
        .find_also_related(movie::Entity)
        .all(db)
        .await?
        .into_iter()
        .filter_map(|(_, m)| m)
        .collect();
    produced.sort_by(|a, b| b.release_date.cmp(&a.release_date));

    Ok(PersonDetail { person, acted, directed, produced })
}

/// Exact, case-sensitive match on movie title and person name.
pub async fn search(db: &DatabaseConnection, keyword: &str) -> AppResult<SearchResults> {
    let movies = movie::Entity::find()
        .filter(movie::Column::Title.eq(keyword))
        .order_by_desc(movie::Column::ReleaseDate)
        .all(db)
        .await?;
    let people = person::Entity::find()
        .filter(person::Column::FullName.eq(keyword))
        .order_by_asc(person::Column::Id)
        .all(db)
        .await?;
    debug!(keyword = %keyword, movies = movies.len(), people = people.len(), "search");
    Ok(SearchResults { movies, people })
}

pub async fn index(db: &DatabaseConnection) -> AppResult<CatalogIndex> {
    Ok(CatalogIndex {
        genres: genre::Entity::find().order_by_asc(genre::Column::Name).all(db).await?,
        people: person::Entity::find().order_by_asc(person::Column::FullName).all(db).await?,
        movies: movie::Entity::find().order_by_asc(movie::Column::Title).all(db).await?,
    })
}

pub async fn create_genre(
    db: &DatabaseConnection,
    name: &str,
    added_by: Option<i32>,
) -> AppResult<genre::Model> {
    let genre = genre::ActiveModel {
        name: Set(name.to_string()),
        added_by: Set(added_by),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!(genre = %genre.name, "genre created");
    Ok(genre)
}

/// Writes an upload and fits it into the size bounds before any row points
/// at it. A file that fails is removed again.
async fn store_image(media: &MediaStore, kind: MediaKind, upload: &Upload) -> AppResult<String> {
    let path = media.store(kind, &upload.file_name, &upload.bytes).await?;
    if let Err(err) = media.normalize(&path).await {
        media.discard(&path).await;
        return Err(err);
    }
    Ok(path)
}

pub async fn create_person(
    db: &DatabaseConnection,
    media: &MediaStore,
    form: &PersonForm,
    photo: Option<Upload>,
) -> AppResult<person::Model> {
    let image = match &photo {
        Some(upload) => store_image(media, MediaKind::PersonPhoto, upload).await?,
        None => person::DEFAULT_IMAGE.to_string(),
    };

    let inserted = person::ActiveModel {
        full_name: Set(form.full_name.trim().to_string()),
        intro: Set(form.intro.trim().to_string()),
        image: Set(image.clone()),
        date_of_birth: Set(form.date_of_birth.as_ref().map(|d| d.trim().to_string())),
        ..Default::default()
    }
    .insert(db)
    .await;

    let person = match inserted {
        Ok(person) => person,
        Err(err) => {
            if photo.is_some() {
                media.discard(&image).await;
            }
            return Err(match unique_violation(&err) {
                Some(_) => AppError::Conflict(format!(
                    "A person with the same name and intro already exists ({}).",
                    form.full_name.trim()
                )),
                None => err.into(),
            });
        },
    };

    info!(person = %person.slug, "person created");
    Ok(person)
}

pub async fn create_movie(
    db: &DatabaseConnection,
    media: &MediaStore,
    form: &MovieForm,
    poster: Option<Upload>,
    added_by: Option<i32>,
) -> AppResult<movie::Model> {
    if let Some(genre_id) = form.genre_id {
        genre::Entity::find_by_id(genre_id).one(db).await?.ok_or(AppError::NotFound("genre"))?;
    }

    let poster_path = match &poster {
        Some(upload) => store_image(media, MediaKind::Poster, upload).await?,
        None => movie::DEFAULT_POSTER.to_string(),
    };

    let inserted = movie::ActiveModel {
        title: Set(form.title.trim().to_string()),
        poster: Set(poster_path.clone()),
        release_date: Set(form.release_date.trim().to_string()),
        official_trailer: Set(form.official_trailer.trim().to_string()),
        country_of_origin: Set(form.country_of_origin.trim().to_string()),
        genre_id: Set(form.genre_id),
        duration: Set(form.duration.trim().to_string()),
        awards: Set(form.awards.trim().to_string()),
        num_of_rating: Set(0),
        total_rating: Set(0),
        num_of_reviews: Set(0),
        average_rating: Set(0),
        added_by: Set(added_by),
        ..Default::default()
    }
    .insert(db)
    .await;

    let movie = match inserted {
        Ok(movie) => movie,
        Err(err) => {
            if poster.is_some() {
                media.discard(&poster_path).await;
            }
            return Err(match unique_violation(&err) {
                Some(_) => AppError::Conflict(format!(
                    "A movie with the same title, genre and release date already exists ({}).",
                    form.title.trim()
                )),
                None => err.into(),
            });
        },
    };

    info!(movie = %movie.slug, "movie created");
    Ok(movie)
}

async fn ensure_credit_targets(db: &DatabaseConnection, movie_id: i32, person_id: i32) -> AppResult<()> {
    movie::Entity::find_by_id(movie_id).one(db).await?.ok_or(AppError::NotFound("movie"))?;
    person::Entity::find_by_id(person_id).one(db).await?.ok_or(AppError::NotFound("person"))?;
    Ok(())
}

pub async fn add_cast(
    db: &DatabaseConnection,
    form: &CastForm,
    added_by: Option<i32>,
) -> AppResult<cast::Model> {
    ensure_credit_targets(db, form.movie_id, form.person_id).await?;
    let character = Some(form.character.trim().to_string()).filter(|c| !c.is_empty());
    let star = form.star.as_deref().is_some_and(|v| matches!(v, "on" | "true" | "1"));
    let row = cast::ActiveModel {
        movie_id: Set(form.movie_id),
        person_id: Set(form.person_id),
        character: Set(character),
        star: Set(star),
        added_by: Set(added_by),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(movie_id = row.movie_id, person_id = row.person_id, star = row.star, "cast added");
    Ok(row)
}

pub async fn add_director(
    db: &DatabaseConnection,
    form: &CreditForm,
    added_by: Option<i32>,
) -> AppResult<director::Model> {
    ensure_credit_targets(db, form.movie_id, form.person_id).await?;
    let row = director::ActiveModel {
        movie_id: Set(form.movie_id),
        person_id: Set(form.person_id),
        added_by: Set(added_by),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(movie_id = row.movie_id, person_id = row.person_id, "director added");
    Ok(row)
}

pub async fn add_producer(
    db: &DatabaseConnection,
    form: &CreditForm,
    added_by: Option<i32>,
) -> AppResult<producer::Model> {
    ensure_credit_targets(db, form.movie_id, form.person_id).await?;
    let row = producer::ActiveModel {
        movie_id: Set(form.movie_id),
        person_id: Set(form.person_id),
        added_by: Set(added_by),
        ..Default::default()
    }
    .insert(db)
    .await?;
    debug!(movie_id = row.movie_id, person_id = row.person_id, "producer added");
    Ok(row)
}

pub async fn add_crew(db: &DatabaseConnection, form: &CrewForm) -> AppResult<crew::Model> {
    movie::Entity::find_by_id(form.movie_id).one(db).await?.ok_or(AppError::NotFound("movie"))?;
    let row = crew::ActiveModel {
        movie_id: Set(form.movie_id),
        name: Set(form.name.trim().to_string()),
        role: Set(form.role.trim().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    if row.role.is_empty() {
        warn!(crew_id = row.id, "crew member stored without a role");
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn home_lists_four_newest_releases() {
        let db = test_support::setup_db().await;
        for (title, date) in [
            ("Alien", "1979-05-25"),
            ("Heat", "1995-12-15"),
            ("Inception", "2010-07-16"),
            ("Arrival", "2016-11-11"),
            ("Dune", "2021-10-22"),
            ("Tenet", "2020-08-26"),
        ] {
            test_support::movie(&db, title, date, None).await;
        }

        let titles: Vec<String> = home(&db).await.unwrap().into_iter().map(|m| m.title).collect();
        assert_eq!(titles, ["Dune", "Tenet", "Arrival", "Inception"]);
    }

    #[tokio::test]
    async fn genre_listing_requires_known_genre() {
        let db = test_support::setup_db().await;
        let drama = test_support::genre(&db, "Drama").await;
        let comedy = test_support::genre(&db, "Comedy").await;
        test_support::movie(&db, "Heat", "1995-12-15", Some(drama.id)).await;
        test_support::movie(&db, "Airplane!", "1980-07-02", Some(comedy.id)).await;

        let listing = movies_by_genre(&db, "Drama").await.unwrap();
        assert_eq!(listing.genre.id, drama.id);
        assert_eq!(listing.movies.len(), 1);
        assert_eq!(listing.movies[0].title, "Heat");

        assert!(matches!(movies_by_genre(&db, "drama").await, Err(AppError::NotFound("genre"))));
    }

    #[tokio::test]
    async fn movie_detail_collects_credits() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let mann = test_support::person(&db, "Michael Mann", "Director.").await;
        let pacino = test_support::person(&db, "Al Pacino", "Actor.").await;
        let kilmer = test_support::person(&db, "Val Kilmer", "Actor.").await;

        add_director(&db, &CreditForm { movie_id: movie.id, person_id: mann.id }, None).await.unwrap();
        add_producer(&db, &CreditForm { movie_id: movie.id, person_id: mann.id }, None).await.unwrap();
        add_cast(
            &db,
            &CastForm {
                movie_id: movie.id,
                person_id: kilmer.id,
                character: "Chris Shiherlis".into(),
                star: None,
            },
            None,
        )
        .await
        .unwrap();
        add_cast(
            &db,
            &CastForm {
                movie_id: movie.id,
                person_id: pacino.id,
                character: "Vincent Hanna".into(),
                star: Some("on".into()),
            },
            None,
        )
        .await
        .unwrap();
        add_crew(
            &db,
            &CrewForm { movie_id: movie.id, name: "Dante Spinotti".into(), role: "Cinematography".into() },
        )
        .await
        .unwrap();

        let detail = movie_detail(&db, &movie.slug).await.unwrap();
        assert_eq!(detail.directors[0].full_name, "Michael Mann");
        assert_eq!(detail.producers[0].full_name, "Michael Mann");
        assert_eq!(detail.cast.len(), 2);
        assert_eq!(detail.cast[0].person.full_name, "Al Pacino");
        assert!(detail.cast[0].star);
        assert_eq!(detail.crew[0].role, "Cinematography");

        let person = person_detail(&db, &mann.slug).await.unwrap();
        assert_eq!(person.directed.len(), 1);
        assert_eq!(person.produced.len(), 1);
        assert!(person.acted.is_empty());

        assert!(matches!(movie_detail(&db, "nope").await, Err(AppError::NotFound("movie"))));
        assert!(matches!(person_detail(&db, "nope").await, Err(AppError::NotFound("person"))));
    }

    #[tokio::test]
    async fn search_is_exact_match_only() {
        let db = test_support::setup_db().await;
        test_support::movie(&db, "Inception", "2010-07-16", None).await;
        test_support::person(&db, "Christopher Nolan", "Director.").await;

        let hit = search(&db, "Inception").await.unwrap();
        assert_eq!(hit.movies.len(), 1);
        assert!(hit.people.is_empty());

        let person = search(&db, "Christopher Nolan").await.unwrap();
        assert_eq!(person.people.len(), 1);

        assert!(search(&db, "Incep").await.unwrap().is_empty());
        assert!(search(&db, "inception").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn slugs_are_derived_once() {
        let db = test_support::setup_db().await;
        let scifi = test_support::genre(&db, "Sci-Fi").await;
        let movie = test_support::movie(&db, "Inception", "2010-07-16", Some(scifi.id)).await;
        assert_eq!(movie.slug, "inception-sci-fi-2010-07-16");

        let mut active: movie::ActiveModel = movie.into();
        active.title = Set("Inception (IMAX)".to_string());
        let updated = active.update(&db).await.unwrap();
        assert_eq!(updated.slug, "inception-sci-fi-2010-07-16");
    }

    #[tokio::test]
    async fn slug_collision_is_a_conflict() {
        let db = test_support::setup_db().await;
        let media = test_support::media_store();
        let form = MovieForm {
            title: "Heat".into(),
            release_date: "1995-12-15".into(),
            official_trailer: "https://example.com/heat".into(),
            country_of_origin: "USA".into(),
            duration: "170 min".into(),
            ..Default::default()
        };

        let first = create_movie(&db, &media, &form, None, None).await.unwrap();
        assert_eq!(first.poster, movie::DEFAULT_POSTER);
        assert_eq!(first.num_of_rating, 0);

        let err = create_movie(&db, &media, &form, None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let person = PersonForm {
            full_name: "Al Pacino".into(),
            intro: "Actor.".into(),
            date_of_birth: Some("1940-04-25".into()),
        };
        create_person(&db, &media, &person, None).await.unwrap();
        let err = create_person(&db, &media, &person, None).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn undecodable_upload_leaves_nothing_behind() {
        let db = test_support::setup_db().await;
        let media = test_support::media_store();
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.extend([0u8; 64]);

        let person = PersonForm {
            full_name: "Al Pacino".into(),
            intro: "Actor.".into(),
            date_of_birth: None,
        };
        let photo = Upload { file_name: "a.png".into(), bytes: bytes.clone() };
        let err = create_person(&db, &media, &person, Some(photo)).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(person::Entity::find().all(&db).await.unwrap().is_empty());

        let form = MovieForm {
            title: "Heat".into(),
            release_date: "1995-12-15".into(),
            official_trailer: "https://example.com/heat".into(),
            country_of_origin: "USA".into(),
            duration: "170 min".into(),
            ..Default::default()
        };
        let poster = Upload { file_name: "heat.png".into(), bytes };
        let err = create_movie(&db, &media, &form, Some(poster), None).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(movie::Entity::find().all(&db).await.unwrap().is_empty());

        for dir in ["peoples", "posters"] {
            let left = std::fs::read_dir(media.root().join(dir)).map(|d| d.count()).unwrap_or(0);
            assert_eq!(left, 0, "{dir} should be empty");
        }
        std::fs::remove_dir_all(media.root()).ok();
    }
}
