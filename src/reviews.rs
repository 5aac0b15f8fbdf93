use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::{
    catalog,
    entities::{movie, review, user},
    error::{AppError, AppResult, unique_violation},
    models::ReviewEntry,
};

const ALREADY_REVIEWED: &str = "You have already reviewed this movie.";
const NOT_AUTHOR: &str = "Only the author can change this review.";

pub async fn list_for_movie(
    db: &DatabaseConnection,
    slug: &str,
) -> AppResult<(movie::Model, Vec<ReviewEntry>)> {
    let movie = catalog::movie_by_slug(db, slug).await?;
    let reviews = review::Entity::find()
        .filter(review::Column::MovieId.eq(movie.id))
        .order_by_asc(review::Column::Id)
        .find_also_related(user::Entity)
        .all(db)
        .await?
        .into_iter()
        .map(|(review, author)| ReviewEntry {
            review,
            author: author.map(|u| u.username).unwrap_or_default(),
        })
        .collect();
    Ok((movie, reviews))
}

/// A user may write one review per movie.
pub async fn ensure_can_review(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
) -> AppResult<()> {
    let existing = review::Entity::find()
        .filter(review::Column::UserId.eq(user_id))
        .filter(review::Column::MovieId.eq(movie_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::forbidden(ALREADY_REVIEWED));
    }
    Ok(())
}

pub async fn create(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
    text: &str,
) -> AppResult<review::Model> {
    let txn = db.begin().await?;

    let review = review::ActiveModel {
        movie_id: Set(movie_id),
        user_id: Set(user_id),
        review: Set(text.to_string()),
        created_at: Set(jiff::Timestamp::now().as_second()),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(insert_error)?;

    movie::Entity::update_many()
        .col_expr(movie::Column::NumOfReviews, Expr::col(movie::Column::NumOfReviews).add(1))
        .filter(movie::Column::Id.eq(movie_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(review = %review.slug, user_id = user_id, movie_id = movie_id, "review created");
    Ok(review)
}

/// Looks up a review for editing; only its author gets it back.
pub async fn owned_review(
    db: &DatabaseConnection,
    slug: &str,
    user_id: i32,
) -> AppResult<review::Model> {
    let review = review::Entity::find()
        .filter(review::Column::Slug.eq(slug))
        .one(db)
        .await?
        .ok_or(AppError::NotFound("review"))?;
    if review.user_id != user_id {
        return Err(AppError::forbidden(NOT_AUTHOR));
    }
    Ok(review)
}

pub async fn movie_of(db: &DatabaseConnection, review: &review::Model) -> AppResult<movie::Model> {
    movie::Entity::find_by_id(review.movie_id).one(db).await?.ok_or(AppError::NotFound("movie"))
}

/// Replaces the text; the slug stays as first assigned.
pub async fn update(
    db: &DatabaseConnection,
    review: review::Model,
    text: &str,
) -> AppResult<review::Model> {
    let mut active: review::ActiveModel = review.into();
    active.review = Set(text.to_string());
    let review = active.update(db).await?;
    info!(review = %review.slug, "review updated");
    Ok(review)
}

/// Deletes the row and decrements the movie's review count together. A
/// review already removed by an earlier request is `NotFound` and leaves the
/// count alone.
pub async fn delete(db: &DatabaseConnection, review: review::Model) -> AppResult<()> {
    let txn = db.begin().await?;

    let deleted = review::Entity::delete_by_id(review.id).exec(&txn).await?;
    if deleted.rows_affected != 1 {
        return Err(AppError::NotFound("review"));
    }

    movie::Entity::update_many()
        .col_expr(movie::Column::NumOfReviews, Expr::col(movie::Column::NumOfReviews).sub(1))
        .filter(movie::Column::Id.eq(review.movie_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;
    info!(review = %review.slug, "review deleted");
    Ok(())
}

fn insert_error(err: DbErr) -> AppError {
    match unique_violation(&err) {
        Some(msg) if msg.contains("slug") => {
            AppError::Conflict("A review with the same identifier already exists.".to_string())
        },
        Some(_) => AppError::forbidden(ALREADY_REVIEWED),
        None => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    async fn reviews_count(db: &DatabaseConnection, movie_id: i32) -> i64 {
        movie::Entity::find_by_id(movie_id).one(db).await.unwrap().unwrap().num_of_reviews
    }

    #[tokio::test]
    async fn create_then_delete_restores_count() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Arrival", "2016-11-11", None).await;
        let user = test_support::user(&db, "louise").await;
        let before = reviews_count(&db, movie.id).await;

        let review = create(&db, user.id, movie.id, "Heptapods!").await.unwrap();
        assert!(review.slug.starts_with("louise-arrival-"));
        assert_eq!(reviews_count(&db, movie.id).await, before + 1);

        let (_, listed) = list_for_movie(&db, &movie.slug).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].author, "louise");

        let owned = owned_review(&db, &review.slug, user.id).await.unwrap();
        delete(&db, owned).await.unwrap();
        assert_eq!(reviews_count(&db, movie.id).await, before);
        assert!(list_for_movie(&db, &movie.slug).await.unwrap().1.is_empty());
    }

    #[tokio::test]
    async fn deleting_twice_decrements_once() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Arrival", "2016-11-11", None).await;
        let user = test_support::user(&db, "louise").await;
        let before = reviews_count(&db, movie.id).await;

        let review = create(&db, user.id, movie.id, "Heptapods!").await.unwrap();
        let first = owned_review(&db, &review.slug, user.id).await.unwrap();
        let second = owned_review(&db, &review.slug, user.id).await.unwrap();

        delete(&db, first).await.unwrap();
        let again = delete(&db, second).await.unwrap_err();
        assert!(matches!(again, AppError::NotFound("review")));
        assert_eq!(reviews_count(&db, movie.id).await, before);
    }

    #[tokio::test]
    async fn one_review_per_user_and_movie() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Arrival", "2016-11-11", None).await;
        let user = test_support::user(&db, "ian").await;

        ensure_can_review(&db, user.id, movie.id).await.unwrap();
        create(&db, user.id, movie.id, "Linguistics.").await.unwrap();

        let refused = ensure_can_review(&db, user.id, movie.id).await.unwrap_err();
        assert!(matches!(refused, AppError::Forbidden(_)));
        let raced = create(&db, user.id, movie.id, "Again.").await.unwrap_err();
        assert!(matches!(raced, AppError::Forbidden(_)));
        assert_eq!(reviews_count(&db, movie.id).await, 1);
    }

    #[tokio::test]
    async fn only_the_author_may_edit_or_delete() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let author = test_support::user(&db, "neil").await;
        let other = test_support::user(&db, "vincent").await;

        let review = create(&db, author.id, movie.id, "Tense.").await.unwrap();

        let denied = owned_review(&db, &review.slug, other.id).await.unwrap_err();
        assert!(matches!(denied, AppError::Forbidden(_)));
        assert!(matches!(
            owned_review(&db, "missing", author.id).await,
            Err(AppError::NotFound("review"))
        ));

        let mine = owned_review(&db, &review.slug, author.id).await.unwrap();
        let edited = update(&db, mine, "Tense and long.").await.unwrap();
        assert_eq!(edited.review, "Tense and long.");
        assert_eq!(edited.slug, review.slug);
    }

    #[tokio::test]
    async fn listing_unknown_movie_is_not_found() {
        let db = test_support::setup_db().await;
        assert!(matches!(list_for_movie(&db, "nope").await, Err(AppError::NotFound("movie"))));
    }
}
