use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::{
    entities::{movie, rating},
    error::{AppError, AppResult, unique_violation},
};

const ALREADY_RATED: &str = "You have already rated this movie.";

/// A user may rate a movie once.
pub async fn ensure_can_rate(db: &DatabaseConnection, user_id: i32, movie_id: i32) -> AppResult<()> {
    let existing = rating::Entity::find()
        .filter(rating::Column::UserId.eq(user_id))
        .filter(rating::Column::MovieId.eq(movie_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(AppError::forbidden(ALREADY_RATED));
    }
    Ok(())
}

/// Records the rating and folds it into the movie's running totals in one
/// transaction. The counters are incremented in SQL so concurrent raters
/// never overwrite each other, and the (user, movie) unique index turns a
/// racing second submission into `Forbidden`.
pub async fn submit(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
    value: i64,
) -> AppResult<movie::Model> {
    let txn = db.begin().await?;

    rating::ActiveModel {
        user_id: Set(user_id),
        movie_id: Set(movie_id),
        rating: Set(value),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(duplicate_as_forbidden)?;

    movie::Entity::update_many()
        .col_expr(movie::Column::TotalRating, Expr::col(movie::Column::TotalRating).add(value))
        .col_expr(movie::Column::NumOfRating, Expr::col(movie::Column::NumOfRating).add(1))
        .col_expr(
            movie::Column::AverageRating,
            Expr::cust(format!("(total_rating + {value}) / (num_of_rating + 1)")),
        )
        .filter(movie::Column::Id.eq(movie_id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    let movie =
        movie::Entity::find_by_id(movie_id).one(db).await?.ok_or(AppError::NotFound("movie"))?;
    info!(
        movie = %movie.slug,
        user_id = user_id,
        rating = value,
        num_of_rating = movie.num_of_rating,
        average_rating = movie.average_rating,
        "rating recorded"
    );
    Ok(movie)
}

fn duplicate_as_forbidden(err: DbErr) -> AppError {
    match unique_violation(&err) {
        Some(_) => AppError::forbidden(ALREADY_RATED),
        None => err.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;

    #[tokio::test]
    async fn running_average_uses_integer_division() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Inception", "2010-07-16", None).await;
        let a = test_support::user(&db, "a").await;
        let b = test_support::user(&db, "b").await;

        let after_a = submit(&db, a.id, movie.id, 8).await.unwrap();
        assert_eq!(
            (after_a.num_of_rating, after_a.total_rating, after_a.average_rating),
            (1, 8, 8)
        );

        let after_b = submit(&db, b.id, movie.id, 6).await.unwrap();
        assert_eq!(
            (after_b.num_of_rating, after_b.total_rating, after_b.average_rating),
            (2, 14, 7)
        );
    }

    #[tokio::test]
    async fn average_matches_sum_over_count() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Heat", "1995-12-15", None).await;
        let values = [10, 3, 7, 9, 1];

        let mut last = None;
        for (i, v) in values.iter().enumerate() {
            let user = test_support::user(&db, &format!("rater{i}")).await;
            last = Some(submit(&db, user.id, movie.id, *v).await.unwrap());
        }

        let movie = last.unwrap();
        let sum: i64 = values.iter().sum();
        assert_eq!(movie.num_of_rating, values.len() as i64);
        assert_eq!(movie.total_rating, sum);
        assert_eq!(movie.average_rating, sum / values.len() as i64);
    }

    #[tokio::test]
    async fn second_rating_is_refused_and_leaves_counters_alone() {
        let db = test_support::setup_db().await;
        let movie = test_support::movie(&db, "Alien", "1979-05-25", None).await;
        let user = test_support::user(&db, "ripley").await;

        ensure_can_rate(&db, user.id, movie.id).await.unwrap();
        submit(&db, user.id, movie.id, 9).await.unwrap();

        let refused = ensure_can_rate(&db, user.id, movie.id).await.unwrap_err();
        assert!(matches!(refused, AppError::Forbidden(_)));

        let raced = submit(&db, user.id, movie.id, 1).await.unwrap_err();
        assert!(matches!(raced, AppError::Forbidden(_)));

        let rows = rating::Entity::find()
            .filter(rating::Column::UserId.eq(user.id))
            .filter(rating::Column::MovieId.eq(movie.id))
            .all(&db)
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);

        let movie = movie::Entity::find_by_id(movie.id).one(&db).await.unwrap().unwrap();
        assert_eq!((movie.num_of_rating, movie.total_rating, movie.average_rating), (1, 9, 9));
    }
}
