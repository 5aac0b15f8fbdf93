use sea_orm::{ActiveValue::Set, entity::prelude::*};

use crate::slugs;

pub const DEFAULT_POSTER: &str = "default poster.jpg";

/// A catalog entry. The four counters are denormalized aggregates of the
/// movie's ratings and reviews and are only ever changed with SQL-side
/// increments (see `ratings` and `reviews`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "movie")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "Text")]
    pub title: String,
    pub poster: String,
    /// ISO `YYYY-MM-DD`, so lexical order is chronological.
    pub release_date: String,
    pub official_trailer: String,
    #[sea_orm(column_type = "Text")]
    pub country_of_origin: String,
    pub genre_id: Option<i32>,
    pub duration: String,
    #[sea_orm(column_type = "Text")]
    pub awards: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub num_of_rating: i64,
    pub total_rating: i64,
    pub num_of_reviews: i64,
    pub average_rating: i64,
    pub added_by: Option<i32>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::genre::Entity",
        from = "Column::GenreId",
        to = "super::genre::Column::Id",
        on_delete = "SetNull"
    )]
    Genre,
    #[sea_orm(has_many = "super::cast::Entity")]
    Cast,
    #[sea_orm(has_many = "super::director::Entity")]
    Director,
    #[sea_orm(has_many = "super::producer::Entity")]
    Producer,
    #[sea_orm(has_many = "super::crew::Entity")]
    Crew,
    #[sea_orm(has_many = "super::rating::Entity")]
    Rating,
    #[sea_orm(has_many = "super::review::Entity")]
    Review,
}

impl Related<super::genre::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Genre.def()
    }
}

impl Related<super::review::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Review.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if super::needs_slug(&self.slug, insert) {
            let genre = match super::field(&self.genre_id).copied().flatten() {
                Some(id) => super::genre::Entity::find_by_id(id).one(db).await?.map(|g| g.name),
                None => None,
            };
            let title = super::field(&self.title).map(String::as_str).unwrap_or_default();
            let release_date =
                super::field(&self.release_date).map(String::as_str).unwrap_or_default();
            let slug = slugs::movie_slug(title, genre.as_deref(), release_date);
            self.slug = Set(slug);
        }
        Ok(self)
    }
}
