use sea_orm::{ActiveValue::Set, entity::prelude::*};

use crate::slugs;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "review")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub movie_id: i32,
    pub user_id: i32,
    #[sea_orm(column_type = "Text")]
    pub review: String,
    pub created_at: i64,
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::movie::Entity",
        from = "Column::MovieId",
        to = "super::movie::Column::Id",
        on_delete = "Cascade"
    )]
    Movie,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::movie::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movie.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if super::needs_slug(&self.slug, insert) {
            let username = match super::field(&self.user_id) {
                Some(id) => super::user::Entity::find_by_id(*id).one(db).await?.map(|u| u.username),
                None => None,
            };
            let title = match super::field(&self.movie_id) {
                Some(id) => super::movie::Entity::find_by_id(*id).one(db).await?.map(|m| m.title),
                None => None,
            };
            let created_at = super::field(&self.created_at).copied().unwrap_or_default();
            let slug = slugs::review_slug(
                username.as_deref().unwrap_or_default(),
                title.as_deref().unwrap_or_default(),
                created_at,
            )
            .map_err(|e| DbErr::Custom(format!("review slug: {e}")))?;
            self.slug = Set(slug);
        }
        Ok(self)
    }
}
