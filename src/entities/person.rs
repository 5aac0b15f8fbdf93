use sea_orm::{ActiveValue::Set, entity::prelude::*};

use crate::slugs;

pub const DEFAULT_IMAGE: &str = "default person.jpg";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "person")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub full_name: String,
    #[sea_orm(column_type = "Text")]
    pub intro: String,
    pub image: String,
    pub date_of_birth: Option<String>,
    #[sea_orm(unique)]
    pub slug: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::cast::Entity")]
    Cast,
    #[sea_orm(has_many = "super::director::Entity")]
    Director,
    #[sea_orm(has_many = "super::producer::Entity")]
    Producer,
}

impl Related<super::cast::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cast.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if super::needs_slug(&self.slug, insert) {
            let full_name = super::field(&self.full_name).map(String::as_str).unwrap_or_default();
            let intro = super::field(&self.intro).map(String::as_str).unwrap_or_default();
            let slug = slugs::person_slug(full_name, intro);
            self.slug = Set(slug);
        }
        Ok(self)
    }
}
