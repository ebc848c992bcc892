//! SeaORM entity backing the `games` table.

use sea_orm::entity::prelude::*;

use crate::dao::models::GameEntity;

pub const TABLE_NAME: &str = "games";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "games")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub publisher_id: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub name: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub platform: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub store_id: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub bundle_id: Option<String>,
    #[sea_orm(column_type = "String(StringLen::N(255))", nullable)]
    pub app_version: Option<String>,
    pub is_published: bool,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for GameEntity {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            publisher_id: model.publisher_id,
            name: model.name,
            platform: model.platform,
            store_id: model.store_id,
            bundle_id: model.bundle_id,
            app_version: model.app_version,
            is_published: model.is_published,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
