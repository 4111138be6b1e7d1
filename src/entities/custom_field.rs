use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::fields::{EntityType, FieldKind};

/// An admin-declared attribute of an entity type, stored in `custom_data`
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "custom_fields")]
#[schema(as = FieldDefinition)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub table_name: EntityType,
    pub field_name: String,
    pub field_label: String,
    pub field_type: FieldKind,
    /// Option list, select fields only
    #[sea_orm(column_type = "Json", nullable)]
    #[schema(value_type = Option<Vec<String>>)]
    pub options: Option<Json>,
    pub required: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        if insert && matches!(active_model.created_at, ActiveValue::NotSet) {
            active_model.created_at = Set(Utc::now());
        }
        Ok(active_model)
    }
}
