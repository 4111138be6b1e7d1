use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::fields::{EntityType, FieldKind};

/// Display configuration of one field, built-in (`is_system`) or custom
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "field_configs")]
#[schema(as = FieldConfig)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub table_name: EntityType,
    pub field_name: String,
    pub field_label: String,
    pub field_type: FieldKind,
    pub is_system: bool,
    pub is_visible: bool,
    pub is_required: bool,
    pub display_order: i32,
    #[sea_orm(column_type = "Json", nullable)]
    #[schema(value_type = Option<Vec<String>>)]
    pub options: Option<Json>,
    #[sea_orm(nullable)]
    pub placeholder: Option<String>,
    #[sea_orm(nullable)]
    pub section: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
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
        let now = Utc::now();

        if insert && matches!(active_model.created_at, ActiveValue::NotSet) {
            active_model.created_at = Set(now);
        }
        active_model.updated_at = Set(now);

        Ok(active_model)
    }
}
