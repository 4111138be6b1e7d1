use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::instrument;
use uuid::Uuid;

use super::field_config::list_sorted;
use crate::{
    db::DbPool,
    entities::{custom_field, customer, inquiry, order, phone},
    errors::ServiceError,
    fields::{merge_specs, render_form, EntityType, FieldSpec, FormLayout},
};

/// Builds entity forms from the active field configuration
#[derive(Clone)]
pub struct FormService {
    db_pool: Arc<DbPool>,
}

impl FormService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Every field of `entity_type` in render order. Definitions without a
    /// display config go last, in creation order.
    #[instrument(skip(self))]
    pub async fn specs(&self, entity_type: EntityType) -> Result<Vec<FieldSpec>, ServiceError> {
        let db = &*self.db_pool;
        let configs = list_sorted(db, entity_type).await?;
        let definitions = custom_field::Entity::find()
            .filter(custom_field::Column::TableName.eq(entity_type))
            .order_by_asc(custom_field::Column::CreatedAt)
            .order_by_asc(custom_field::Column::Id)
            .all(db)
            .await?;

        Ok(merge_specs(&definitions, &configs))
    }

    /// Blank create form
    #[instrument(skip(self))]
    pub async fn blank(&self, entity_type: EntityType) -> Result<FormLayout, ServiceError> {
        let specs = self.specs(entity_type).await?;
        Ok(render_form(entity_type, None, &specs, &Map::new(), &Map::new()))
    }

    /// Edit form pre-filled from a stored record
    #[instrument(skip(self))]
    pub async fn for_record(&self, entity_type: EntityType, id: Uuid) -> Result<FormLayout, ServiceError> {
        let mut fixed = self.load_record(entity_type, id).await?;
        let custom_data = match fixed.remove("custom_data") {
            Some(Value::Object(bag)) => bag,
            _ => Map::new(),
        };

        let specs = self.specs(entity_type).await?;
        Ok(render_form(entity_type, Some(id), &specs, &fixed, &custom_data))
    }

    async fn load_record(&self, entity_type: EntityType, id: Uuid) -> Result<Map<String, Value>, ServiceError> {
        let db = &*self.db_pool;
        let record = match entity_type {
            EntityType::Inventory => to_object(phone::Entity::find_by_id(id).one(db).await?)?,
            EntityType::Customer => to_object(customer::Entity::find_by_id(id).one(db).await?)?,
            EntityType::Order => to_object(order::Entity::find_by_id(id).one(db).await?)?,
            EntityType::Inquiry => to_object(inquiry::Entity::find_by_id(id).one(db).await?)?,
        };

        record.ok_or_else(|| ServiceError::NotFound(format!("{} record {} not found", entity_type, id)))
    }
}

fn to_object<T: Serialize>(model: Option<T>) -> Result<Option<Map<String, Value>>, ServiceError> {
    let Some(model) = model else {
        return Ok(None);
    };
    match serde_json::to_value(model)? {
        Value::Object(map) => Ok(Some(map)),
        other => Err(ServiceError::SerializationError(format!(
            "expected a JSON object for record, got {}",
            other
        ))),
    }
}
