use std::sync::Arc;

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    db::DbPool,
    entities::{custom_field, field_config},
    errors::ServiceError,
    events::{Event, EventSender},
    fields::{options_to_json, system::is_system_field, EntityType, FieldKind, NewField},
};

/// Body of `POST /api/custom-fields`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFieldDefinitionRequest {
    /// Entity table: phones, customers, orders or inquiries
    pub table_name: String,
    pub field_name: String,
    pub field_label: String,
    /// text, number, date, boolean, select or textarea
    pub field_type: String,
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

/// Field Definition Store
#[derive(Clone)]
pub struct CustomFieldService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomFieldService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Definitions of one entity type in creation order
    #[instrument(skip(self))]
    pub async fn list(&self, entity_type: EntityType) -> Result<Vec<custom_field::Model>, ServiceError> {
        let definitions = custom_field::Entity::find()
            .filter(custom_field::Column::TableName.eq(entity_type))
            .order_by_asc(custom_field::Column::CreatedAt)
            .order_by_asc(custom_field::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(definitions)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<custom_field::Model, ServiceError> {
        custom_field::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Custom field {} not found", id)))
    }

    /// Declares a new custom field and registers a matching display config
    /// when the entity type has none under that name yet.
    #[instrument(skip(self, request), fields(table = %request.table_name, field_name = %request.field_name))]
    pub async fn create(
        &self,
        request: CreateFieldDefinitionRequest,
    ) -> Result<custom_field::Model, ServiceError> {
        let entity_type: EntityType = request.table_name.parse()?;
        let kind: FieldKind = request.field_type.parse()?;
        let field = NewField::parse(&request.field_name, &request.field_label, kind, request.options)?;

        if is_system_field(entity_type, &field.field_name) {
            return Err(ServiceError::Conflict(format!(
                "'{}' is a built-in field of {}",
                field.field_name, entity_type
            )));
        }

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for custom field creation");
            ServiceError::DatabaseError(e)
        })?;

        let duplicate = custom_field::Entity::find()
            .filter(custom_field::Column::TableName.eq(entity_type))
            .filter(custom_field::Column::FieldName.eq(field.field_name.as_str()))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "Custom field '{}' already exists for {}",
                field.field_name, entity_type
            )));
        }

        let definition = custom_field::ActiveModel {
            id: Set(Uuid::new_v4()),
            table_name: Set(entity_type),
            field_name: Set(field.field_name.clone()),
            field_label: Set(field.field_label.clone()),
            field_type: Set(field.kind),
            options: Set(options_to_json(field.options.clone())),
            required: Set(request.required),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert custom field definition");
            ServiceError::from_insert(e, || {
                format!(
                    "Custom field '{}' already exists for {}",
                    field.field_name, entity_type
                )
            })
        })?;

        let config_id = register_display_config(&txn, entity_type, &field, request.required).await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit custom field creation");
            ServiceError::DatabaseError(e)
        })?;

        counter!("rephone.custom_fields.created", 1);
        info!(id = %definition.id, "Custom field created");

        self.emit(Event::FieldDefinitionCreated {
            id: definition.id,
            entity_type,
            field_name: definition.field_name.clone(),
        })
        .await;
        if let Some(config_id) = config_id {
            self.emit(Event::FieldConfigCreated {
                id: config_id,
                entity_type,
                field_name: definition.field_name.clone(),
            })
            .await;
        }

        Ok(definition)
    }

    /// Removes a definition and its non-system display config. Values already
    /// stored under the key in `custom_data` are left alone.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let txn = self.db_pool.begin().await?;

        let definition = custom_field::Entity::find_by_id(id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Custom field {} not found", id)))?;

        custom_field::Entity::delete_by_id(id).exec(&txn).await?;

        let removed_configs = field_config::Entity::delete_many()
            .filter(field_config::Column::TableName.eq(definition.table_name))
            .filter(field_config::Column::FieldName.eq(definition.field_name.as_str()))
            .filter(field_config::Column::IsSystem.eq(false))
            .exec(&txn)
            .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, %id, "Failed to commit custom field deletion");
            ServiceError::DatabaseError(e)
        })?;

        counter!("rephone.custom_fields.deleted", 1);
        info!(
            %id,
            configs_removed = removed_configs.rows_affected,
            "Custom field deleted"
        );

        self.emit(Event::FieldDefinitionDeleted {
            id,
            entity_type: definition.table_name,
            field_name: definition.field_name,
        })
        .await;

        Ok(())
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event).await;
        }
    }
}

/// Inserts a custom display config for `field` at the end of the form unless
/// one with that name exists. Returns the new config id.
async fn register_display_config<C>(
    db: &C,
    entity_type: EntityType,
    field: &NewField,
    required: bool,
) -> Result<Option<Uuid>, ServiceError>
where
    C: ConnectionTrait,
{
    let existing = field_config::Entity::find()
        .filter(field_config::Column::TableName.eq(entity_type))
        .filter(field_config::Column::FieldName.eq(field.field_name.as_str()))
        .count(db)
        .await?;
    if existing > 0 {
        return Ok(None);
    }

    let display_order = next_display_order(db, entity_type).await?;
    let config = field_config::ActiveModel {
        id: Set(Uuid::new_v4()),
        table_name: Set(entity_type),
        field_name: Set(field.field_name.clone()),
        field_label: Set(field.field_label.clone()),
        field_type: Set(field.kind),
        is_system: Set(false),
        is_visible: Set(true),
        is_required: Set(required),
        display_order: Set(display_order),
        options: Set(options_to_json(field.options.clone())),
        placeholder: Set(None),
        section: Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(|e| {
        ServiceError::from_insert(e, || {
            format!(
                "Field config '{}' already exists for {}",
                field.field_name, entity_type
            )
        })
    })?;

    Ok(Some(config.id))
}

/// One past the highest display order of `entity_type`, 0 for an empty form
pub(crate) async fn next_display_order<C>(db: &C, entity_type: EntityType) -> Result<i32, ServiceError>
where
    C: ConnectionTrait,
{
    let max: Option<Option<i32>> = field_config::Entity::find()
        .select_only()
        .column_as(field_config::Column::DisplayOrder.max(), "max_order")
        .filter(field_config::Column::TableName.eq(entity_type))
        .into_tuple()
        .one(db)
        .await?;

    Ok(max.flatten().map_or(0, |m| m + 1))
}
