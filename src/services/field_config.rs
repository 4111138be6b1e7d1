use std::sync::Arc;

use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use tracing::{debug, error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use super::custom_fields::next_display_order;
use crate::{
    db::DbPool,
    entities::field_config,
    errors::ServiceError,
    events::{Event, EventSender},
    fields::{
        clean_options, options_to_json,
        system::{is_system_field, system_fields},
        EntityType, FieldKind, NewField,
    },
};

/// Body of `POST /api/field-config`
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateFieldConfigRequest {
    pub table_name: String,
    pub field_name: String,
    pub field_label: String,
    pub field_type: String,
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub is_required: bool,
    pub is_visible: Option<bool>,
    pub placeholder: Option<String>,
    pub section: Option<String>,
}

/// Partial update of a field config; absent members are left unchanged
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct UpdateFieldConfigRequest {
    pub field_label: Option<String>,
    pub is_visible: Option<bool>,
    pub is_required: Option<bool>,
    pub display_order: Option<i32>,
    /// Empty string clears
    pub placeholder: Option<String>,
    /// Empty string clears
    pub section: Option<String>,
    /// Select entries only
    pub options: Option<Vec<String>>,
}

/// One element of the `PUT /api/field-config` batch
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct FieldConfigPatch {
    pub id: Uuid,
    #[serde(flatten)]
    pub changes: UpdateFieldConfigRequest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

/// Field Config Store
#[derive(Clone)]
pub struct FieldConfigService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl FieldConfigService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// All configs of an entity type in render order
    #[instrument(skip(self))]
    pub async fn list(&self, entity_type: EntityType) -> Result<Vec<field_config::Model>, ServiceError> {
        list_sorted(&*self.db_pool, entity_type).await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<field_config::Model, ServiceError> {
        find_config(&*self.db_pool, id).await
    }

    /// Adds a custom field config at the end of the form
    #[instrument(skip(self, request), fields(table = %request.table_name, field_name = %request.field_name))]
    pub async fn create(
        &self,
        request: CreateFieldConfigRequest,
    ) -> Result<field_config::Model, ServiceError> {
        let entity_type: EntityType = request.table_name.parse()?;
        let kind: FieldKind = request.field_type.parse()?;
        let field = NewField::parse(&request.field_name, &request.field_label, kind, request.options)?;

        if is_system_field(entity_type, &field.field_name) {
            return Err(ServiceError::Conflict(format!(
                "'{}' is a built-in field of {}",
                field.field_name, entity_type
            )));
        }

        let txn = self.db_pool.begin().await?;

        let duplicate = field_config::Entity::find()
            .filter(field_config::Column::TableName.eq(entity_type))
            .filter(field_config::Column::FieldName.eq(field.field_name.as_str()))
            .count(&txn)
            .await?;
        if duplicate > 0 {
            return Err(ServiceError::Conflict(format!(
                "Field config '{}' already exists for {}",
                field.field_name, entity_type
            )));
        }

        let display_order = next_display_order(&txn, entity_type).await?;
        let conflict = format!(
            "Field config '{}' already exists for {}",
            field.field_name, entity_type
        );
        let config = field_config::ActiveModel {
            id: Set(Uuid::new_v4()),
            table_name: Set(entity_type),
            field_name: Set(field.field_name),
            field_label: Set(field.field_label),
            field_type: Set(field.kind),
            is_system: Set(false),
            is_visible: Set(request.is_visible.unwrap_or(true)),
            is_required: Set(request.is_required),
            display_order: Set(display_order),
            options: Set(options_to_json(field.options)),
            placeholder: Set(super::clean_text(request.placeholder)),
            section: Set(super::clean_text(request.section)),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert field config");
            ServiceError::from_insert(e, || conflict)
        })?;

        txn.commit().await?;

        counter!("rephone.field_configs.created", 1);
        info!(id = %config.id, display_order, "Field config created");
        self.emit(Event::FieldConfigCreated {
            id: config.id,
            entity_type,
            field_name: config.field_name.clone(),
        })
        .await;

        Ok(config)
    }

    /// Applies a partial update to one config
    #[instrument(skip(self, changes))]
    pub async fn update(
        &self,
        id: Uuid,
        changes: UpdateFieldConfigRequest,
    ) -> Result<field_config::Model, ServiceError> {
        let updated = apply_changes(&*self.db_pool, id, changes).await?;

        counter!("rephone.field_configs.updated", 1);
        self.emit(Event::FieldConfigUpdated {
            id,
            entity_type: updated.table_name,
        })
        .await;

        Ok(updated)
    }

    /// Settings-screen save: every patch is applied in one transaction, or none is.
    #[instrument(skip(self, patches), fields(count = patches.len()))]
    pub async fn bulk_save(
        &self,
        patches: Vec<FieldConfigPatch>,
    ) -> Result<Vec<field_config::Model>, ServiceError> {
        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for field config batch");
            ServiceError::DatabaseError(e)
        })?;

        let mut updated = Vec::with_capacity(patches.len());
        for patch in patches {
            updated.push(apply_changes(&txn, patch.id, patch.changes).await?);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit field config batch");
            ServiceError::DatabaseError(e)
        })?;

        counter!("rephone.field_configs.updated", updated.len() as u64);
        info!(count = updated.len(), "Field config batch saved");
        for config in &updated {
            self.emit(Event::FieldConfigUpdated {
                id: config.id,
                entity_type: config.table_name,
            })
            .await;
        }

        Ok(updated)
    }

    /// Removes a custom config. Built-in fields can only be hidden.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let config = find_config(&*self.db_pool, id).await?;
        if config.is_system {
            warn!(%id, field_name = %config.field_name, "Refusing to delete built-in field");
            return Err(ServiceError::Forbidden(format!(
                "'{}' is a built-in field and cannot be deleted; hide it instead",
                config.field_name
            )));
        }

        field_config::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;

        counter!("rephone.field_configs.deleted", 1);
        info!(%id, "Field config deleted");
        self.emit(Event::FieldConfigDeleted {
            id,
            entity_type: config.table_name,
            field_name: config.field_name,
        })
        .await;

        Ok(())
    }

    /// Swaps a config with its neighbour in render order and returns the
    /// resulting list. Moving past either end changes nothing.
    #[instrument(skip(self))]
    pub async fn move_field(
        &self,
        id: Uuid,
        direction: MoveDirection,
    ) -> Result<Vec<field_config::Model>, ServiceError> {
        let txn = self.db_pool.begin().await?;

        let target = find_config(&txn, id).await?;
        let configs = list_sorted(&txn, target.table_name).await?;
        let position = configs
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ServiceError::InternalError(format!("field config {} vanished", id)))?;

        let Some((target_order, neighbour_order)) = reorder(&configs, position, direction) else {
            debug!(%id, %direction, "Field already at the edge; nothing to move");
            txn.commit().await?;
            return Ok(configs);
        };
        let neighbour = match direction {
            MoveDirection::Up => &configs[position - 1],
            MoveDirection::Down => &configs[position + 1],
        };

        set_display_order(&txn, &configs[position], target_order).await?;
        set_display_order(&txn, neighbour, neighbour_order).await?;

        let reordered = list_sorted(&txn, target.table_name).await?;
        txn.commit().await?;

        counter!("rephone.field_configs.reordered", 1);
        info!(%id, %direction, "Field moved");
        self.emit(Event::FieldConfigReordered {
            entity_type: target.table_name,
        })
        .await;

        Ok(reordered)
    }

    /// Inserts the built-in fields of every entity type that are not configured
    /// yet. Safe to run on every start. Returns the number of rows added.
    #[instrument(skip(self))]
    pub async fn seed_system_fields(&self) -> Result<usize, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let mut inserted = 0usize;

        for entity_type in EntityType::ALL {
            let existing = list_sorted(&txn, entity_type).await?;
            let mut next_order = existing
                .iter()
                .map(|c| c.display_order)
                .max()
                .map_or(0, |m| m + 1);

            for seed in system_fields(entity_type) {
                if existing.iter().any(|c| c.field_name == seed.field_name) {
                    continue;
                }

                let options = (!seed.options.is_empty())
                    .then(|| seed.options.iter().map(|o| o.to_string()).collect());

                field_config::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    table_name: Set(entity_type),
                    field_name: Set(seed.field_name.to_string()),
                    field_label: Set(seed.label.to_string()),
                    field_type: Set(seed.kind),
                    is_system: Set(true),
                    is_visible: Set(true),
                    is_required: Set(seed.required),
                    display_order: Set(next_order),
                    options: Set(options_to_json(options)),
                    placeholder: Set(seed.placeholder.map(str::to_string)),
                    section: Set(Some(seed.section.to_string())),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;

                next_order += 1;
                inserted += 1;
            }
        }

        txn.commit().await?;

        if inserted > 0 {
            info!(inserted, "Seeded built-in field configs");
        } else {
            debug!("Built-in field configs already present");
        }
        Ok(inserted)
    }

    async fn emit(&self, event: Event) {
        if let Some(sender) = &self.event_sender {
            sender.send_or_log(event).await;
        }
    }
}

/// Render order: `display_order`, then arrival order
pub(crate) async fn list_sorted<C>(
    db: &C,
    entity_type: EntityType,
) -> Result<Vec<field_config::Model>, ServiceError>
where
    C: ConnectionTrait,
{
    let configs = field_config::Entity::find()
        .filter(field_config::Column::TableName.eq(entity_type))
        .order_by_asc(field_config::Column::DisplayOrder)
        .order_by_asc(field_config::Column::CreatedAt)
        .order_by_asc(field_config::Column::Id)
        .all(db)
        .await?;
    Ok(configs)
}

async fn find_config<C>(db: &C, id: Uuid) -> Result<field_config::Model, ServiceError>
where
    C: ConnectionTrait,
{
    field_config::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Field config {} not found", id)))
}

async fn set_display_order<C>(
    db: &C,
    config: &field_config::Model,
    display_order: i32,
) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    if config.display_order == display_order {
        return Ok(());
    }
    let mut active: field_config::ActiveModel = config.clone().into();
    active.display_order = Set(display_order);
    active.update(db).await?;
    Ok(())
}

/// New `(target, neighbour)` display orders for moving `configs[position]`, or
/// `None` at the edge. Tied orders are split so the swap stays visible.
fn reorder(
    configs: &[field_config::Model],
    position: usize,
    direction: MoveDirection,
) -> Option<(i32, i32)> {
    let neighbour = match direction {
        MoveDirection::Up => position.checked_sub(1)?,
        MoveDirection::Down => position + 1,
    };
    let target_order = configs.get(position)?.display_order;
    let neighbour_order = configs.get(neighbour)?.display_order;

    if target_order != neighbour_order {
        return Some((neighbour_order, target_order));
    }

    let v = target_order;
    match direction {
        MoveDirection::Up => Some((v, v.saturating_add(1))),
        MoveDirection::Down => Some((v.saturating_add(1), v)),
    }
}

async fn apply_changes<C>(
    db: &C,
    id: Uuid,
    changes: UpdateFieldConfigRequest,
) -> Result<field_config::Model, ServiceError>
where
    C: ConnectionTrait,
{
    let config = find_config(db, id).await?;
    let is_select = config.field_type == FieldKind::Select;
    let is_system = config.is_system;
    let mut active: field_config::ActiveModel = config.into();

    if let Some(label) = changes.field_label {
        let label = label.trim();
        if label.is_empty() {
            return Err(ServiceError::ValidationError(
                "field label is required".to_string(),
            ));
        }
        active.field_label = Set(label.to_string());
    }
    if let Some(visible) = changes.is_visible {
        active.is_visible = Set(visible);
    }
    if let Some(required) = changes.is_required {
        active.is_required = Set(required);
    }
    if let Some(order) = changes.display_order {
        active.display_order = Set(order);
    }
    if let Some(placeholder) = changes.placeholder {
        active.placeholder = Set(super::clean_text(Some(placeholder)));
    }
    if let Some(section) = changes.section {
        active.section = Set(super::clean_text(Some(section)));
    }
    if let Some(options) = changes.options {
        if is_select {
            if is_system {
                return Err(ServiceError::ValidationError(
                    "options of built-in fields are fixed".to_string(),
                ));
            }
            let cleaned = clean_options(Some(options));
            if cleaned.is_empty() {
                return Err(ServiceError::ValidationError(
                    "select fields require at least one option".to_string(),
                ));
            }
            active.options = Set(options_to_json(Some(cleaned)));
        }
    }

    Ok(active.update(db).await?)
}
