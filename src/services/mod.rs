pub mod custom_fields;
pub mod customers;
pub mod field_config;
pub mod forms;
pub mod inquiries;
pub mod orders;
pub mod phones;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use serde_json::Value;
use uuid::Uuid;
use validator::ValidationError;

use crate::entities::{custom_field, field_config as field_config_entity};
use crate::errors::ServiceError;
use crate::fields::{merge_custom_specs, validate_custom_data, EntityType, FieldSpec};

/// Custom fields (from both stores) an entity type's `custom_data` is checked against
pub async fn custom_field_specs<C>(db: &C, entity_type: EntityType) -> Result<Vec<FieldSpec>, ServiceError>
where
    C: ConnectionTrait,
{
    let definitions = custom_field::Entity::find()
        .filter(custom_field::Column::TableName.eq(entity_type))
        .order_by_asc(custom_field::Column::CreatedAt)
        .order_by_asc(custom_field::Column::Id)
        .all(db)
        .await?;

    let configs = field_config_entity::Entity::find()
        .filter(field_config_entity::Column::TableName.eq(entity_type))
        .filter(field_config_entity::Column::IsSystem.eq(false))
        .order_by_asc(field_config_entity::Column::DisplayOrder)
        .order_by_asc(field_config_entity::Column::CreatedAt)
        .order_by_asc(field_config_entity::Column::Id)
        .all(db)
        .await?;

    Ok(merge_custom_specs(&definitions, &configs))
}

/// Validates a submitted bag for `entity_type` and returns the JSON to persist
pub(crate) async fn checked_custom_data<C>(
    db: &C,
    entity_type: EntityType,
    raw: &Value,
    strict: bool,
) -> Result<Value, ServiceError>
where
    C: ConnectionTrait,
{
    let specs = custom_field_specs(db, entity_type).await?;
    Ok(validate_custom_data(entity_type, &specs, raw, strict)?.to_json())
}

/// Rejects an update carrying a stale `version`. No token means last write wins.
pub(crate) fn check_version(id: Uuid, stored: i32, expected: Option<i32>) -> Result<(), ServiceError> {
    match expected {
        Some(expected) if expected != stored => Err(ServiceError::ConcurrentModification(id)),
        _ => Ok(()),
    }
}

/// Maps the "no row matched" outcome of a version-guarded update
pub(crate) fn version_conflict(id: Uuid) -> impl FnOnce(DbErr) -> ServiceError {
    move |err| match err {
        DbErr::RecordNotUpdated => ServiceError::ConcurrentModification(id),
        other => ServiceError::DatabaseError(other),
    }
}

/// Trims an optional text column; blank becomes `None`
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Largest amount a `decimal(12, 2)` money column holds
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(3_567_587_327, 232, 0, false, 2);

pub(crate) fn money_amount(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::new("negative"));
    }
    if *value > MAX_AMOUNT {
        return Err(ValidationError::new("too_large"));
    }
    Ok(())
}

/// A page of rows plus the total row count
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.limit == 0 {
            0
        } else {
            (self.total + self.limit - 1) / self.limit
        }
    }
}
