use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{
    check_version, checked_custom_data, clean_text, money_amount, not_blank, version_conflict,
    Page,
};
use crate::{
    db::DbPool,
    entities::phone::{self, PhoneCondition, PhoneStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    fields::EntityType,
};

fn default_stock() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreatePhoneRequest {
    #[validate(length(max = 100), custom = "not_blank")]
    pub brand: String,
    #[validate(length(max = 100), custom = "not_blank")]
    pub model: String,
    pub storage: Option<String>,
    pub color: Option<String>,
    #[serde(default)]
    pub condition: PhoneCondition,
    #[validate(custom = "money_amount")]
    pub price: Decimal,
    #[serde(default = "default_stock")]
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: i32,
    #[serde(default)]
    pub status: PhoneStatus,
    #[validate(length(max = 32))]
    pub imei: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    /// Custom field values keyed by field name
    #[serde(default)]
    #[schema(value_type = Object)]
    pub custom_data: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePhoneRequest {
    #[validate(length(max = 100), custom = "not_blank")]
    pub brand: Option<String>,
    #[validate(length(max = 100), custom = "not_blank")]
    pub model: Option<String>,
    pub storage: Option<String>,
    pub color: Option<String>,
    pub condition: Option<PhoneCondition>,
    #[validate(custom = "money_amount")]
    pub price: Option<Decimal>,
    #[validate(range(min = 0, message = "stock cannot be negative"))]
    pub stock: Option<i32>,
    pub status: Option<PhoneStatus>,
    #[validate(length(max = 32))]
    pub imei: Option<String>,
    pub description: Option<String>,
    #[validate(length(max = 2048))]
    pub image_url: Option<String>,
    /// Replaces the whole bag when present
    #[schema(value_type = Option<Object>)]
    pub custom_data: Option<Value>,
    /// Version the client last read; a mismatch is rejected with 409
    pub version: Option<i32>,
}

/// Storefront filters for the phone list
#[derive(Debug, Clone, Default)]
pub struct PhoneFilter {
    /// Substring of brand or model
    pub search: Option<String>,
    pub brand: Option<String>,
    pub status: Option<PhoneStatus>,
}

#[derive(Clone)]
pub struct PhoneService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    strict_custom_data: bool,
}

impl PhoneService {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Option<Arc<EventSender>>,
        strict_custom_data: bool,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            strict_custom_data,
        }
    }

    #[instrument(skip(self, request), fields(brand = %request.brand, model = %request.model))]
    pub async fn create(&self, request: CreatePhoneRequest) -> Result<phone::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let custom_data = checked_custom_data(
            db,
            EntityType::Inventory,
            &request.custom_data,
            self.strict_custom_data,
        )
        .await?;

        let phone = phone::ActiveModel {
            id: Set(Uuid::new_v4()),
            brand: Set(request.brand.trim().to_string()),
            model: Set(request.model.trim().to_string()),
            storage: Set(clean_text(request.storage)),
            color: Set(clean_text(request.color)),
            condition: Set(request.condition),
            price: Set(request.price),
            stock: Set(request.stock),
            status: Set(request.status),
            imei: Set(clean_text(request.imei)),
            description: Set(clean_text(request.description)),
            image_url: Set(clean_text(request.image_url)),
            custom_data: Set(custom_data),
            version: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert phone");
            ServiceError::DatabaseError(e)
        })?;

        info!(id = %phone.id, "Phone listed");
        self.emit(Event::EntityCreated {
            entity_type: EntityType::Inventory,
            id: phone.id,
        })
        .await;

        Ok(phone)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<phone::Model, ServiceError> {
        phone::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Phone {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: PhoneFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<phone::Model>, ServiceError> {
        let mut condition = Condition::all();
        if let Some(term) = clean_text(filter.search) {
            condition = condition.add(
                Condition::any()
                    .add(phone::Column::Brand.contains(&term))
                    .add(phone::Column::Model.contains(&term)),
            );
        }
        if let Some(brand) = clean_text(filter.brand) {
            condition = condition.add(phone::Column::Brand.eq(brand));
        }
        if let Some(status) = filter.status {
            condition = condition.add(phone::Column::Status.eq(status));
        }

        let paginator = phone::Entity::find()
            .filter(condition)
            .order_by_desc(phone::Column::CreatedAt)
            .order_by_asc(phone::Column::Id)
            .paginate(&*self.db_pool, limit);

        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(Page {
            items,
            total,
            page,
            limit,
        })
    }

    /// Applies the given fixed fields and, when sent, swaps in a new custom_data bag
    #[instrument(skip(self, request))]
    pub async fn update(&self, id: Uuid, request: UpdatePhoneRequest) -> Result<phone::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = self.get(id).await?;
        check_version(id, existing.version, request.version)?;
        let stored_version = existing.version;

        let mut active: phone::ActiveModel = existing.into();
        if let Some(brand) = request.brand {
            active.brand = Set(brand.trim().to_string());
        }
        if let Some(model) = request.model {
            active.model = Set(model.trim().to_string());
        }
        if request.storage.is_some() {
            active.storage = Set(clean_text(request.storage));
        }
        if request.color.is_some() {
            active.color = Set(clean_text(request.color));
        }
        if let Some(condition) = request.condition {
            active.condition = Set(condition);
        }
        if let Some(price) = request.price {
            active.price = Set(price);
        }
        if let Some(stock) = request.stock {
            active.stock = Set(stock);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if request.imei.is_some() {
            active.imei = Set(clean_text(request.imei));
        }
        if request.description.is_some() {
            active.description = Set(clean_text(request.description));
        }
        if request.image_url.is_some() {
            active.image_url = Set(clean_text(request.image_url));
        }
        if let Some(raw) = request.custom_data {
            let custom_data =
                checked_custom_data(db, EntityType::Inventory, &raw, self.strict_custom_data)
                    .await?;
            active.custom_data = Set(custom_data);
        }
        active.version = Set(stored_version + 1);
        active.updated_at = Set(Utc::now());

        let updated = phone::Entity::update(active)
            .filter(phone::Column::Version.eq(stored_version))
            .exec(db)
            .await
            .map_err(version_conflict(id))?;

        info!(%id, version = updated.version, "Phone updated");
        self.emit(Event::EntityUpdated {
            entity_type: EntityType::Inventory,
            id,
            version: updated.version,
        })
        .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = phone::Entity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Phone {} not found", id)));
        }

        info!(%id, "Phone deleted");
        self.emit(Event::EntityDeleted {
            entity_type: EntityType::Inventory,
            id,
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

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn request() -> CreatePhoneRequest {
        serde_json::from_value(json!({
            "brand": "Apple",
            "model": "iPhone 13",
            "price": "499.00"
        }))
        .unwrap()
    }

    #[test]
    fn create_request_defaults() {
        let req = request();
        assert_eq!(req.stock, 1);
        assert_eq!(req.condition, PhoneCondition::Good);
        assert_eq!(req.status, PhoneStatus::Available);
        assert_eq!(req.price, dec!(499.00));
        assert!(req.custom_data.is_null());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_request_rules() {
        let mut req = request();
        req.brand = "  ".into();
        assert!(req.validate().is_err());

        let mut req = request();
        req.price = dec!(-1);
        assert!(req.validate().is_err());

        let mut req = request();
        req.stock = -2;
        assert!(req.validate().is_err());
    }

    #[test]
    fn update_request_checks_only_present_fields() {
        assert!(UpdatePhoneRequest::default().validate().is_ok());
        let req = UpdatePhoneRequest {
            price: Some(dec!(-5)),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn condition_uses_snake_case() {
        let condition: PhoneCondition = serde_json::from_value(json!("like_new")).unwrap();
        assert_eq!(condition, PhoneCondition::LikeNew);
        assert_eq!(PhoneCondition::LikeNew.to_string(), "like_new");
    }
}
