use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::{check_version, checked_custom_data, clean_text, money_amount, version_conflict, Page};
use crate::{
    db::DbPool,
    entities::{
        customer,
        order::{self, OrderStatus},
        phone,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    fields::EntityType,
};

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub phone_id: Option<Uuid>,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, max = 10000, message = "quantity must be between 1 and 10000"))]
    pub quantity: i32,
    /// Defaults to phone price times quantity when a phone is linked
    #[validate(custom = "money_amount")]
    pub total_amount: Option<Decimal>,
    #[serde(default)]
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub custom_data: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderRequest {
    pub customer_id: Option<Uuid>,
    pub phone_id: Option<Uuid>,
    #[validate(range(min = 1, max = 10000, message = "quantity must be between 1 and 10000"))]
    pub quantity: Option<i32>,
    #[validate(custom = "money_amount")]
    pub total_amount: Option<Decimal>,
    pub status: Option<OrderStatus>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub custom_data: Option<Value>,
    pub version: Option<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Matches payment method or notes
    pub search: Option<String>,
    pub status: Option<OrderStatus>,
    pub customer_id: Option<Uuid>,
}

#[derive(Clone)]
pub struct OrderService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    strict_custom_data: bool,
}

impl OrderService {
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

    #[instrument(skip(self, request), fields(customer_id = ?request.customer_id, phone_id = ?request.phone_id))]
    pub async fn create(&self, request: CreateOrderRequest) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        if let Some(customer_id) = request.customer_id {
            ensure_customer(db, customer_id).await?;
        }
        let phone = match request.phone_id {
            Some(phone_id) => Some(ensure_phone(db, phone_id).await?),
            None => None,
        };

        let total_amount = match (request.total_amount, &phone) {
            (Some(total), _) => total,
            (None, Some(phone)) => line_total(phone.price, request.quantity)?,
            (None, None) => Decimal::ZERO,
        };

        let custom_data = checked_custom_data(
            db,
            EntityType::Order,
            &request.custom_data,
            self.strict_custom_data,
        )
        .await?;

        let order = order::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(request.customer_id),
            phone_id: Set(request.phone_id),
            quantity: Set(request.quantity),
            total_amount: Set(total_amount),
            status: Set(request.status),
            payment_method: Set(clean_text(request.payment_method)),
            notes: Set(clean_text(request.notes)),
            custom_data: Set(custom_data),
            version: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert order");
            ServiceError::DatabaseError(e)
        })?;

        info!(id = %order.id, total = %order.total_amount, "Order created");
        self.emit(Event::EntityCreated {
            entity_type: EntityType::Order,
            id: order.id,
        })
        .await;

        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<order::Model, ServiceError> {
        order::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Order {} not found", id)))
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: OrderFilter,
        page: u64,
        limit: u64,
    ) -> Result<Page<order::Model>, ServiceError> {
        let mut condition = Condition::all();
        if let Some(term) = clean_text(filter.search) {
            condition = condition.add(
                Condition::any()
                    .add(order::Column::PaymentMethod.contains(&term))
                    .add(order::Column::Notes.contains(&term)),
            );
        }
        if let Some(status) = filter.status {
            condition = condition.add(order::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            condition = condition.add(order::Column::CustomerId.eq(customer_id));
        }

        let paginator = order::Entity::find()
            .filter(condition)
            .order_by_desc(order::Column::CreatedAt)
            .order_by_asc(order::Column::Id)
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

    #[instrument(skip(self, request))]
    pub async fn update(&self, id: Uuid, request: UpdateOrderRequest) -> Result<order::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = self.get(id).await?;
        check_version(id, existing.version, request.version)?;
        let stored_version = existing.version;
        let previous_status = existing.status;

        let mut active: order::ActiveModel = existing.into();
        if let Some(customer_id) = request.customer_id {
            ensure_customer(db, customer_id).await?;
            active.customer_id = Set(Some(customer_id));
        }
        if let Some(phone_id) = request.phone_id {
            ensure_phone(db, phone_id).await?;
            active.phone_id = Set(Some(phone_id));
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(total) = request.total_amount {
            active.total_amount = Set(total);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if request.payment_method.is_some() {
            active.payment_method = Set(clean_text(request.payment_method));
        }
        if request.notes.is_some() {
            active.notes = Set(clean_text(request.notes));
        }
        if let Some(raw) = request.custom_data {
            let custom_data =
                checked_custom_data(db, EntityType::Order, &raw, self.strict_custom_data).await?;
            active.custom_data = Set(custom_data);
        }
        active.version = Set(stored_version + 1);
        active.updated_at = Set(Utc::now());

        let updated = order::Entity::update(active)
            .filter(order::Column::Version.eq(stored_version))
            .exec(db)
            .await
            .map_err(version_conflict(id))?;

        if updated.status != previous_status {
            info!(%id, from = %previous_status, to = %updated.status, "Order status changed");
        }
        self.emit(Event::EntityUpdated {
            entity_type: EntityType::Order,
            id,
            version: updated.version,
        })
        .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = order::Entity::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Order {} not found", id)));
        }

        info!(%id, "Order deleted");
        self.emit(Event::EntityDeleted {
            entity_type: EntityType::Order,
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

async fn ensure_customer<C>(db: &C, id: Uuid) -> Result<(), ServiceError>
where
    C: ConnectionTrait,
{
    let found = customer::Entity::find_by_id(id).count(db).await?;
    if found == 0 {
        warn!(customer_id = %id, "Order references unknown customer");
        return Err(ServiceError::ValidationError(format!(
            "customer {} does not exist",
            id
        )));
    }
    Ok(())
}

/// Price times quantity, rejected when it does not fit a money column
fn line_total(price: Decimal, quantity: i32) -> Result<Decimal, ServiceError> {
    price
        .checked_mul(Decimal::from(quantity))
        .filter(|total| money_amount(total).is_ok())
        .ok_or_else(|| {
            ServiceError::ValidationError(format!(
                "order total for {} x {} exceeds the maximum amount",
                quantity, price
            ))
        })
}

async fn ensure_phone<C>(db: &C, id: Uuid) -> Result<phone::Model, ServiceError>
where
    C: ConnectionTrait,
{
    phone::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::ValidationError(format!("phone {} does not exist", id)))
}
