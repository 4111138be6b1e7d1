use std::sync::Arc;

use chrono::Utc;
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

use super::{check_version, checked_custom_data, clean_text, not_blank, version_conflict, Page};
use crate::{
    db::DbPool,
    entities::customer,
    errors::ServiceError,
    events::{Event, EventSender},
    fields::EntityType,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(max = 200), custom = "not_blank")]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub custom_data: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    #[validate(length(max = 200), custom = "not_blank")]
    pub name: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub custom_data: Option<Value>,
    pub version: Option<i32>,
}

#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    strict_custom_data: bool,
}

impl CustomerService {
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

    #[instrument(skip(self, request))]
    pub async fn create(&self, request: CreateCustomerRequest) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let custom_data = checked_custom_data(
            db,
            EntityType::Customer,
            &request.custom_data,
            self.strict_custom_data,
        )
        .await?;

        let customer = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            email: Set(clean_text(request.email)),
            phone: Set(clean_text(request.phone)),
            address: Set(clean_text(request.address)),
            notes: Set(clean_text(request.notes)),
            custom_data: Set(custom_data),
            version: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert customer");
            ServiceError::DatabaseError(e)
        })?;

        info!(id = %customer.id, "Customer created");
        self.emit(Event::EntityCreated {
            entity_type: EntityType::Customer,
            id: customer.id,
        })
        .await;

        Ok(customer)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<customer::Model, ServiceError> {
        customer::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", id)))
    }

    /// Lists customers, optionally matching `search` against name, email or phone
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<String>,
        page: u64,
        limit: u64,
    ) -> Result<Page<customer::Model>, ServiceError> {
        let mut query = customer::Entity::find();
        if let Some(term) = clean_text(search) {
            query = query.filter(
                Condition::any()
                    .add(customer::Column::Name.contains(&term))
                    .add(customer::Column::Email.contains(&term))
                    .add(customer::Column::Phone.contains(&term)),
            );
        }

        let paginator = query
            .order_by_asc(customer::Column::Name)
            .order_by_asc(customer::Column::Id)
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
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCustomerRequest,
    ) -> Result<customer::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = self.get(id).await?;
        check_version(id, existing.version, request.version)?;
        let stored_version = existing.version;

        let mut active: customer::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.email.is_some() {
            active.email = Set(clean_text(request.email));
        }
        if request.phone.is_some() {
            active.phone = Set(clean_text(request.phone));
        }
        if request.address.is_some() {
            active.address = Set(clean_text(request.address));
        }
        if request.notes.is_some() {
            active.notes = Set(clean_text(request.notes));
        }
        if let Some(raw) = request.custom_data {
            let custom_data =
                checked_custom_data(db, EntityType::Customer, &raw, self.strict_custom_data).await?;
            active.custom_data = Set(custom_data);
        }
        active.version = Set(stored_version + 1);
        active.updated_at = Set(Utc::now());

        let updated = customer::Entity::update(active)
            .filter(customer::Column::Version.eq(stored_version))
            .exec(db)
            .await
            .map_err(version_conflict(id))?;

        info!(%id, version = updated.version, "Customer updated");
        self.emit(Event::EntityUpdated {
            entity_type: EntityType::Customer,
            id,
            version: updated.version,
        })
        .await;

        Ok(updated)
    }

    /// Deletes a customer; their orders keep existing without a customer link
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = customer::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Customer {} not found", id)));
        }

        info!(%id, "Customer deleted");
        self.emit(Event::EntityDeleted {
            entity_type: EntityType::Customer,
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
