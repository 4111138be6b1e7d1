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
    entities::inquiry::{self, InquiryStatus},
    errors::ServiceError,
    events::{Event, EventSender},
    fields::EntityType,
};

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateInquiryRequest {
    #[validate(length(max = 200), custom = "not_blank")]
    pub name: String,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub phone_model: Option<String>,
    #[validate(length(max = 5000), custom = "not_blank")]
    pub message: String,
    #[serde(default)]
    pub status: InquiryStatus,
    /// Channel the lead came in through
    pub source: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub custom_data: Value,
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateInquiryRequest {
    #[validate(length(max = 200), custom = "not_blank")]
    pub name: Option<String>,
    #[validate(email(message = "invalid email address"))]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub phone_model: Option<String>,
    #[validate(length(max = 5000), custom = "not_blank")]
    pub message: Option<String>,
    pub status: Option<InquiryStatus>,
    pub source: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub custom_data: Option<Value>,
    pub version: Option<i32>,
}

#[derive(Clone)]
pub struct InquiryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
    strict_custom_data: bool,
}

impl InquiryService {
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
    pub async fn create(&self, request: CreateInquiryRequest) -> Result<inquiry::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let custom_data = checked_custom_data(
            db,
            EntityType::Inquiry,
            &request.custom_data,
            self.strict_custom_data,
        )
        .await?;

        let inquiry = inquiry::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            email: Set(clean_text(request.email)),
            phone: Set(clean_text(request.phone)),
            phone_model: Set(clean_text(request.phone_model)),
            message: Set(request.message.trim().to_string()),
            status: Set(request.status),
            source: Set(clean_text(request.source)),
            custom_data: Set(custom_data),
            version: Set(1),
            ..Default::default()
        }
        .insert(db)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to insert inquiry");
            ServiceError::DatabaseError(e)
        })?;

        info!(id = %inquiry.id, source = ?inquiry.source, "Inquiry received");
        self.emit(Event::EntityCreated {
            entity_type: EntityType::Inquiry,
            id: inquiry.id,
        })
        .await;

        Ok(inquiry)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: Uuid) -> Result<inquiry::Model, ServiceError> {
        inquiry::Entity::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Inquiry {} not found", id)))
    }

    /// Newest first
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        search: Option<String>,
        status: Option<InquiryStatus>,
        page: u64,
        limit: u64,
    ) -> Result<Page<inquiry::Model>, ServiceError> {
        let mut condition = Condition::all();
        if let Some(term) = clean_text(search) {
            condition = condition.add(
                Condition::any()
                    .add(inquiry::Column::Name.contains(&term))
                    .add(inquiry::Column::Email.contains(&term))
                    .add(inquiry::Column::PhoneModel.contains(&term))
                    .add(inquiry::Column::Message.contains(&term)),
            );
        }
        if let Some(status) = status {
            condition = condition.add(inquiry::Column::Status.eq(status));
        }

        let paginator = inquiry::Entity::find()
            .filter(condition)
            .order_by_desc(inquiry::Column::CreatedAt)
            .order_by_asc(inquiry::Column::Id)
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
        request: UpdateInquiryRequest,
    ) -> Result<inquiry::Model, ServiceError> {
        request.validate()?;
        let db = &*self.db_pool;

        let existing = self.get(id).await?;
        check_version(id, existing.version, request.version)?;
        let stored_version = existing.version;

        let mut active: inquiry::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if request.email.is_some() {
            active.email = Set(clean_text(request.email));
        }
        if request.phone.is_some() {
            active.phone = Set(clean_text(request.phone));
        }
        if request.phone_model.is_some() {
            active.phone_model = Set(clean_text(request.phone_model));
        }
        if let Some(message) = request.message {
            active.message = Set(message.trim().to_string());
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        if request.source.is_some() {
            active.source = Set(clean_text(request.source));
        }
        if let Some(raw) = request.custom_data {
            let custom_data =
                checked_custom_data(db, EntityType::Inquiry, &raw, self.strict_custom_data).await?;
            active.custom_data = Set(custom_data);
        }
        active.version = Set(stored_version + 1);
        active.updated_at = Set(Utc::now());

        let updated = inquiry::Entity::update(active)
            .filter(inquiry::Column::Version.eq(stored_version))
            .exec(db)
            .await
            .map_err(version_conflict(id))?;

        info!(%id, status = %updated.status, "Inquiry updated");
        self.emit(Event::EntityUpdated {
            entity_type: EntityType::Inquiry,
            id,
            version: updated.version,
        })
        .await;

        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = inquiry::Entity::delete_by_id(id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Inquiry {} not found", id)));
        }

        info!(%id, "Inquiry deleted");
        self.emit(Event::EntityDeleted {
            entity_type: EntityType::Inquiry,
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
    use serde_json::json;

    #[test]
    fn message_is_required_and_status_defaults_to_new() {
        let req: CreateInquiryRequest = serde_json::from_value(json!({
            "name": "Sam",
            "message": "Is the Pixel 7 still available?",
            "source": "whatsapp"
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.status, InquiryStatus::New);

        let blank: CreateInquiryRequest =
            serde_json::from_value(json!({"name": "Sam", "message": " "})).unwrap();
        assert!(blank.validate().is_err());
    }
}
