pub mod common;
pub mod custom_fields;
pub mod customers;
pub mod field_config;
pub mod forms;
pub mod inquiries;
pub mod orders;
pub mod phones;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    custom_fields::CustomFieldService, customers::CustomerService,
    field_config::FieldConfigService, forms::FormService, inquiries::InquiryService,
    orders::OrderService, phones::PhoneService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub custom_fields: Arc<CustomFieldService>,
    pub field_config: Arc<FieldConfigService>,
    pub forms: Arc<FormService>,
    pub phones: Arc<PhoneService>,
    pub customers: Arc<CustomerService>,
    pub orders: Arc<OrderService>,
    pub inquiries: Arc<InquiryService>,
}

impl AppServices {
    /// Wire every service to the shared pool and event channel.
    ///
    /// `strict_custom_data` switches the entity services between rejecting
    /// unknown `custom_data` keys and storing them untouched.
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        strict_custom_data: bool,
    ) -> Self {
        let events = Some(event_sender);

        Self {
            custom_fields: Arc::new(CustomFieldService::new(db_pool.clone(), events.clone())),
            field_config: Arc::new(FieldConfigService::new(db_pool.clone(), events.clone())),
            forms: Arc::new(FormService::new(db_pool.clone())),
            phones: Arc::new(PhoneService::new(
                db_pool.clone(),
                events.clone(),
                strict_custom_data,
            )),
            customers: Arc::new(CustomerService::new(
                db_pool.clone(),
                events.clone(),
                strict_custom_data,
            )),
            orders: Arc::new(OrderService::new(
                db_pool.clone(),
                events.clone(),
                strict_custom_data,
            )),
            inquiries: Arc::new(InquiryService::new(db_pool, events, strict_custom_data)),
        }
    }
}
