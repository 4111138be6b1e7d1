use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rephone API",
        version = "0.1.0",
        description = r#"
# Rephone Storefront and CRM API

Inventory, customers, orders and inquiries for a pre-owned phone retailer.

## Custom fields

Every record type carries a `custom_data` object. Its keys are declared at runtime:

- **Field definitions** (`/api/custom-fields`) add a named, typed field to a record type
- **Field configs** (`/api/field-config`) control label, visibility, requirement, section and display order of both built-in and custom fields
- **Forms** (`/api/forms/{table}`) return the resulting layout, optionally pre-filled from a stored record

`custom_data` values are checked against the declared fields on every write.

## Errors

```json
{
  "error": "Bad Request",
  "message": "Validation error: custom field 'warranty_months' expects a number",
  "request_id": "req-abc123xyz",
  "timestamp": "2024-01-01T00:00:00Z"
}
```

## Pagination

List endpoints accept `page` (default 1) and `limit` (default and maximum are configurable).
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Custom Fields", description = "Field definitions per record type"),
        (name = "Field Config", description = "Display configuration of built-in and custom fields"),
        (name = "Forms", description = "Rendered form layouts"),
        (name = "Phones", description = "Phone inventory"),
        (name = "Customers", description = "Customer records"),
        (name = "Orders", description = "Orders"),
        (name = "Inquiries", description = "Customer inquiries"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Field definitions
        crate::handlers::custom_fields::list_custom_fields,
        crate::handlers::custom_fields::create_custom_field,
        crate::handlers::custom_fields::delete_custom_field,

        // Field configs
        crate::handlers::field_config::list_field_configs,
        crate::handlers::field_config::create_field_config,
        crate::handlers::field_config::bulk_save_field_configs,
        crate::handlers::field_config::update_field_config,
        crate::handlers::field_config::delete_field_config,
        crate::handlers::field_config::move_field_config,

        // Forms
        crate::handlers::forms::blank_form,
        crate::handlers::forms::record_form,

        // Phones
        crate::handlers::phones::list_phones,
        crate::handlers::phones::get_phone,
        crate::handlers::phones::create_phone,
        crate::handlers::phones::update_phone,
        crate::handlers::phones::delete_phone,

        // Customers
        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::create_order,
        crate::handlers::orders::update_order,
        crate::handlers::orders::delete_order,

        // Inquiries
        crate::handlers::inquiries::list_inquiries,
        crate::handlers::inquiries::get_inquiry,
        crate::handlers::inquiries::create_inquiry,
        crate::handlers::inquiries::update_inquiry,
        crate::handlers::inquiries::delete_inquiry,

        // Health
        crate::health::health_check,
        crate::health::readiness_check,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,

            // Field configuration
            crate::fields::EntityType,
            crate::fields::FieldKind,
            crate::entities::custom_field::Model,
            crate::entities::field_config::Model,
            crate::services::custom_fields::CreateFieldDefinitionRequest,
            crate::services::field_config::CreateFieldConfigRequest,
            crate::services::field_config::UpdateFieldConfigRequest,
            crate::services::field_config::FieldConfigPatch,
            crate::services::field_config::MoveDirection,
            crate::handlers::field_config::MoveFieldRequest,

            // Forms
            crate::fields::FormLayout,
            crate::fields::FieldControl,
            crate::fields::Control,

            // Records
            crate::entities::phone::Model,
            crate::entities::phone::PhoneCondition,
            crate::entities::phone::PhoneStatus,
            crate::entities::customer::Model,
            crate::entities::order::Model,
            crate::entities::order::OrderStatus,
            crate::entities::inquiry::Model,
            crate::entities::inquiry::InquiryStatus,
            crate::services::phones::CreatePhoneRequest,
            crate::services::phones::UpdatePhoneRequest,
            crate::services::customers::CreateCustomerRequest,
            crate::services::customers::UpdateCustomerRequest,
            crate::services::orders::CreateOrderRequest,
            crate::services::orders::UpdateOrderRequest,
            crate::services::inquiries::CreateInquiryRequest,
            crate::services::inquiries::UpdateInquiryRequest,

            // Health
            crate::health::HealthInfo,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
