//! Built-in columns of each entity type, seeded as system field configs so the
//! settings screen can hide, relabel and reorder them next to custom fields.

use super::{EntityType, FieldKind};

/// One built-in field seed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemField {
    pub field_name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub options: &'static [&'static str],
    pub required: bool,
    pub placeholder: Option<&'static str>,
    pub section: &'static str,
}

const fn field(
    field_name: &'static str,
    label: &'static str,
    kind: FieldKind,
    section: &'static str,
) -> SystemField {
    SystemField {
        field_name,
        label,
        kind,
        options: &[],
        required: false,
        placeholder: None,
        section,
    }
}

impl SystemField {
    const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    const fn options(mut self, options: &'static [&'static str]) -> Self {
        self.options = options;
        self
    }

    const fn placeholder(mut self, placeholder: &'static str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }
}

pub const PHONE_CONDITIONS: &[&str] = &["new", "like_new", "good", "fair"];
pub const PHONE_STATUSES: &[&str] = &["available", "reserved", "sold"];
pub const ORDER_STATUSES: &[&str] = &["pending", "confirmed", "shipped", "delivered", "cancelled"];
pub const INQUIRY_STATUSES: &[&str] = &["new", "contacted", "closed"];

const PHONE_FIELDS: &[SystemField] = &[
    field("brand", "Brand", FieldKind::Text, "Device").required().placeholder("e.g. Apple"),
    field("model", "Model", FieldKind::Text, "Device").required().placeholder("e.g. iPhone 13"),
    field("storage", "Storage", FieldKind::Text, "Device").placeholder("e.g. 128GB"),
    field("color", "Color", FieldKind::Text, "Device"),
    field("condition", "Condition", FieldKind::Select, "Device").options(PHONE_CONDITIONS),
    field("price", "Price", FieldKind::Number, "Pricing").required(),
    field("stock", "Stock", FieldKind::Number, "Pricing"),
    field("status", "Status", FieldKind::Select, "Pricing").options(PHONE_STATUSES),
    field("imei", "IMEI", FieldKind::Text, "Details").placeholder("15 digit IMEI"),
    field("description", "Description", FieldKind::Textarea, "Details"),
];

const CUSTOMER_FIELDS: &[SystemField] = &[
    field("name", "Name", FieldKind::Text, "Contact").required(),
    field("email", "Email", FieldKind::Text, "Contact").placeholder("name@example.com"),
    field("phone", "Phone", FieldKind::Text, "Contact"),
    field("address", "Address", FieldKind::Textarea, "Contact"),
    field("notes", "Notes", FieldKind::Textarea, "Notes"),
];

const ORDER_FIELDS: &[SystemField] = &[
    field("customer_id", "Customer", FieldKind::Text, "Order"),
    field("phone_id", "Phone", FieldKind::Text, "Order"),
    field("quantity", "Quantity", FieldKind::Number, "Order"),
    field("total_amount", "Total Amount", FieldKind::Number, "Payment"),
    field("status", "Status", FieldKind::Select, "Order").options(ORDER_STATUSES),
    field("payment_method", "Payment Method", FieldKind::Text, "Payment"),
    field("notes", "Notes", FieldKind::Textarea, "Notes"),
];

const INQUIRY_FIELDS: &[SystemField] = &[
    field("name", "Name", FieldKind::Text, "Contact").required(),
    field("email", "Email", FieldKind::Text, "Contact"),
    field("phone", "Phone", FieldKind::Text, "Contact"),
    field("phone_model", "Phone Model", FieldKind::Text, "Inquiry"),
    field("message", "Message", FieldKind::Textarea, "Inquiry").required(),
    field("status", "Status", FieldKind::Select, "Inquiry").options(INQUIRY_STATUSES),
    field("source", "Source", FieldKind::Text, "Inquiry").placeholder("website, whatsapp, walk-in"),
];

/// Built-in fields of `entity_type`, in default render order
pub fn system_fields(entity_type: EntityType) -> &'static [SystemField] {
    match entity_type {
        EntityType::Inventory => PHONE_FIELDS,
        EntityType::Customer => CUSTOMER_FIELDS,
        EntityType::Order => ORDER_FIELDS,
        EntityType::Inquiry => INQUIRY_FIELDS,
    }
}

pub fn is_system_field(entity_type: EntityType, field_name: &str) -> bool {
    system_fields(entity_type)
        .iter()
        .any(|f| f.field_name == field_name)
}
