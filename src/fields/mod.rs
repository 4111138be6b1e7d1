//! Custom field vocabulary shared by the field stores, the renderer and the
//! entity services.
//!
//! Every field, built-in or admin-defined, is addressed by an [`EntityType`] and a
//! machine `field_name`. The two persisted stores (`custom_fields` and
//! `field_configs`) are projected into a [`FieldSpec`] before anything renders or
//! validates against them.

pub mod renderer;
pub mod system;
pub mod value;

use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::entities::{custom_field, field_config};
use crate::errors::ServiceError;

pub use renderer::{render_field, render_form, Control, FieldControl, FormLayout};
pub use value::{validate_custom_data, CustomData, CustomValue};

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("static regex"));

/// Entity types that can carry custom fields. The wire and storage value is the
/// backing table name.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
pub enum EntityType {
    #[sea_orm(string_value = "phones")]
    #[serde(rename = "phones", alias = "inventory")]
    #[strum(to_string = "phones")]
    Inventory,
    #[sea_orm(string_value = "customers")]
    #[serde(rename = "customers", alias = "customer")]
    #[strum(to_string = "customers")]
    Customer,
    #[sea_orm(string_value = "orders")]
    #[serde(rename = "orders", alias = "order")]
    #[strum(to_string = "orders")]
    Order,
    #[sea_orm(string_value = "inquiries")]
    #[serde(rename = "inquiries", alias = "inquiry")]
    #[strum(to_string = "inquiries")]
    Inquiry,
}

impl EntityType {
    pub const ALL: [EntityType; 4] = [
        EntityType::Inventory,
        EntityType::Customer,
        EntityType::Order,
        EntityType::Inquiry,
    ];

    /// Backing table name, also the `?table=` query value
    pub fn table_name(&self) -> &'static str {
        match self {
            EntityType::Inventory => "phones",
            EntityType::Customer => "customers",
            EntityType::Order => "orders",
            EntityType::Inquiry => "inquiries",
        }
    }
}

impl FromStr for EntityType {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "phones" | "phone" | "inventory" => Ok(EntityType::Inventory),
            "customers" | "customer" => Ok(EntityType::Customer),
            "orders" | "order" => Ok(EntityType::Order),
            "inquiries" | "inquiry" => Ok(EntityType::Inquiry),
            other => Err(ServiceError::ValidationError(format!(
                "unknown entity type '{}'; expected one of phones, customers, orders, inquiries",
                other
            ))),
        }
    }
}

/// Input kinds a field can take
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FieldKind {
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "number")]
    Number,
    #[sea_orm(string_value = "date")]
    Date,
    #[sea_orm(string_value = "boolean")]
    Boolean,
    #[sea_orm(string_value = "select")]
    Select,
    #[sea_orm(string_value = "textarea")]
    Textarea,
}

impl FieldKind {
    pub fn requires_options(&self) -> bool {
        matches!(self, FieldKind::Select)
    }
}

impl FromStr for FieldKind {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(FieldKind::Text),
            "number" => Ok(FieldKind::Number),
            "date" => Ok(FieldKind::Date),
            "boolean" | "bool" => Ok(FieldKind::Boolean),
            "select" | "single-select" | "single_select" => Ok(FieldKind::Select),
            "textarea" | "long-text" | "long_text" => Ok(FieldKind::Textarea),
            other => Err(ServiceError::ValidationError(format!(
                "unknown field type '{}'; expected one of text, number, date, boolean, select, textarea",
                other
            ))),
        }
    }
}

/// Turns a human label or loosely typed key into a machine key:
/// `"Warranty Tier"` becomes `warranty_tier`.
pub fn normalize_field_name(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    NON_ALNUM
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// Trims options and drops blanks and duplicates, keeping first-seen order
pub fn clean_options(options: Option<Vec<String>>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for option in options.unwrap_or_default() {
        let option = option.trim();
        if !option.is_empty() && !cleaned.iter().any(|o| o == option) {
            cleaned.push(option.to_string());
        }
    }
    cleaned
}

/// Validated shape shared by field definition and field config creation
#[derive(Debug, Clone, PartialEq)]
pub struct NewField {
    pub field_name: String,
    pub field_label: String,
    pub kind: FieldKind,
    /// `None` for every kind but select
    pub options: Option<Vec<String>>,
}

impl NewField {
    /// Rejects empty names/labels and select fields without options; options on
    /// non-select kinds are discarded.
    pub fn parse(
        field_name: &str,
        field_label: &str,
        kind: FieldKind,
        options: Option<Vec<String>>,
    ) -> Result<Self, ServiceError> {
        let field_label = field_label.trim();
        if field_label.is_empty() {
            return Err(ServiceError::ValidationError(
                "field label is required".to_string(),
            ));
        }
        if field_name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "field name is required".to_string(),
            ));
        }
        let normalized = normalize_field_name(field_name);
        if normalized.is_empty() {
            return Err(ServiceError::ValidationError(format!(
                "field name '{}' must contain letters or digits",
                field_name
            )));
        }

        let options = if kind.requires_options() {
            let cleaned = clean_options(options);
            if cleaned.is_empty() {
                return Err(ServiceError::ValidationError(
                    "select fields require at least one option".to_string(),
                ));
            }
            Some(cleaned)
        } else {
            None
        };

        Ok(Self {
            field_name: normalized,
            field_label: field_label.to_string(),
            kind,
            options,
        })
    }
}

/// Reads a JSON options column back into a list
pub fn options_from_json(options: Option<&Json>) -> Vec<String> {
    options
        .and_then(|value| value.as_array())
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

pub fn options_to_json(options: Option<Vec<String>>) -> Option<Json> {
    options.map(|opts| Json::Array(opts.into_iter().map(Json::String).collect()))
}

/// Everything the renderer and the custom_data validator need to know about
/// one field, whichever store it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub field_name: String,
    pub label: String,
    pub kind: FieldKind,
    pub options: Vec<String>,
    pub required: bool,
    pub placeholder: Option<String>,
    pub section: Option<String>,
    pub is_system: bool,
    pub is_visible: bool,
}

impl From<&field_config::Model> for FieldSpec {
    fn from(config: &field_config::Model) -> Self {
        Self {
            field_name: config.field_name.clone(),
            label: config.field_label.clone(),
            kind: config.field_type,
            options: options_from_json(config.options.as_ref()),
            required: config.is_required,
            placeholder: config.placeholder.clone(),
            section: config.section.clone(),
            is_system: config.is_system,
            is_visible: config.is_visible,
        }
    }
}

impl From<&custom_field::Model> for FieldSpec {
    fn from(definition: &custom_field::Model) -> Self {
        Self {
            field_name: definition.field_name.clone(),
            label: definition.field_label.clone(),
            kind: definition.field_type,
            options: options_from_json(definition.options.as_ref()),
            required: definition.required,
            placeholder: None,
            section: None,
            is_system: false,
            is_visible: true,
        }
    }
}

/// Specs for every config in the order given, followed by definitions that
/// have no custom config yet. Required-ness from either store sticks.
pub fn merge_specs(
    definitions: &[custom_field::Model],
    configs: &[field_config::Model],
) -> Vec<FieldSpec> {
    let mut specs: Vec<FieldSpec> = configs.iter().map(FieldSpec::from).collect();

    for definition in definitions {
        match specs
            .iter_mut()
            .find(|spec| !spec.is_system && spec.field_name == definition.field_name)
        {
            Some(spec) => spec.required |= definition.required,
            None => specs.push(FieldSpec::from(definition)),
        }
    }

    specs
}

/// Custom field specs for one entity type: display configs win over bare
/// definitions.
pub fn merge_custom_specs(
    definitions: &[custom_field::Model],
    configs: &[field_config::Model],
) -> Vec<FieldSpec> {
    merge_specs(definitions, configs)
        .into_iter()
        .filter(|spec| !spec.is_system)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case("phones", EntityType::Inventory)]
    #[case("inventory", EntityType::Inventory)]
    #[case("Customers", EntityType::Customer)]
    #[case("order", EntityType::Order)]
    #[case(" inquiries ", EntityType::Inquiry)]
    fn entity_type_parses_tables_and_aliases(#[case] raw: &str, #[case] expected: EntityType) {
        assert_eq!(raw.parse::<EntityType>().unwrap(), expected);
    }

    #[test]
    fn entity_type_rejects_unknown_tables() {
        assert_matches!(
            "leads".parse::<EntityType>(),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn entity_type_serializes_as_table_name() {
        assert_eq!(
            serde_json::to_value(EntityType::Inventory).unwrap(),
            "phones"
        );
        assert_eq!(EntityType::Inquiry.to_string(), "inquiries");
        let parsed: EntityType = serde_json::from_value(serde_json::json!("inventory")).unwrap();
        assert_eq!(parsed, EntityType::Inventory);
    }

    #[test]
    fn field_kind_uses_lowercase_names() {
        assert_eq!(serde_json::to_value(FieldKind::Textarea).unwrap(), "textarea");
        assert_eq!(FieldKind::Boolean.to_string(), "boolean");
        assert_eq!("Long-Text".parse::<FieldKind>().unwrap(), FieldKind::Textarea);
        assert_eq!("single-select".parse::<FieldKind>().unwrap(), FieldKind::Select);
        assert_matches!(
            "checkbox".parse::<FieldKind>(),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[rstest]
    #[case("Warranty Tier", "warranty_tier")]
    #[case("serial_number", "serial_number")]
    #[case("  IMEI #2 ", "imei_2")]
    #[case("Battery-Health (%)", "battery_health")]
    fn field_names_are_normalized(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_field_name(raw), expected);
    }

    #[rstest]
    fn select_without_options_is_rejected(
        #[values(None, Some(vec![]), Some(vec!["  ".to_string()]))] options: Option<Vec<String>>,
    ) {
        assert_matches!(
            NewField::parse("tier", "Tier", FieldKind::Select, options),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn blank_name_or_label_is_rejected() {
        assert_matches!(
            NewField::parse("", "Label", FieldKind::Text, None),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            NewField::parse("name", "   ", FieldKind::Text, None),
            Err(ServiceError::ValidationError(_))
        );
        assert_matches!(
            NewField::parse("%%%", "Label", FieldKind::Text, None),
            Err(ServiceError::ValidationError(_))
        );
    }

    #[test]
    fn options_are_dropped_for_non_select_kinds() {
        let field = NewField::parse(
            "Serial Number",
            "Serial Number",
            FieldKind::Text,
            Some(vec!["x".into()]),
        )
        .unwrap();
        assert_eq!(field.field_name, "serial_number");
        assert_eq!(field.options, None);
    }

    #[test]
    fn select_options_are_cleaned() {
        let field = NewField::parse(
            "warranty_tier",
            "Warranty Tier",
            FieldKind::Select,
            Some(vec![" Basic".into(), "Extended".into(), "Basic".into(), "".into()]),
        )
        .unwrap();
        assert_eq!(
            field.options,
            Some(vec!["Basic".to_string(), "Extended".to_string()])
        );
    }

    fn config(name: &str, is_system: bool, required: bool) -> field_config::Model {
        field_config::Model {
            id: uuid::Uuid::new_v4(),
            table_name: EntityType::Inventory,
            field_name: name.to_string(),
            field_label: name.to_string(),
            field_type: FieldKind::Text,
            is_system,
            is_visible: true,
            is_required: required,
            display_order: 0,
            options: None,
            placeholder: None,
            section: None,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    fn definition(name: &str, required: bool) -> custom_field::Model {
        custom_field::Model {
            id: uuid::Uuid::new_v4(),
            table_name: EntityType::Inventory,
            field_name: name.to_string(),
            field_label: name.to_string(),
            field_type: FieldKind::Text,
            options: None,
            required,
            created_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn merged_specs_keep_config_order_and_append_bare_definitions() {
        let configs = vec![
            config("brand", true, true),
            config("serial_number", false, false),
            config("model", true, true),
        ];
        let definitions = vec![definition("serial_number", true), definition("grade", false)];

        let all = merge_specs(&definitions, &configs);
        let names: Vec<&str> = all.iter().map(|s| s.field_name.as_str()).collect();
        assert_eq!(names, ["brand", "serial_number", "model", "grade"]);
        assert!(all[1].required);

        let custom = merge_custom_specs(&definitions, &configs);
        let names: Vec<&str> = custom.iter().map(|s| s.field_name.as_str()).collect();
        assert_eq!(names, ["serial_number", "grade"]);
    }

    proptest! {
        #[test]
        fn normalized_names_are_machine_keys(raw in "\\PC{0,40}") {
            let name = normalize_field_name(&raw);
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
            prop_assert!(!name.starts_with('_') && !name.ends_with('_'));
            prop_assert!(!name.contains("__"));
        }

        #[test]
        fn normalization_is_idempotent(raw in "[A-Za-z0-9 _-]{0,30}") {
            let once = normalize_field_name(&raw);
            prop_assert_eq!(normalize_field_name(&once), once.clone());
        }
    }
}
