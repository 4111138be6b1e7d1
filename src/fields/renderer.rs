use serde::Serialize;
use serde_json::{Map, Value};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{CustomValue, EntityType, FieldKind, FieldSpec};
use crate::errors::ServiceError;

const DEFAULT_SECTION: &str = "General";

/// The widget a UI should draw for a field
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Control {
    TextInput,
    TextArea,
    NumberInput,
    DateInput,
    Toggle,
    Select { options: Vec<String> },
}

/// Renderer-agnostic description of one form input bound to a value
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FieldControl {
    pub field_name: String,
    pub label: String,
    pub control: Control,
    pub required: bool,
    pub placeholder: Option<String>,
    pub section: Option<String>,
    pub is_system: bool,
    /// Current value, `null` when unset
    #[schema(value_type = Object)]
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FormSection {
    pub name: String,
    pub fields: Vec<FieldControl>,
}

/// A whole entity form: visible fields grouped by section
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct FormLayout {
    pub table: EntityType,
    pub record_id: Option<Uuid>,
    pub sections: Vec<FormSection>,
}

impl FormLayout {
    /// All controls in render order, across sections
    pub fn fields(&self) -> impl Iterator<Item = &FieldControl> {
        self.sections.iter().flat_map(|s| s.fields.iter())
    }

    pub fn field(&self, field_name: &str) -> Option<&FieldControl> {
        self.fields().find(|f| f.field_name == field_name)
    }
}

/// Describes the control for `spec`. A select without options has nothing to
/// choose from and renders to `None`.
pub fn render_field(spec: &FieldSpec, current: Option<&Value>) -> Option<FieldControl> {
    let control = match spec.kind {
        FieldKind::Text => Control::TextInput,
        FieldKind::Textarea => Control::TextArea,
        FieldKind::Number => Control::NumberInput,
        FieldKind::Date => Control::DateInput,
        FieldKind::Boolean => Control::Toggle,
        FieldKind::Select if spec.options.is_empty() => return None,
        FieldKind::Select => Control::Select {
            options: spec.options.clone(),
        },
    };

    Some(FieldControl {
        field_name: spec.field_name.clone(),
        label: spec.label.clone(),
        control,
        required: spec.required,
        placeholder: spec.placeholder.clone(),
        section: spec.section.clone(),
        is_system: spec.is_system,
        value: current.cloned().unwrap_or(Value::Null),
    })
}

/// Writes user input for `spec` into `bag` under the field name.
///
/// `null` (and an empty string for non-text kinds) removes the key. No
/// required-ness or cross-field checks happen here.
pub fn apply_input(
    bag: &mut Map<String, Value>,
    spec: &FieldSpec,
    raw: Value,
) -> Result<(), ServiceError> {
    match CustomValue::coerce(spec.kind, &spec.options, &raw) {
        Ok(Some(value)) => {
            bag.insert(spec.field_name.clone(), value.to_json());
            Ok(())
        }
        Ok(None) => {
            bag.remove(&spec.field_name);
            Ok(())
        }
        Err(reason) => Err(ServiceError::ValidationError(format!(
            "field '{}': {}",
            spec.field_name, reason
        ))),
    }
}

/// Lays out every visible spec, in the order given, grouped by section.
///
/// System fields read their value from `fixed` (the entity's own columns),
/// custom fields from `custom_data`.
pub fn render_form(
    table: EntityType,
    record_id: Option<Uuid>,
    specs: &[FieldSpec],
    fixed: &Map<String, Value>,
    custom_data: &Map<String, Value>,
) -> FormLayout {
    let mut sections: Vec<FormSection> = Vec::new();

    for spec in specs.iter().filter(|spec| spec.is_visible) {
        let source = if spec.is_system { fixed } else { custom_data };
        let Some(control) = render_field(spec, source.get(&spec.field_name)) else {
            continue;
        };

        let name = spec
            .section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SECTION);

        match sections.iter_mut().find(|s| s.name == name) {
            Some(section) => section.fields.push(control),
            None => sections.push(FormSection {
                name: name.to_string(),
                fields: vec![control],
            }),
        }
    }

    FormLayout {
        table,
        record_id,
        sections,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rstest::rstest;
    use serde_json::json;

    fn spec(name: &str, kind: FieldKind) -> FieldSpec {
        FieldSpec {
            field_name: name.to_string(),
            label: name.to_string(),
            kind,
            options: Vec::new(),
            required: false,
            placeholder: None,
            section: None,
            is_system: false,
            is_visible: true,
        }
    }

    #[rstest]
    #[case(FieldKind::Text, Control::TextInput)]
    #[case(FieldKind::Textarea, Control::TextArea)]
    #[case(FieldKind::Number, Control::NumberInput)]
    #[case(FieldKind::Date, Control::DateInput)]
    #[case(FieldKind::Boolean, Control::Toggle)]
    fn kinds_map_to_controls(#[case] kind: FieldKind, #[case] expected: Control) {
        let control = render_field(&spec("f", kind), None).unwrap();
        assert_eq!(control.control, expected);
        assert_eq!(control.value, Value::Null);
    }

    #[test]
    fn select_without_options_renders_nothing() {
        assert!(render_field(&spec("tier", FieldKind::Select), None).is_none());

        let mut with_options = spec("tier", FieldKind::Select);
        with_options.options = vec!["Basic".into(), "Extended".into()];
        let control = render_field(&with_options, Some(&json!("Basic"))).unwrap();
        assert_matches!(control.control, Control::Select { ref options } if options.len() == 2);
        assert_eq!(control.value, json!("Basic"));
    }

    #[test]
    fn controls_serialize_with_type_tag() {
        let value = serde_json::to_value(Control::Select {
            options: vec!["A".into()],
        })
        .unwrap();
        assert_eq!(value, json!({"type": "select", "options": ["A"]}));
        assert_eq!(
            serde_json::to_value(Control::TextArea).unwrap(),
            json!({"type": "text_area"})
        );
    }

    #[test]
    fn apply_input_writes_and_clears() {
        let mut bag = Map::new();
        let serial = spec("serial_number", FieldKind::Text);
        let battery = spec("battery_health", FieldKind::Number);

        apply_input(&mut bag, &serial, json!("SN12345")).unwrap();
        apply_input(&mut bag, &battery, json!("88")).unwrap();
        assert_eq!(
            Value::Object(bag.clone()),
            json!({"serial_number": "SN12345", "battery_health": 88})
        );

        apply_input(&mut bag, &serial, Value::Null).unwrap();
        assert!(!bag.contains_key("serial_number"));

        assert_matches!(
            apply_input(&mut bag, &battery, json!("high")),
            Err(ServiceError::ValidationError(_))
        );
        assert_eq!(bag.get("battery_health"), Some(&json!(88)));
    }

    #[test]
    fn form_groups_visible_fields_by_first_seen_section() {
        let mut brand = spec("brand", FieldKind::Text);
        brand.is_system = true;
        brand.section = Some("Device".into());
        let mut price = spec("price", FieldKind::Number);
        price.is_system = true;
        price.section = Some("Pricing".into());
        let mut serial = spec("serial_number", FieldKind::Text);
        serial.section = Some("Device".into());
        let mut hidden = spec("internal_note", FieldKind::Textarea);
        hidden.is_visible = false;
        let loose = spec("unlocked", FieldKind::Boolean);
        let empty_select = spec("tier", FieldKind::Select);

        let fixed = json!({"brand": "Apple", "price": "499.00", "serial_number": "ignored"});
        let custom = json!({"serial_number": "SN1", "brand": "ignored", "internal_note": "x"});

        let form = render_form(
            EntityType::Inventory,
            None,
            &[brand, price, serial, hidden, loose, empty_select],
            fixed.as_object().unwrap(),
            custom.as_object().unwrap(),
        );

        let names: Vec<&str> = form.sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Device", "Pricing", "General"]);
        let order: Vec<&str> = form.fields().map(|f| f.field_name.as_str()).collect();
        assert_eq!(order, vec!["brand", "serial_number", "price", "unlocked"]);

        assert_eq!(form.field("brand").unwrap().value, json!("Apple"));
        assert_eq!(form.field("serial_number").unwrap().value, json!("SN1"));
        assert!(form.field("internal_note").is_none());
    }
}
