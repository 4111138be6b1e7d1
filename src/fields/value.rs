use chrono::NaiveDate;
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;

use super::{EntityType, FieldKind, FieldSpec};
use crate::errors::ServiceError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One typed custom_data value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CustomValue {
    Text(String),
    Number(Number),
    /// Serialized as an ISO `YYYY-MM-DD` string
    Date(NaiveDate),
    Boolean(bool),
    /// Kept verbatim: a key with no known field while strict checking is off
    Untyped(Value),
}

impl CustomValue {
    /// Converts raw JSON into the value `kind` expects. `Ok(None)` means the
    /// input clears the field (null, or an empty string for non-text kinds).
    pub fn coerce(kind: FieldKind, options: &[String], raw: &Value) -> Result<Option<Self>, String> {
        if raw.is_null() {
            return Ok(None);
        }

        match kind {
            FieldKind::Text | FieldKind::Textarea => match raw {
                Value::String(s) => Ok(Some(CustomValue::Text(s.clone()))),
                Value::Number(n) => Ok(Some(CustomValue::Text(n.to_string()))),
                Value::Bool(b) => Ok(Some(CustomValue::Text(b.to_string()))),
                _ => Err("expected a string".to_string()),
            },
            FieldKind::Number => match raw {
                Value::Number(n) => Ok(Some(CustomValue::Number(n.clone()))),
                Value::String(s) if s.trim().is_empty() => Ok(None),
                Value::String(s) => parse_number(s.trim())
                    .map(|n| Some(CustomValue::Number(n)))
                    .ok_or_else(|| format!("'{}' is not a number", s)),
                _ => Err("expected a number".to_string()),
            },
            FieldKind::Date => match raw {
                Value::String(s) if s.trim().is_empty() => Ok(None),
                Value::String(s) => parse_date(s.trim())
                    .map(|d| Some(CustomValue::Date(d)))
                    .ok_or_else(|| format!("'{}' is not an ISO date (YYYY-MM-DD)", s)),
                _ => Err("expected an ISO date string".to_string()),
            },
            FieldKind::Boolean => match raw {
                Value::Bool(b) => Ok(Some(CustomValue::Boolean(*b))),
                Value::String(s) if s.eq_ignore_ascii_case("true") => {
                    Ok(Some(CustomValue::Boolean(true)))
                }
                Value::String(s) if s.eq_ignore_ascii_case("false") => {
                    Ok(Some(CustomValue::Boolean(false)))
                }
                _ => Err("expected true or false".to_string()),
            },
            FieldKind::Select => match raw {
                Value::String(s) if s.is_empty() => Ok(None),
                Value::String(s) if options.iter().any(|o| o == s) => {
                    Ok(Some(CustomValue::Text(s.clone())))
                }
                Value::String(s) => Err(format!(
                    "'{}' is not one of the options [{}]",
                    s,
                    options.join(", ")
                )),
                _ => Err("expected one of the option strings".to_string()),
            },
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            CustomValue::Text(s) => Value::String(s.clone()),
            CustomValue::Number(n) => Value::Number(n.clone()),
            CustomValue::Date(d) => Value::String(d.format(DATE_FORMAT).to_string()),
            CustomValue::Boolean(b) => Value::Bool(*b),
            CustomValue::Untyped(v) => v.clone(),
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, CustomValue::Text(s) if s.trim().is_empty())
    }
}

fn parse_number(s: &str) -> Option<Number> {
    if let Ok(i) = s.parse::<i64>() {
        return Some(Number::from(i));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok().or_else(|| {
        // Date pickers sometimes send a full timestamp; keep its calendar date
        s.split_once('T')
            .and_then(|(date, _)| NaiveDate::parse_from_str(date, DATE_FORMAT).ok())
    })
}

/// A validated custom_data bag, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CustomData(BTreeMap<String, CustomValue>);

impl CustomData {
    pub fn get(&self, field_name: &str) -> Option<&CustomValue> {
        self.0.get(field_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// JSON object persisted in the entity's `custom_data` column
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<Map<String, Value>>(),
        )
    }
}

/// Checks a submitted custom_data object against the custom fields of
/// `entity_type`.
///
/// Values are always coerced to their field's kind. With `strict`, keys without
/// a field and missing required fields are rejected too; without it, unknown keys
/// pass through untouched.
pub fn validate_custom_data(
    entity_type: EntityType,
    specs: &[FieldSpec],
    raw: &Value,
    strict: bool,
) -> Result<CustomData, ServiceError> {
    let object = match raw {
        Value::Null => return check_required(entity_type, specs, CustomData::default(), strict),
        Value::Object(object) => object,
        _ => {
            return Err(ServiceError::ValidationError(
                "custom_data must be a JSON object".to_string(),
            ))
        }
    };

    let mut values = BTreeMap::new();
    let mut problems = Vec::new();

    for (key, raw_value) in object {
        match specs.iter().find(|spec| &spec.field_name == key) {
            Some(spec) => match CustomValue::coerce(spec.kind, &spec.options, raw_value) {
                Ok(Some(value)) => {
                    values.insert(key.clone(), value);
                }
                Ok(None) => {}
                Err(reason) => problems.push(format!("custom field '{}': {}", key, reason)),
            },
            None if strict => problems.push(format!(
                "unknown custom field '{}' for {}",
                key, entity_type
            )),
            None => {
                if !raw_value.is_null() {
                    values.insert(key.clone(), CustomValue::Untyped(raw_value.clone()));
                }
            }
        }
    }

    if !problems.is_empty() {
        return Err(ServiceError::ValidationError(problems.join("; ")));
    }

    check_required(entity_type, specs, CustomData(values), strict)
}

fn check_required(
    entity_type: EntityType,
    specs: &[FieldSpec],
    data: CustomData,
    strict: bool,
) -> Result<CustomData, ServiceError> {
    if !strict {
        return Ok(data);
    }

    let missing: Vec<&str> = specs
        .iter()
        .filter(|spec| spec.required && spec.is_visible && !spec.is_system)
        .filter(|spec| data.get(&spec.field_name).map_or(true, CustomValue::is_blank))
        .map(|spec| spec.label.as_str())
        .collect();

    if missing.is_empty() {
        Ok(data)
    } else {
        Err(ServiceError::ValidationError(format!(
            "required custom fields missing for {}: {}",
            entity_type,
            missing.join(", ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    fn spec(name: &str, kind: FieldKind, options: &[&str], required: bool) -> FieldSpec {
        FieldSpec {
            field_name: name.to_string(),
            label: name.replace('_', " "),
            kind,
            options: options.iter().map(|o| o.to_string()).collect(),
            required,
            placeholder: None,
            section: None,
            is_system: false,
            is_visible: true,
        }
    }

    fn phone_specs() -> Vec<FieldSpec> {
        vec![
            spec("serial_number", FieldKind::Text, &[], false),
            spec("battery_health", FieldKind::Number, &[], false),
            spec("purchased_on", FieldKind::Date, &[], false),
            spec("unlocked", FieldKind::Boolean, &[], false),
            spec("warranty_tier", FieldKind::Select, &["Basic", "Extended"], false),
        ]
    }

    #[rstest]
    #[case(FieldKind::Text, json!("SN12345"), json!("SN12345"))]
    #[case(FieldKind::Text, json!(42), json!("42"))]
    #[case(FieldKind::Textarea, json!("line one\nline two"), json!("line one\nline two"))]
    #[case(FieldKind::Number, json!(87), json!(87))]
    #[case(FieldKind::Number, json!("87.5"), json!(87.5))]
    #[case(FieldKind::Number, json!(" 12 "), json!(12))]
    #[case(FieldKind::Date, json!("2024-03-01"), json!("2024-03-01"))]
    #[case(FieldKind::Date, json!("2024-03-01T10:00:00Z"), json!("2024-03-01"))]
    #[case(FieldKind::Boolean, json!(true), json!(true))]
    #[case(FieldKind::Boolean, json!("FALSE"), json!(false))]
    fn values_are_coerced_to_their_kind(
        #[case] kind: FieldKind,
        #[case] raw: Value,
        #[case] expected: Value,
    ) {
        let value = CustomValue::coerce(kind, &[], &raw).unwrap().unwrap();
        assert_eq!(value.to_json(), expected);
    }

    #[rstest]
    #[case(FieldKind::Number, json!("lots"))]
    #[case(FieldKind::Number, json!(true))]
    #[case(FieldKind::Date, json!("03/01/2024"))]
    #[case(FieldKind::Date, json!(20240301))]
    #[case(FieldKind::Boolean, json!("yes"))]
    #[case(FieldKind::Text, json!({"nested": true}))]
    fn mismatched_values_are_rejected(#[case] kind: FieldKind, #[case] raw: Value) {
        assert!(CustomValue::coerce(kind, &[], &raw).is_err());
    }

    #[test]
    fn empty_inputs_clear_non_text_fields() {
        assert_eq!(CustomValue::coerce(FieldKind::Number, &[], &json!("")), Ok(None));
        assert_eq!(CustomValue::coerce(FieldKind::Date, &[], &json!("  ")), Ok(None));
        assert_eq!(
            CustomValue::coerce(FieldKind::Select, &["A".into()], &json!("")),
            Ok(None)
        );
        assert_eq!(CustomValue::coerce(FieldKind::Text, &[], &Value::Null), Ok(None));
    }

    #[test]
    fn select_values_must_be_listed_options() {
        let options = vec!["Basic".to_string(), "Extended".to_string()];
        assert_eq!(
            CustomValue::coerce(FieldKind::Select, &options, &json!("Extended"))
                .unwrap()
                .unwrap()
                .to_json(),
            json!("Extended")
        );
        assert!(CustomValue::coerce(FieldKind::Select, &options, &json!("Premium")).is_err());
        assert!(CustomValue::coerce(FieldKind::Select, &options, &json!("extended")).is_err());
    }

    #[test]
    fn known_keys_round_trip_unchanged() {
        let raw = json!({
            "serial_number": "SN12345",
            "battery_health": 91,
            "purchased_on": "2023-11-20",
            "unlocked": true,
            "warranty_tier": "Extended"
        });
        let data = validate_custom_data(EntityType::Inventory, &phone_specs(), &raw, true).unwrap();
        assert_eq!(data.len(), 5);
        assert_eq!(data.to_json(), raw);
    }

    #[test]
    fn null_values_are_dropped_from_the_bag() {
        let raw = json!({"serial_number": null, "unlocked": false});
        let data = validate_custom_data(EntityType::Inventory, &phone_specs(), &raw, true).unwrap();
        assert_eq!(data.to_json(), json!({"unlocked": false}));
    }

    #[test]
    fn unknown_keys_depend_on_strictness() {
        let raw = json!({"colour_code": "X1"});
        assert_matches!(
            validate_custom_data(EntityType::Inventory, &phone_specs(), &raw, true),
            Err(ServiceError::ValidationError(msg)) if msg.contains("colour_code")
        );

        let lenient =
            validate_custom_data(EntityType::Inventory, &phone_specs(), &raw, false).unwrap();
        assert_eq!(lenient.to_json(), raw);
    }

    #[test]
    fn all_problems_are_reported_together() {
        let raw = json!({"battery_health": "full", "warranty_tier": "Gold"});
        let err =
            validate_custom_data(EntityType::Inventory, &phone_specs(), &raw, true).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("battery_health"));
        assert!(msg.contains("warranty_tier"));
    }

    #[test]
    fn required_fields_are_enforced_only_when_strict() {
        let specs = vec![spec("warranty_tier", FieldKind::Select, &["Basic"], true)];

        assert_matches!(
            validate_custom_data(EntityType::Order, &specs, &json!({}), true),
            Err(ServiceError::ValidationError(msg)) if msg.contains("warranty tier")
        );
        assert_matches!(
            validate_custom_data(EntityType::Order, &specs, &Value::Null, true),
            Err(ServiceError::ValidationError(_))
        );
        assert!(validate_custom_data(EntityType::Order, &specs, &json!({}), false).is_ok());

        let text_specs = vec![spec("serial_number", FieldKind::Text, &[], true)];
        assert!(validate_custom_data(
            EntityType::Inventory,
            &text_specs,
            &json!({"serial_number": "   "}),
            true
        )
        .is_err());
    }

    #[test]
    fn hidden_required_fields_are_not_demanded() {
        let mut hidden = spec("serial_number", FieldKind::Text, &[], true);
        hidden.is_visible = false;

        let data =
            validate_custom_data(EntityType::Inventory, &[hidden.clone()], &json!({}), true).unwrap();
        assert!(data.is_empty());

        // a value sent anyway is still checked against the field kind
        let with_value = validate_custom_data(
            EntityType::Inventory,
            &[hidden],
            &json!({"serial_number": "SN1"}),
            true,
        )
        .unwrap();
        assert_eq!(with_value.to_json(), json!({"serial_number": "SN1"}));
    }

    #[test]
    fn non_object_payloads_are_rejected() {
        assert_matches!(
            validate_custom_data(EntityType::Customer, &[], &json!(["a"]), false),
            Err(ServiceError::ValidationError(_))
        );
    }

    proptest! {
        #[test]
        fn any_text_round_trips(s in "\\PC{0,64}") {
            let value = CustomValue::coerce(FieldKind::Text, &[], &Value::String(s.clone())).unwrap().unwrap();
            prop_assert_eq!(value.to_json(), Value::String(s));
        }

        #[test]
        fn any_integer_round_trips(n in any::<i64>()) {
            let value = CustomValue::coerce(FieldKind::Number, &[], &json!(n)).unwrap().unwrap();
            prop_assert_eq!(value.to_json(), json!(n));
            let from_string = CustomValue::coerce(FieldKind::Number, &[], &json!(n.to_string())).unwrap().unwrap();
            prop_assert_eq!(from_string.to_json(), json!(n));
        }

        #[test]
        fn valid_dates_round_trip(y in 1970i32..2100, m in 1u32..=12, d in 1u32..=28) {
            let iso = format!("{:04}-{:02}-{:02}", y, m, d);
            let value = CustomValue::coerce(FieldKind::Date, &[], &json!(iso.clone())).unwrap().unwrap();
            prop_assert_eq!(value.to_json(), json!(iso));
        }
    }
}
