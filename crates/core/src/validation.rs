use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use crate::types::ProductType;

pub const NAME_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

pub const NAME_REQUIRED: &str = "Product name is required";
pub const NAME_TOO_LONG: &str = "Product name cannot exceed 200 characters";
pub const DESCRIPTION_REQUIRED: &str = "Product description is required";
pub const DESCRIPTION_TOO_LONG: &str = "Product description cannot exceed 1000 characters";
pub const TYPE_REQUIRED: &str = "Product type is required";
pub const TYPE_UNKNOWN: &str = "Product type must be one of: Drink, Food";

/// Returns the message describing why `value` is not an acceptable product name.
pub fn name_violation(value: &str) -> Option<&'static str> {
    text_violation(value, NAME_MAX_CHARS, NAME_REQUIRED, NAME_TOO_LONG)
}

/// Returns the message describing why `value` is not an acceptable description.
pub fn description_violation(value: &str) -> Option<&'static str> {
    text_violation(
        value,
        DESCRIPTION_MAX_CHARS,
        DESCRIPTION_REQUIRED,
        DESCRIPTION_TOO_LONG,
    )
}

/// Checks the raw textual product type. `None` and blank text count as missing.
pub fn type_violation(value: Option<&str>) -> Option<&'static str> {
    match value {
        None => Some(TYPE_REQUIRED),
        Some(raw) if raw.trim().is_empty() => Some(TYPE_REQUIRED),
        Some(raw) if raw.parse::<ProductType>().is_err() => Some(TYPE_UNKNOWN),
        Some(_) => None,
    }
}

fn text_violation(
    value: &str,
    max_chars: usize,
    required: &'static str,
    too_long: &'static str,
) -> Option<&'static str> {
    if value.trim().is_empty() {
        Some(required)
    } else if value.chars().count() > max_chars {
        Some(too_long)
    } else {
        None
    }
}

/// Field name to messages, serialized as a plain JSON object.
///
/// Fields keep the order in which they were first reported, both when built
/// locally and when read back from a response body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(IndexMap<String, Vec<String>>);

impl FieldErrors {
    /// Builds an error map holding one message for one field.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::default();
        errors.push(field, message);
        errors
    }

    /// Collects `validator` failures, reporting the fields named in `order`
    /// first and in that order. Any other field follows by name.
    pub fn from_validation(value: ValidationErrors, order: &[&str]) -> Self {
        let mut reported: Vec<_> = value.field_errors().into_iter().collect();
        reported.sort_by_key(|(field, _)| {
            let rank = order.iter().position(|known| **known == **field);
            (rank.unwrap_or(order.len()), field.to_string())
        });

        let mut errors = Self::default();
        for (field, field_errors) in reported {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|message| message.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                errors.push(field.to_string(), message);
            }
        }
        errors
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Returns the first message of the first field that reported one.
    pub fn first_message(&self) -> Option<&str> {
        self.0
            .values()
            .find_map(|messages| messages.first())
            .map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_accepts_exactly_max_chars() {
        let name = "a".repeat(NAME_MAX_CHARS);
        assert_eq!(name_violation(&name), None);

        let too_long = "a".repeat(NAME_MAX_CHARS + 1);
        assert_eq!(name_violation(&too_long), Some(NAME_TOO_LONG));
    }

    #[test]
    fn description_accepts_exactly_max_chars() {
        let description = "d".repeat(DESCRIPTION_MAX_CHARS);
        assert_eq!(description_violation(&description), None);

        let too_long = "d".repeat(DESCRIPTION_MAX_CHARS + 1);
        assert_eq!(description_violation(&too_long), Some(DESCRIPTION_TOO_LONG));
    }

    #[test]
    fn lengths_are_counted_in_characters() {
        let name = "é".repeat(NAME_MAX_CHARS);
        assert!(name.len() > NAME_MAX_CHARS);
        assert_eq!(name_violation(&name), None);
    }

    #[test]
    fn blank_text_is_required() {
        assert_eq!(name_violation(""), Some(NAME_REQUIRED));
        assert_eq!(name_violation("   \t"), Some(NAME_REQUIRED));
        assert_eq!(description_violation("\n"), Some(DESCRIPTION_REQUIRED));
    }

    #[test]
    fn type_rules() {
        assert_eq!(type_violation(None), Some(TYPE_REQUIRED));
        assert_eq!(type_violation(Some("")), Some(TYPE_REQUIRED));
        assert_eq!(type_violation(Some("Furniture")), Some(TYPE_UNKNOWN));
        assert_eq!(type_violation(Some("drink")), Some(TYPE_UNKNOWN));
        assert_eq!(type_violation(Some("Drink")), None);
        assert_eq!(type_violation(Some("Food")), None);
    }

    #[test]
    fn field_errors_serialize_as_object() {
        let mut errors = FieldErrors::single("name", NAME_REQUIRED);
        errors.push("type", TYPE_REQUIRED);

        let value = serde_json::to_value(&errors).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "name": [NAME_REQUIRED],
                "type": [TYPE_REQUIRED],
            })
        );
        assert_eq!(errors.first_message(), Some(NAME_REQUIRED));
    }

    #[test]
    fn first_message_follows_report_order() {
        let mut errors = FieldErrors::single("name", NAME_TOO_LONG);
        errors.push("description", DESCRIPTION_TOO_LONG);
        assert_eq!(errors.first_message(), Some(NAME_TOO_LONG));

        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["name", "description"]);
    }

    #[test]
    fn deserialized_errors_keep_wire_order() {
        let errors: FieldErrors = serde_json::from_str(
            r#"{"type":["third"],"description":["second"],"name":["first"]}"#,
        )
        .expect("deserialize");

        let fields: Vec<&str> = errors.iter().map(|(field, _)| field).collect();
        assert_eq!(fields, vec!["type", "description", "name"]);
        assert_eq!(errors.first_message(), Some("third"));
    }

    #[test]
    fn merge_appends_messages() {
        let mut errors = FieldErrors::single("name", "first");
        errors.merge(FieldErrors::single("name", "second"));
        assert_eq!(
            errors.get("name"),
            Some(&["first".to_string(), "second".to_string()][..])
        );
    }
}
