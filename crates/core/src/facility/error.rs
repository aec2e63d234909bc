use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A stored or submitted string that names no known enum variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
        }
    }
}

/// Every field rule an input broke, keyed by field name.
///
/// Only the first violation per field is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<&'static str, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `message` for `field` unless the field already failed.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    /// Records `message` for `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &'static str, message: impl Into<String>) {
        if !ok {
            self.add(field, message);
        }
    }

    /// `Ok(())` when nothing was recorded.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_variant_display() {
        assert_eq!(
            UnknownVariant::new("role", "Admin").to_string(),
            "unknown role: Admin"
        );
    }

    #[test]
    fn test_first_violation_per_field_wins() {
        let mut errors = ValidationErrors::new();
        errors.add("name", "Field is required");
        errors.add("name", "Name must be at least 2 symbols");
        errors.add("city", "City must be at least 3 symbols");

        assert_eq!(errors.len(), 2);
        assert_eq!(errors.get("name"), Some("Field is required"));
    }

    #[test]
    fn test_display_lists_fields_in_order() {
        let mut errors = ValidationErrors::new();
        errors.add("title", "Field is required");
        errors.add("coordX", "Field is required");

        assert_eq!(
            errors.to_string(),
            "coordX: Field is required; title: Field is required"
        );
    }

    #[test]
    fn test_serializes_as_field_map() {
        let mut errors = ValidationErrors::new();
        errors.add("email", "Email must be in the correct email format");

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["email"], "Email must be in the correct email format");
    }
}
