//! Validation failures returned as data
//!
//! A build either yields a model or a non-empty [`ValidationErrors`]; callers
//! translate the latter into a user-facing response (HTTP 422, CLI exit 1).

use itertools::Itertools;
use serde::Serialize;
use strum::Display;
use thiserror::Error;

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Reason {
    /// Required field absent and no default declared
    Missing,
    /// Raw value cannot be coerced to the field's kind
    WrongType,
    /// Text outside the enum's declared values
    NotInEnum,
    /// Key not declared by the schema (reject policy only)
    Unpermitted,
}

/// One field-level violation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: Reason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: Reason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    pub fn missing(field: impl Into<String>) -> Self {
        Self::new(field, Reason::Missing)
    }

    pub fn wrong_type(field: impl Into<String>) -> Self {
        Self::new(field, Reason::WrongType)
    }

    pub fn not_in_enum(field: impl Into<String>) -> Self {
        Self::new(field, Reason::NotInEnum)
    }
}

/// Every violation found in one build, in declaration order.
///
/// Never empty: construction goes through [`ValidationErrors::from_errors`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    /// Wrap a list of errors; `None` when the list is empty.
    pub fn from_errors(errors: Vec<ValidationError>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    /// Combine several error lists, keeping their order.
    pub fn combine(lists: impl IntoIterator<Item = Self>) -> Option<Self> {
        Self::from_errors(lists.into_iter().flat_map(|list| list.0).collect())
    }

    /// Rewrite field paths as `parent[field]` for errors from a nested model.
    #[must_use]
    pub fn prefixed(self, parent: &str) -> Self {
        Self(
            self.0
                .into_iter()
                .map(|error| ValidationError {
                    field: nest_path(parent, &error.field),
                    reason: error.reason,
                })
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidationError> {
        self.0.iter()
    }

    /// Whether a violation with this field and reason was reported
    pub fn contains(&self, field: &str, reason: Reason) -> bool {
        self.0
            .iter()
            .any(|error| error.field == field && error.reason == reason)
    }

    pub fn into_vec(self) -> Vec<ValidationError> {
        self.0
    }
}

/// `publisher` + `name` → `publisher[name]`; `publisher` + `address[city]` →
/// `publisher[address][city]`
pub(crate) fn nest_path(parent: &str, field: &str) -> String {
    match field.find('[') {
        Some(open) => format!("{parent}[{}]{}", &field[..open], &field[open..]),
        None => format!("{parent}[{field}]"),
    }
}

impl std::fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationErrors {
    type Item = &'a ValidationError;
    type IntoIter = std::slice::Iter<'a, ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_errors_rejects_empty() {
        assert!(ValidationErrors::from_errors(Vec::new()).is_none());
        assert!(ValidationErrors::from_errors(vec![ValidationError::missing("title")]).is_some());
    }

    #[test]
    fn test_display_joins_errors() {
        let errors = ValidationErrors::from_errors(vec![
            ValidationError::missing("title"),
            ValidationError::not_in_enum("format"),
        ])
        .unwrap();
        assert_eq!(errors.to_string(), "title: missing; format: not_in_enum");
    }

    #[test]
    fn test_prefixed_builds_bracket_paths() {
        let errors = ValidationErrors::from_errors(vec![
            ValidationError::missing("name"),
            ValidationError::wrong_type("address[zip]"),
        ])
        .unwrap()
        .prefixed("publisher");
        assert!(errors.contains("publisher[name]", Reason::Missing));
        assert!(errors.contains("publisher[address][zip]", Reason::WrongType));
    }

    #[test]
    fn test_combine_keeps_order() {
        let first = ValidationErrors::from_errors(vec![ValidationError::missing("a")]).unwrap();
        let second =
            ValidationErrors::from_errors(vec![ValidationError::wrong_type("b")]).unwrap();
        let combined = ValidationErrors::combine([first, second]).unwrap();
        let fields: Vec<_> = combined.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "b"]);
    }

    #[test]
    fn test_serializes_as_list() {
        let errors =
            ValidationErrors::from_errors(vec![ValidationError::not_in_enum("format")]).unwrap();
        assert_eq!(
            serde_json::to_string(&errors).unwrap(),
            r#"[{"field":"format","reason":"not_in_enum"}]"#
        );
    }
}
