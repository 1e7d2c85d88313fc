//! Request model construction
//!
//! [`ModelBuilder::build`] is a pure function of its inputs:
//! - every declared field is checked, in declaration order
//! - every violation is collected; the first one never short-circuits the rest
//! - a model is returned only when no violation was found
//!
//! Nested schemas are a recursive application of the same build over the
//! bracket-scoped part of the input. A nested model is only kept when it
//! holds at least one field, so presence always survives `to_raw_input`.

use std::borrow::Cow;

use im::OrdMap;
use tracing::{debug, warn};

use crate::{
    schema::UnpermittedPolicy, FieldKind, FieldSpec, ModelSchema, RawInput, RawValue, Reason,
    RequestModel, ValidationError, ValidationErrors, Value,
};

/// Builds [`RequestModel`]s from raw input and a [`ModelSchema`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ModelBuilder;

impl ModelBuilder {
    /// Validate `raw` against `schema`.
    ///
    /// # Errors
    ///
    /// Returns the full, ordered list of violations: declared fields first,
    /// then nested models, then unpermitted keys (reject policy only).
    pub fn build(raw: &RawInput, schema: &ModelSchema) -> Result<RequestModel, ValidationErrors> {
        let span = tracing::debug_span!("build_request_model", schema = schema.name());
        let _guard = span.enter();

        let (fields, field_errors) = schema.fields().iter().fold(
            (OrdMap::new(), Vec::new()),
            |(fields, mut errors), spec| match resolve(spec, raw.get(spec.name())) {
                Ok(Some(value)) => (fields.update(spec.name().to_string(), value), errors),
                Ok(None) => (fields, errors),
                Err(reason) => {
                    errors.push(ValidationError::new(spec.name(), reason));
                    (fields, errors)
                }
            },
        );

        let (nested, nested_errors) = schema
            .nested()
            .iter()
            .filter(|nested| raw.has_scope(nested.prefix()))
            .fold((OrdMap::new(), Vec::new()), |(models, mut errors), nested| {
                match Self::build(&raw.scoped(nested.prefix()), nested.schema()) {
                    // a scope holding only dropped keys has nothing to carry
                    Ok(model) if is_vacant(&model) => (models, errors),
                    Ok(model) => (models.update(nested.prefix().to_string(), model), errors),
                    Err(inner) => {
                        errors.extend(inner.prefixed(nested.prefix()));
                        (models, errors)
                    }
                }
            });

        let errors: Vec<ValidationError> = field_errors
            .into_iter()
            .chain(nested_errors)
            .chain(unpermitted(raw, schema))
            .collect();

        match ValidationErrors::from_errors(errors) {
            None => {
                debug!(
                    fields = fields.len(),
                    nested = nested.len(),
                    "request model built"
                );
                Ok(RequestModel::new(fields, nested))
            }
            Some(errors) => {
                debug!(errors = errors.len(), "request rejected");
                Err(errors)
            }
        }
    }
}

fn is_vacant(model: &RequestModel) -> bool {
    model.is_empty() && model.nested_models().next().is_none()
}

/// Value for one field: `Ok(None)` when optional and absent.
fn resolve(spec: &FieldSpec, raw: Option<&RawValue>) -> Result<Option<Value>, Reason> {
    let supplied = raw
        .filter(|value| !value.is_null())
        .map(|value| normalize(spec, value))
        .filter(|value| !(spec.blank_is_absent() && value.is_empty_text()));

    match supplied {
        Some(value) => coerce(spec.kind(), &value).map(Some),
        None => match spec.default() {
            Some(default) => Ok(Some(default.clone())),
            None if spec.is_required() => Err(Reason::Missing),
            None => Ok(None),
        },
    }
}

fn normalize<'a>(spec: &FieldSpec, value: &'a RawValue) -> Cow<'a, RawValue> {
    if spec.trims() {
        value.trimmed()
    } else {
        Cow::Borrowed(value)
    }
}

/// Coerce a raw value to `kind`.
///
/// - String: text only
/// - Integer: integers, base-10 text, floats without a fractional part
/// - Boolean: booleans, `true/false/1/0/yes/no/on/off` text, integers 0 and 1
/// - Enum: text equal to one of the declared values
pub(crate) fn coerce(kind: &FieldKind, raw: &RawValue) -> Result<Value, Reason> {
    match (kind, raw) {
        (FieldKind::String, RawValue::Text(text)) => Ok(Value::String(text.clone())),
        (FieldKind::Integer, RawValue::Integer(number)) => Ok(Value::Integer(*number)),
        (FieldKind::Integer, RawValue::Text(text)) => text
            .trim()
            .parse()
            .map(Value::Integer)
            .map_err(|_| Reason::WrongType),
        (FieldKind::Integer, RawValue::Float(number)) => float_to_integer(*number)
            .map(Value::Integer)
            .ok_or(Reason::WrongType),
        (FieldKind::Boolean, RawValue::Boolean(flag)) => Ok(Value::Boolean(*flag)),
        (FieldKind::Boolean, RawValue::Text(text)) => parse_flag(text)
            .map(Value::Boolean)
            .ok_or(Reason::WrongType),
        (FieldKind::Boolean, RawValue::Integer(0)) => Ok(Value::Boolean(false)),
        (FieldKind::Boolean, RawValue::Integer(1)) => Ok(Value::Boolean(true)),
        (FieldKind::Enum(values), RawValue::Text(text)) => {
            if values.iter().any(|value| value == text) {
                Ok(Value::Enum(text.clone()))
            } else {
                Err(Reason::NotInEnum)
            }
        }
        _ => Err(Reason::WrongType),
    }
}

// 2^63 is exactly representable; i64::MAX is not, so the upper bound is exclusive.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn float_to_integer(number: f64) -> Option<i64> {
    (number.trunc() == number && (-I64_BOUND..I64_BOUND).contains(&number))
        .then_some(number as i64)
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn unpermitted(raw: &RawInput, schema: &ModelSchema) -> Vec<ValidationError> {
    let unknown: Vec<&str> = raw.keys().filter(|key| !schema.permits(key)).collect();
    if unknown.is_empty() {
        return Vec::new();
    }

    match schema.unpermitted() {
        UnpermittedPolicy::Ignore => {
            debug!(count = unknown.len(), "dropping unpermitted keys");
            Vec::new()
        }
        UnpermittedPolicy::Log => {
            unknown
                .iter()
                .for_each(|key| warn!(schema = schema.name(), key = *key, "unpermitted parameter"));
            Vec::new()
        }
        UnpermittedPolicy::Reject => unknown
            .into_iter()
            .map(|key| ValidationError::new(key, Reason::Unpermitted))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// Log sink shared between a test and its subscriber
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn build_logged(
        raw: &RawInput,
        schema: &ModelSchema,
    ) -> (Result<RequestModel, ValidationErrors>, String) {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();
        let result =
            tracing::subscriber::with_default(subscriber, || ModelBuilder::build(raw, schema));
        (result, captured.text())
    }

    fn search_schema() -> ModelSchema {
        ModelSchema::new(
            "book_search",
            [
                FieldSpec::string("term").blank_is_absent().build().unwrap(),
                FieldSpec::enumeration("format", ["paper", "hard", "ebook"])
                    .build()
                    .unwrap(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_blank_term_and_unknown_format() {
        let raw: RawInput = [("term", ""), ("format", "pdf")].into_iter().collect();
        let errors = ModelBuilder::build(&raw, &search_schema()).unwrap_err();
        assert_eq!(errors.into_vec(), vec![ValidationError::not_in_enum("format")]);
    }

    #[test]
    fn test_valid_term_and_format() {
        let raw: RawInput = [("term", "ruby"), ("format", "ebook")].into_iter().collect();
        let model = ModelBuilder::build(&raw, &search_schema()).unwrap();
        assert_eq!(model.string("term").unwrap(), "ruby");
        assert_eq!(model.enumeration("format").unwrap(), "ebook");
        assert_eq!(model.len(), 2);
    }

    #[test]
    fn test_missing_required_title() {
        let schema = ModelSchema::new(
            "book",
            [FieldSpec::string("title").required().build().unwrap()],
        )
        .unwrap();
        let errors = ModelBuilder::build(&RawInput::new(), &schema).unwrap_err();
        assert_eq!(errors.into_vec(), vec![ValidationError::missing("title")]);
    }

    #[test]
    fn test_blank_without_flag_is_a_value() {
        let schema =
            ModelSchema::new("s", [FieldSpec::string("term").build().unwrap()]).unwrap();
        let raw: RawInput = [("term", "")].into_iter().collect();
        let model = ModelBuilder::build(&raw, &schema).unwrap();
        assert_eq!(model.string("term").unwrap(), "");
    }

    #[test]
    fn test_blank_required_field_is_missing() {
        let schema = ModelSchema::new(
            "s",
            [FieldSpec::string("title")
                .required()
                .blank_is_absent()
                .build()
                .unwrap()],
        )
        .unwrap();
        let raw: RawInput = [("title", "")].into_iter().collect();
        let errors = ModelBuilder::build(&raw, &schema).unwrap_err();
        assert!(errors.contains("title", Reason::Missing));
    }

    #[test]
    fn test_trim_then_blank_check() {
        let schema = ModelSchema::new(
            "s",
            [FieldSpec::string("term")
                .trim()
                .blank_is_absent()
                .default("all")
                .build()
                .unwrap()],
        )
        .unwrap();
        let blank: RawInput = [("term", "   ")].into_iter().collect();
        assert_eq!(
            ModelBuilder::build(&blank, &schema).unwrap().string("term").unwrap(),
            "all"
        );
        let padded: RawInput = [("term", "  ruby ")].into_iter().collect();
        assert_eq!(
            ModelBuilder::build(&padded, &schema).unwrap().string("term").unwrap(),
            "ruby"
        );
    }

    #[test]
    fn test_null_is_absent() {
        let schema = ModelSchema::new(
            "s",
            [FieldSpec::integer("page").default(1_i64).build().unwrap()],
        )
        .unwrap();
        let raw = RawInput::new().with("page", RawValue::Null);
        let model = ModelBuilder::build(&raw, &schema).unwrap();
        assert_eq!(model.integer("page").unwrap(), 1);
    }

    #[test]
    fn test_optional_absent_field_is_not_in_model() {
        let model = ModelBuilder::build(&RawInput::new(), &search_schema()).unwrap();
        assert!(model.is_empty());
        assert!(!model.contains("term"));
    }

    #[test]
    fn test_integer_coercion() {
        let kind = FieldKind::Integer;
        assert_eq!(coerce(&kind, &RawValue::Integer(7)), Ok(Value::Integer(7)));
        assert_eq!(coerce(&kind, &RawValue::from(" 42 ")), Ok(Value::Integer(42)));
        assert_eq!(coerce(&kind, &RawValue::from("-3")), Ok(Value::Integer(-3)));
        assert_eq!(coerce(&kind, &RawValue::Float(3.0)), Ok(Value::Integer(3)));
        assert_eq!(coerce(&kind, &RawValue::Float(3.5)), Err(Reason::WrongType));
        assert_eq!(coerce(&kind, &RawValue::Float(1e300)), Err(Reason::WrongType));
        assert_eq!(coerce(&kind, &RawValue::Float(f64::NAN)), Err(Reason::WrongType));
        assert_eq!(coerce(&kind, &RawValue::from("4.0")), Err(Reason::WrongType));
        assert_eq!(coerce(&kind, &RawValue::from("four")), Err(Reason::WrongType));
        assert_eq!(coerce(&kind, &RawValue::Boolean(true)), Err(Reason::WrongType));
    }

    #[test]
    fn test_boolean_coercion() {
        let kind = FieldKind::Boolean;
        for text in ["true", "TRUE", "1", "yes", "On"] {
            assert_eq!(coerce(&kind, &RawValue::from(text)), Ok(Value::Boolean(true)));
        }
        for text in ["false", "0", "no", "OFF"] {
            assert_eq!(coerce(&kind, &RawValue::from(text)), Ok(Value::Boolean(false)));
        }
        assert_eq!(coerce(&kind, &RawValue::Integer(1)), Ok(Value::Boolean(true)));
        assert_eq!(coerce(&kind, &RawValue::Integer(2)), Err(Reason::WrongType));
        assert_eq!(coerce(&kind, &RawValue::from("maybe")), Err(Reason::WrongType));
    }

    #[test]
    fn test_string_and_enum_coercion() {
        assert_eq!(
            coerce(&FieldKind::String, &RawValue::Integer(5)),
            Err(Reason::WrongType)
        );
        let formats = FieldKind::Enum(vec!["paper".to_string(), "ebook".to_string()]);
        assert_eq!(
            coerce(&formats, &RawValue::from("paper")),
            Ok(Value::Enum("paper".to_string()))
        );
        assert_eq!(coerce(&formats, &RawValue::from("Paper")), Err(Reason::NotInEnum));
        assert_eq!(coerce(&formats, &RawValue::Integer(1)), Err(Reason::WrongType));
    }

    #[test]
    fn test_unpermitted_keys_by_policy() {
        let raw: RawInput = [("term", "ruby"), ("admin", "true"), ("book[author]", "x")]
            .into_iter()
            .collect();

        let (ignored, quiet) = build_logged(&raw, &search_schema());
        assert!(!ignored.unwrap().contains("admin"));
        assert!(!quiet.contains("unpermitted parameter"));

        let logged = search_schema().with_unpermitted(UnpermittedPolicy::Log);
        let (model, logs) = build_logged(&raw, &logged);
        assert_eq!(model.unwrap().field_names().collect::<Vec<_>>(), vec!["term"]);
        assert_eq!(logs.matches("unpermitted parameter").count(), 2);
        assert!(logs.contains("WARN"));
        assert!(logs.contains("admin"));
        assert!(logs.contains("book[author]"));

        let strict = search_schema().with_unpermitted(UnpermittedPolicy::Reject);
        let errors = ModelBuilder::build(&raw, &strict).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["admin", "book[author]"]);
        assert!(errors.iter().all(|e| e.reason == Reason::Unpermitted));
    }

    #[test]
    fn test_nested_model_is_built_from_scope() {
        let publisher = ModelSchema::new(
            "publisher_search",
            [FieldSpec::string("name").required().build().unwrap()],
        )
        .unwrap();
        let schema = search_schema().with_nested("publisher", publisher).unwrap();

        let raw = RawInput::from_query("term=ruby&publisher[name]=Pragmatic");
        let model = ModelBuilder::build(&raw, &schema).unwrap();
        assert_eq!(
            model.nested("publisher").unwrap().string("name").unwrap(),
            "Pragmatic"
        );

        let without = ModelBuilder::build(&RawInput::from_query("term=ruby"), &schema).unwrap();
        assert!(without.nested("publisher").is_err());
    }

    #[test]
    fn test_vacant_nested_scope_is_not_kept() {
        let address = ModelSchema::new(
            "address",
            [FieldSpec::string("city").build().unwrap()],
        )
        .unwrap();
        let schema = search_schema().with_nested("addr", address).unwrap();

        let raw = RawInput::from_query("term=a&addr[zip]=1");
        let model = ModelBuilder::build(&raw, &schema).unwrap();
        assert!(model.nested("addr").is_err());
        assert_eq!(ModelBuilder::build(&model.to_raw_input(), &schema), Ok(model));

        let filled = RawInput::from_query("addr[city]=Oslo");
        let filled = ModelBuilder::build(&filled, &schema).unwrap();
        let scopes: Vec<_> = filled.nested_models().map(|(prefix, _)| prefix).collect();
        assert_eq!(scopes, vec!["addr"]);
    }

    #[test]
    fn test_malformed_bracket_keys_rejected_under_reject() {
        let publisher = ModelSchema::new(
            "publisher_search",
            [FieldSpec::string("name").build().unwrap()],
        )
        .unwrap();
        let schema = search_schema()
            .with_nested("publisher", publisher)
            .unwrap()
            .with_unpermitted(UnpermittedPolicy::Reject);

        let raw: RawInput = [
            ("publisher[name]", "Pragmatic"),
            ("publisher[]", "x"),
            ("publisher[oops", "y"),
        ]
        .into_iter()
        .collect();
        let errors = ModelBuilder::build(&raw, &schema).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["publisher[]", "publisher[oops"]);
    }

    #[test]
    fn test_nested_errors_are_collected_with_paths() {
        let publisher = ModelSchema::new(
            "publisher_search",
            [
                FieldSpec::string("name").required().build().unwrap(),
                FieldSpec::integer("founded").build().unwrap(),
            ],
        )
        .unwrap();
        let schema = search_schema().with_nested("publisher", publisher).unwrap();

        let raw = RawInput::from_query("format=pdf&publisher[founded]=long+ago");
        let errors = ModelBuilder::build(&raw, &schema).unwrap_err();
        assert_eq!(
            errors.into_vec(),
            vec![
                ValidationError::not_in_enum("format"),
                ValidationError::missing("publisher[name]"),
                ValidationError::wrong_type("publisher[founded]"),
            ]
        );
    }
}
