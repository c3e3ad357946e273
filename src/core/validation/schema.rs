//! Declarative form schemas
//!
//! A [`FormSchema`] is an ordered list of [`FieldRule`]s. Each rule names a
//! form field, how its raw string is coerced, which filters run first, and
//! which checks must pass. Evaluation never stops at the first failing field:
//! an [`Validation::Invalid`] result carries every offending field at once.
//!
//! ```rust,ignore
//! let schema = FormSchema::new()
//!     .field(FieldRule::text("customerId", "Please select a customer.")
//!         .filter(filters::trim())
//!         .check(validators::required(), "Please select a customer."));
//!
//! match schema.validate(&input) {
//!     Validation::Valid(fields) => fields.text("customerId"),
//!     Validation::Invalid(errors) => ...,
//! }
//! ```

use super::filters::Filter;
use super::validators::Validator;
use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Number, Value};
use std::collections::HashMap;

/// Raw form submission: field name to submitted string
pub type FormInput = HashMap<String, String>;

/// Why a field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Field absent, wrong shape, or not coercible
    InvalidType,
    /// Field has the right shape but violates a constraint
    ConstraintViolation,
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldFailure {
    pub kind: FailureKind,
    pub message: String,
}

/// Field-level errors, keyed by field name in schema order
///
/// Serializes as `{ "field": ["message", ...] }`, the shape forms render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldErrors(IndexMap<String, Vec<FieldFailure>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: impl Into<String>, failure: FieldFailure) {
        self.0.entry(field.into()).or_default().push(failure);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of offending fields
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn failures(&self, field: &str) -> &[FieldFailure] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn messages(&self, field: &str) -> Vec<&str> {
        self.failures(field)
            .iter()
            .map(|f| f.message.as_str())
            .collect()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (field, failures) in &self.0 {
            let messages: Vec<&str> = failures.iter().map(|f| f.message.as_str()).collect();
            map.serialize_entry(field, &messages)?;
        }
        map.end()
    }
}

/// Normalized values of a form that passed its schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidFields(IndexMap<String, Value>);

impl ValidFields {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn text(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(Value::as_str)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.0.get(field).and_then(Value::as_f64)
    }
}

/// Outcome of evaluating a schema against one submission
#[derive(Debug, Clone, PartialEq)]
pub enum Validation {
    Valid(ValidFields),
    Invalid(FieldErrors),
}

impl Validation {
    pub fn is_valid(&self) -> bool {
        matches!(self, Validation::Valid(_))
    }

    pub fn into_result(self) -> Result<ValidFields, FieldErrors> {
        match self {
            Validation::Valid(fields) => Ok(fields),
            Validation::Invalid(errors) => Err(errors),
        }
    }
}

/// How a raw form string becomes a typed value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coercion {
    Text,
    /// Parsed as a finite number; an empty string coerces to `0`
    Number,
}

/// Declarative rule for one form field
#[derive(Clone)]
pub struct FieldRule {
    name: &'static str,
    coercion: Coercion,
    type_message: &'static str,
    filters: Vec<Filter>,
    checks: Vec<(Validator, &'static str)>,
}

impl FieldRule {
    /// A string field; `type_message` is reported when it is absent
    pub fn text(name: &'static str, type_message: &'static str) -> Self {
        Self::with_coercion(name, Coercion::Text, type_message)
    }

    /// A numeric field; `type_message` is reported when it is absent or
    /// cannot be parsed
    pub fn number(name: &'static str, type_message: &'static str) -> Self {
        Self::with_coercion(name, Coercion::Number, type_message)
    }

    fn with_coercion(name: &'static str, coercion: Coercion, type_message: &'static str) -> Self {
        Self {
            name,
            coercion,
            type_message,
            filters: Vec::new(),
            checks: Vec::new(),
        }
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn check(mut self, validator: Validator, message: &'static str) -> Self {
        self.checks.push((validator, message));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn type_failure(&self) -> FieldFailure {
        FieldFailure {
            kind: FailureKind::InvalidType,
            message: self.type_message.to_string(),
        }
    }

    fn evaluate(&self, raw: Option<&str>) -> Result<Value, FieldFailure> {
        let raw = raw.ok_or_else(|| self.type_failure())?;
        let filtered = self
            .filters
            .iter()
            .fold(raw.to_string(), |value, filter| filter(self.name, value));

        let value = match self.coercion {
            Coercion::Text => Value::String(filtered),
            Coercion::Number => {
                let parsed = if filtered.is_empty() {
                    Some(0.0)
                } else {
                    filtered.parse::<f64>().ok()
                };
                parsed
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| self.type_failure())?
            }
        };

        for (check, message) in &self.checks {
            if let Err(kind) = check(self.name, &value) {
                return Err(FieldFailure {
                    kind,
                    message: message.to_string(),
                });
            }
        }

        Ok(value)
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("name", &self.name)
            .field("coercion", &self.coercion)
            .field("checks", &self.checks.len())
            .finish()
    }
}

/// Ordered collection of field rules
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: Vec<FieldRule>,
}

impl FormSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Evaluate every rule; fields not named by the schema are ignored
    pub fn validate(&self, input: &FormInput) -> Validation {
        let mut valid = IndexMap::new();
        let mut errors = FieldErrors::new();

        for rule in &self.rules {
            match rule.evaluate(input.get(rule.name).map(String::as_str)) {
                Ok(value) => {
                    valid.insert(rule.name.to_string(), value);
                }
                Err(failure) => errors.push(rule.name, failure),
            }
        }

        if errors.is_empty() {
            Validation::Valid(ValidFields(valid))
        } else {
            Validation::Invalid(errors)
        }
    }
}
