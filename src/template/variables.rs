//! Variable bag supplied at render time

use std::borrow::Cow;

use serde_json::{Map, Value};

use super::types::{TemplateError, TemplateResult};

/// Name → value mapping consulted by the rendering passes.
///
/// Values are plain JSON: scalars are rendered through [`stringify`], objects
/// support one level of dotted access and arrays feed `{{#each}}` blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableBag {
    values: Map<String, Value>,
}

/// Result of resolving a name against the bag
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Lookup<'a> {
    /// Key present, possibly with a falsy value
    Found(&'a Value),
    /// Key absent: plain tokens stay literal
    Missing,
}

impl<'a> Lookup<'a> {
    pub fn is_truthy(&self) -> bool {
        match self {
            Lookup::Found(value) => is_truthy(value),
            Lookup::Missing => false,
        }
    }
}

impl VariableBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn lookup(&self, name: &str) -> Lookup<'_> {
        match self.values.get(name) {
            Some(value) => Lookup::Found(value),
            None => Lookup::Missing,
        }
    }

    /// Resolve `name.property`; only non-null objects have properties
    pub fn lookup_property(&self, name: &str, property: &str) -> Lookup<'_> {
        match self.values.get(name) {
            Some(Value::Object(object)) => match object.get(property) {
                Some(value) => Lookup::Found(value),
                None => Lookup::Missing,
            },
            _ => Lookup::Missing,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl From<Map<String, Value>> for VariableBag {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

impl TryFrom<Value> for VariableBag {
    type Error = TemplateError;

    fn try_from(value: Value) -> TemplateResult<Self> {
        match value {
            Value::Object(values) => Ok(Self { values }),
            other => Err(TemplateError::InvalidVariables(format!(
                "Variables must be an object, got {}",
                type_name(&other)
            ))),
        }
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Largest magnitude at which every integer is exactly representable as f64
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// String form of a value as it appears in rendered output.
///
/// Whole floats drop their fraction (`3.0` renders as `3`) and arrays render
/// as their elements joined by commas, nested arrays flattened. `null`
/// renders as an empty string, including inside arrays. Objects keep
/// their compact JSON form.
pub fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s.as_str()),
        Value::Number(n) => Cow::Owned(format_number(n)),
        Value::Bool(b) => Cow::Borrowed(if *b { "true" } else { "false" }),
        Value::Null => Cow::Borrowed(""),
        Value::Array(items) => Cow::Owned(
            items
                .iter()
                .map(stringify)
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Cow::Owned(value.to_string()),
    }
}

fn format_number(n: &serde_json::Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER => {
            (f as i64).to_string()
        }
        _ => n.to_string(),
    }
}

/// `false`, `null`, zero and `""` are falsy; containers are always truthy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
