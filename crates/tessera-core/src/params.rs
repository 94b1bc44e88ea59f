//! Input parameters: the per-object configuration set.
//!
//! [`InputParameters`] is an insertion-ordered map from parameter name to
//! a value. Objects read their configuration from it during setup.
//!
//! Variable references have two forms under the same key: a single name
//! and a list of names. Each key has one slot per form, so an input may
//! carry both (for example an empty single name produced by an expanded
//! expression, next to a populated list). Setting one form never clears
//! the other.

use indexmap::IndexMap;

use crate::error::ParamError;
use crate::value::Real;

/// A single parameter value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Signed integer.
    Int(i64),
    /// Floating-point number.
    Real(Real),
    /// One string, e.g. a single variable name.
    String(String),
    /// Ordered list of strings, e.g. several variable names.
    StringList(Vec<String>),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::StringList(_) => "string list",
        }
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<Real> for ParamValue {
    fn from(v: Real) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        Self::StringList(v)
    }
}

impl From<&[&str]> for ParamValue {
    fn from(v: &[&str]) -> Self {
        Self::StringList(v.iter().map(|s| s.to_string()).collect())
    }
}

/// The two slots held under one key.
#[derive(Clone, Debug, Default, PartialEq)]
struct Slots {
    scalar: Option<ParamValue>,
    list: Option<Vec<String>>,
}

/// Ordered parameter set for one object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InputParameters {
    values: IndexMap<String, Slots>,
}

impl InputParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter.
    ///
    /// A [`ParamValue::StringList`] fills the key's list slot; any other
    /// value fills its scalar slot. Only the slot being written is
    /// replaced.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        let slots = self.values.entry(key.into()).or_default();
        match value.into() {
            ParamValue::StringList(list) => slots.list = Some(list),
            scalar => slots.scalar = Some(scalar),
        }
        self
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Whether either form of the parameter is set.
    pub fn is_param_valid(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The single-string form of a parameter.
    ///
    /// Returns `None` when no string is held in the scalar slot. An empty
    /// string is returned as-is.
    pub fn get_single_name(&self, key: &str) -> Option<&str> {
        match self.values.get(key).and_then(|s| s.scalar.as_ref()) {
            Some(ParamValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// The list form of a parameter, empty when not set.
    pub fn get_name_list(&self, key: &str) -> &[String] {
        self.values
            .get(key)
            .and_then(|s| s.list.as_deref())
            .unwrap_or(&[])
    }

    /// Names given under `key`: a non-empty single name, else the list.
    pub fn names(&self, key: &str) -> Vec<&str> {
        match self.get_single_name(key) {
            Some(name) if !name.is_empty() => vec![name],
            _ => self.get_name_list(key).iter().map(String::as_str).collect(),
        }
    }

    /// Typed integer access.
    pub fn get_int(&self, key: &str) -> Result<i64, ParamError> {
        match self.require(key)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(Self::wrong_type(key, "int", other)),
        }
    }

    /// Typed real access. Integer values are widened.
    pub fn get_real(&self, key: &str) -> Result<Real, ParamError> {
        match self.require(key)? {
            ParamValue::Real(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as Real),
            other => Err(Self::wrong_type(key, "real", other)),
        }
    }

    fn require(&self, key: &str) -> Result<&ParamValue, ParamError> {
        let slots = self.values.get(key).ok_or_else(|| ParamError::Missing {
            key: key.to_string(),
        })?;
        slots.scalar.as_ref().ok_or_else(|| ParamError::WrongType {
            key: key.to_string(),
            expected: "scalar",
            found: "string list",
        })
    }

    fn wrong_type(key: &str, expected: &'static str, found: &ParamValue) -> ParamError {
        ParamError::WrongType {
            key: key.to_string(),
            expected,
            found: found.type_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_live_in_separate_slots() {
        let params = InputParameters::new()
            .with("variable", "u")
            .with("coupled", vec!["v".to_string(), "w".to_string()]);
        assert_eq!(params.get_single_name("variable"), Some("u"));
        assert!(params.get_name_list("variable").is_empty());
        assert_eq!(params.get_single_name("coupled"), None);
        assert_eq!(params.get_name_list("coupled"), &["v", "w"]);
        assert_eq!(params.get_single_name("missing"), None);
        assert!(!params.is_param_valid("missing"));
    }

    #[test]
    fn both_forms_coexist_under_one_key() {
        for params in [
            InputParameters::new()
                .with("variable", "")
                .with("variable", &["temperature"][..]),
            InputParameters::new()
                .with("variable", &["temperature"][..])
                .with("variable", ""),
        ] {
            assert_eq!(params.get_single_name("variable"), Some(""));
            assert_eq!(params.get_name_list("variable"), &["temperature"]);
        }

        let params = InputParameters::new()
            .with("variable", &["a", "b"][..])
            .with("variable", "pressure");
        assert_eq!(params.get_single_name("variable"), Some("pressure"));
        assert_eq!(params.get_name_list("variable"), &["a", "b"]);
    }

    #[test]
    fn names_prefers_non_empty_single_form() {
        let params = InputParameters::new().with("variable", "");
        assert!(params.names("variable").is_empty());

        let params = InputParameters::new().with("variable", &["a", "b"][..]);
        assert_eq!(params.names("variable"), vec!["a", "b"]);

        let params = params.with("variable", "");
        assert_eq!(params.names("variable"), vec!["a", "b"]);

        let params = params.with("variable", "c");
        assert_eq!(params.names("variable"), vec!["c"]);
    }

    #[test]
    fn typed_access_reports_type_errors() {
        let params = InputParameters::new()
            .with("value", 2.5)
            .with("count", 3i64)
            .with("name", "x")
            .with("list", &["a"][..]);
        assert_eq!(params.get_real("value"), Ok(2.5));
        assert_eq!(params.get_real("count"), Ok(3.0));
        assert_eq!(
            params.get_int("value"),
            Err(ParamError::WrongType {
                key: "value".into(),
                expected: "int",
                found: "real",
            })
        );
        assert_eq!(
            params.get_real("name"),
            Err(ParamError::WrongType {
                key: "name".into(),
                expected: "real",
                found: "string",
            })
        );
        assert!(params.get_int("list").is_err());
        assert_eq!(
            params.get_int("nope"),
            Err(ParamError::Missing { key: "nope".into() })
        );
    }

    #[test]
    fn set_replaces_only_the_written_slot() {
        let mut params = InputParameters::new();
        params.set("a", 1i64).set("b", 2i64).set("a", 3i64);
        assert_eq!(params.get_int("a"), Ok(3));
        assert_eq!(params.get_int("b"), Ok(2));

        params.set("a", &["x"][..]);
        assert_eq!(params.get_int("a"), Ok(3));
        assert_eq!(params.get_name_list("a"), &["x"]);
    }
}
