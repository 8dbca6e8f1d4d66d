//! Structured-output contracts.
//!
//! Every value that crosses the delegated call boundary implements [`Contract`]:
//! it has a JSON schema the model is asked to follow, and a post-call check
//! that re-verifies what the schema alone cannot express (ranges, counts,
//! category coverage, URL syntax).

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

/// Violated contract rule, described for humans.
pub type Violation = String;

/// A value a stage may ask the delegated capability to produce.
pub trait Contract: DeserializeOwned + Serialize + JsonSchema + Send {
    /// Check the value and return it in canonical form.
    ///
    /// Normalisation (e.g. rounding scores) happens only after every range
    /// check has passed.
    fn validate(self) -> Result<Self, Violation>;
}

/// The target shape handed to the capability alongside the prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDescriptor {
    pub name: String,
    pub schema: Value,
}

impl SchemaDescriptor {
    pub fn of<T: JsonSchema>() -> Self {
        let schema = schemars::schema_for!(T);
        Self {
            name: T::schema_name().to_string(),
            schema: serde_json::to_value(&schema).unwrap_or(Value::Null),
        }
    }

    /// Pretty JSON rendering, as embedded into prompts.
    pub fn render(&self) -> String {
        serde_json::to_string_pretty(&self.schema).unwrap_or_else(|_| self.schema.to_string())
    }
}

/// Fails when `value` is empty or only whitespace.
pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), Violation> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

/// Fails unless `raw` parses as an absolute URL with an explicit scheme and host.
pub(crate) fn check_absolute_url(raw: &str) -> Result<(), Violation> {
    let url = Url::parse(raw).map_err(|e| format!("source {raw:?} is not a valid URL: {e}"))?;
    if !url.has_host() {
        return Err(format!("source {raw:?} is not an absolute URL"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_urls() {
        assert!(check_absolute_url("https://www.example.com/press/2025").is_ok());
        assert!(check_absolute_url("http://example.org").is_ok());
    }

    #[test]
    fn rejects_relative_and_schemeless_urls() {
        assert!(check_absolute_url("/press/2025").is_err());
        assert!(check_absolute_url("www.example.com").is_err());
        assert!(check_absolute_url("").is_err());
        assert!(check_absolute_url("mailto:press@example.com").is_err());
    }

    #[test]
    fn whitespace_is_empty() {
        assert!(require_non_empty("title", "  \n").is_err());
        assert!(require_non_empty("title", "Fall drop").is_ok());
    }
}
