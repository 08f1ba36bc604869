//! Response envelope produced by the dispatch façade.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Normalized outcome of one tool invocation.
///
/// Exactly one result is produced per request. Failures carry a
/// human-readable error message; partial output (for example stdout captured
/// before a timeout) is preserved in the payload rather than discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    success: bool,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    payload: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ToolResult {
    /// Returns a successful result carrying the supplied payload.
    #[must_use]
    pub fn ok(payload: Value) -> Self {
        Self {
            success: true,
            payload,
            error: None,
        }
    }

    /// Returns a failed result with an explanatory message.
    #[must_use]
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            payload: Value::Null,
            error: Some(error.into()),
        }
    }

    /// Returns a failed result that still carries partial output.
    #[must_use]
    pub fn fail_with_payload(error: impl Into<String>, payload: Value) -> Self {
        Self {
            success: false,
            payload,
            error: Some(error.into()),
        }
    }

    /// Returns `true` when the invocation succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Returns the result payload.
    #[must_use]
    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the error message attached to a failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_has_no_error() {
        let result = ToolResult::ok(json!({ "answer": 42 }));
        assert!(result.is_success());
        assert!(result.error().is_none());
        assert_eq!(result.payload()["answer"], 42);
    }

    #[test]
    fn failure_preserves_partial_payload() {
        let result = ToolResult::fail_with_payload("timed out", json!({ "stdout": "partial" }));
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("timed out"));
        assert_eq!(result.payload()["stdout"], "partial");
    }

    #[test]
    fn serialization_skips_empty_fields() {
        let encoded = serde_json::to_string(&ToolResult::ok(Value::Null)).unwrap();
        assert_eq!(encoded, r#"{"success":true}"#);
    }
}
