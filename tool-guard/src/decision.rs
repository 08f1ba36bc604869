//! Guard decision types.

use serde::{Deserialize, Serialize};

/// Structured verdict for a single command string.
///
/// Computed fresh on every check and never persisted, so repeated checks of
/// the same command always yield the same decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandDecision {
    allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl CommandDecision {
    /// Returns an allow decision.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            allowed: true,
            rule: None,
            reason: None,
        }
    }

    /// Returns a deny decision naming the rule that matched.
    #[must_use]
    pub fn deny(rule: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            rule: Some(rule.into()),
            reason: Some(reason.into()),
        }
    }

    /// Returns `true` when the command may proceed to execution.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    /// Returns the name of the rule that denied the command, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&str> {
        self.rule.as_deref()
    }

    /// Returns the human-readable reason attached to a denial.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}
