//! Deny rules and their serializable specifications.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::guard::{GuardError, GuardResult};

/// How a rule's pattern is applied to the command text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Case-insensitive substring containment.
    #[default]
    Substring,
    /// Case-insensitive regular expression match.
    Regex,
}

/// Serializable form of a deny rule, as it appears in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rule name reported back in deny decisions.
    pub name: String,
    /// Pattern text, interpreted according to `kind`.
    pub pattern: String,
    /// Pattern interpretation; defaults to substring.
    #[serde(default)]
    pub kind: MatchKind,
}

enum Matcher {
    Substring(String),
    Regex(Regex),
}

/// A compiled deny rule.
pub struct DenyRule {
    name: String,
    matcher: Matcher,
}

impl DenyRule {
    /// Creates a case-insensitive substring rule.
    #[must_use]
    pub fn substring(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            matcher: Matcher::Substring(pattern.into().to_lowercase()),
        }
    }

    /// Creates a case-insensitive regex rule.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidRule`] when the pattern fails to compile.
    pub fn regex(name: impl Into<String>, pattern: &str) -> GuardResult<Self> {
        let name = name.into();
        let compiled =
            Regex::new(&format!("(?i){pattern}")).map_err(|source| GuardError::InvalidRule {
                name: name.clone(),
                reason: source.to_string(),
            })?;
        Ok(Self {
            name,
            matcher: Matcher::Regex(compiled),
        })
    }

    /// Compiles a rule from its serializable specification.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidRule`] when the spec names an empty rule
    /// or carries an uncompilable regex pattern.
    pub fn from_spec(spec: &RuleSpec) -> GuardResult<Self> {
        if spec.name.trim().is_empty() {
            return Err(GuardError::InvalidRule {
                name: spec.name.clone(),
                reason: "rule name cannot be empty".into(),
            });
        }

        match spec.kind {
            MatchKind::Substring => Ok(Self::substring(&spec.name, &spec.pattern)),
            MatchKind::Regex => Self::regex(&spec.name, &spec.pattern),
        }
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tests the rule against a command. `lowered` must be the lowercase
    /// form of `raw`; the guard computes it once per check.
    pub(crate) fn matches(&self, raw: &str, lowered: &str) -> bool {
        match &self.matcher {
            Matcher::Substring(needle) => lowered.contains(needle),
            Matcher::Regex(regex) => regex.is_match(raw),
        }
    }
}

impl std::fmt::Debug for DenyRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.matcher {
            Matcher::Substring(_) => "substring",
            Matcher::Regex(_) => "regex",
        };
        f.debug_struct("DenyRule")
            .field("name", &self.name)
            .field("kind", &kind)
            .finish()
    }
}
