//! The command guard: ordered rule scan plus chained-command analysis.

use thiserror::Error;
use tracing::debug;

use crate::decision::CommandDecision;
use crate::rule::{DenyRule, RuleSpec};

/// Errors surfaced while building a guard.
#[derive(Debug, Error)]
pub enum GuardError {
    /// A rule failed validation or compilation.
    #[error("invalid deny rule `{name}`: {reason}")]
    InvalidRule {
        /// Name of the offending rule.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

/// Result alias for guard operations.
pub type GuardResult<T> = Result<T, GuardError>;

/// Shell tokens that chain additional commands onto the first one.
const CHAIN_TOKENS: &[&str] = &[";", "&&", "||", "|", "`", "$("];

/// Verbs considered destructive when they appear in a chained command.
///
/// A verb on its own is not denied (plain `rm file` is legitimate); combined
/// with a chaining token it is treated as an injection attempt.
const CHAINED_VERBS: &[&str] = &[
    "rm", "rmdir", "mkfs", "dd", "shutdown", "reboot", "halt", "poweroff", "sudo", "su",
];

/// Classifies command strings against an ordered deny-rule table.
///
/// The table is immutable once the guard is constructed; checks are pure
/// functions of the command text, safe for unbounded parallel invocation.
#[derive(Debug)]
pub struct CommandGuard {
    rules: Vec<DenyRule>,
}

impl CommandGuard {
    /// Creates a guard with only the supplied rules.
    #[must_use]
    pub fn new(rules: Vec<DenyRule>) -> Self {
        Self { rules }
    }

    /// Creates a guard preloaded with the built-in rule set.
    ///
    /// The defaults cover destructive filesystem patterns, privilege
    /// escalation, fork bombs, raw device writes, and power control.
    #[must_use]
    pub fn with_default_rules() -> Self {
        Self::new(default_rules())
    }

    /// Appends additional rules compiled from configuration specs.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidRule`] for the first spec that fails to
    /// compile; earlier specs in the batch are still appended.
    pub fn extend_from_specs<'a>(
        &mut self,
        specs: impl IntoIterator<Item = &'a RuleSpec>,
    ) -> GuardResult<()> {
        for spec in specs {
            self.rules.push(DenyRule::from_spec(spec)?);
        }
        Ok(())
    }

    /// Returns the names of all loaded rules, in evaluation order.
    #[must_use]
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(DenyRule::name).collect()
    }

    /// Classifies a command string.
    ///
    /// The first matching rule denies; absence of a match allows. After the
    /// rule scan, commands that chain further commands (`;`, `&&`, `|`,
    /// backticks, `$(...)`) onto a destructive verb are denied as well.
    #[must_use]
    pub fn check(&self, command: &str) -> CommandDecision {
        let lowered = command.to_lowercase();

        for rule in &self.rules {
            if rule.matches(command, &lowered) {
                debug!(rule = rule.name(), "command denied by rule");
                return CommandDecision::deny(
                    rule.name(),
                    format!("command matches denied pattern `{}`", rule.name()),
                );
            }
        }

        if let Some(verb) = chained_destructive_verb(&lowered) {
            debug!(verb, "command denied: destructive verb in chained command");
            return CommandDecision::deny(
                "chained-destructive",
                format!("chained command contains destructive verb `{verb}`"),
            );
        }

        CommandDecision::allow()
    }
}

impl Default for CommandGuard {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

/// Returns the destructive verb found in a chained command, if any.
fn chained_destructive_verb(lowered: &str) -> Option<&'static str> {
    if !CHAIN_TOKENS.iter().any(|token| lowered.contains(token)) {
        return None;
    }

    CHAINED_VERBS
        .iter()
        .find(|verb| {
            lowered
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| word == **verb)
        })
        .copied()
}

/// Builds the built-in deny-rule table.
///
/// # Panics
///
/// Panics if a built-in regex fails to compile, which would be a defect in
/// this crate rather than a runtime condition.
#[must_use]
pub fn default_rules() -> Vec<DenyRule> {
    let regex = |name: &str, pattern: &str| {
        DenyRule::regex(name, pattern).expect("built-in rule pattern must compile")
    };

    vec![
        DenyRule::substring("recursive-force-remove", "rm -rf"),
        regex("recursive-remove-root", r"\brm\s+(-[a-z]+\s+)*(/|~)(\s|$)"),
        regex("windows-force-delete", r"\bdel\s+/f\b"),
        regex("disk-format", r"\bformat\s+[a-z]:"),
        regex("mkfs", r"\bmkfs(\.\w+)?\b"),
        regex("sudo", r"\bsudo\b"),
        regex("su-login", r"\bsu\s+-"),
        DenyRule::substring("fork-bomb", ":(){:|:&};:"),
        regex("fork-bomb-variant", r":\(\)\s*\{.*\}\s*;?\s*:"),
        regex("raw-device-write", r">\s*/dev/(sd|hd|vd|nvme)[a-z0-9]*"),
        regex("dd-to-device", r"\bdd\b.*\bof=/dev/"),
        regex("power-control", r"\b(shutdown|reboot|halt|poweroff)\b"),
    ]
}
