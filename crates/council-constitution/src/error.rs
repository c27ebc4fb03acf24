// error.rs — Violation types for the constitution interceptor.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which constitution rule a message violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Rule {
    /// Non-vote message during the VOTING phase.
    VotingSilence,
    /// Content matched the dangerous-command blacklist without a sudo token.
    DangerousCommand,
    /// Content too similar to a recent message.
    Repetition,
    /// Tool requires a sudo token and none was supplied.
    SudoRequired,
}

impl Rule {
    /// Stable identifier used in logs and violation messages.
    pub fn id(&self) -> &'static str {
        match self {
            Rule::VotingSilence => "VOTING_SILENCE",
            Rule::DangerousCommand => "DANGEROUS_COMMAND",
            Rule::Repetition => "REPETITION",
            Rule::SudoRequired => "SUDO_REQUIRED",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A synchronous rejection of an agent message by the rule interceptor.
///
/// Carries the rule id and a human-readable message only. Remediation is
/// a caller decision, not part of the violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("[VIOLATION:{rule}] {message}")]
pub struct Violation {
    /// The rule that rejected the message.
    pub rule: Rule,
    /// Human-readable explanation of the rejection.
    pub message: String,
}

impl Violation {
    pub fn new(rule: Rule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}
