// error.rs — Error types for PTC enforcement.

use thiserror::Error;

/// A manual operation was blocked because programmatic tooling must be used.
///
/// Fatal to the current manual operation; carries the remediation the
/// caller should run instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("PTC required: {reason}")]
pub struct PtcRequired {
    /// Why the operation must go through programmatic tooling.
    pub reason: String,
    /// The command to run instead, when one exists.
    pub suggested_command: Option<String>,
}

impl PtcRequired {
    /// Multi-line operator-facing rendering, including the remediation command.
    pub fn render(&self) -> String {
        let mut lines = vec![
            "PTC enforcement failed".to_string(),
            format!("Reason: {}", self.reason),
        ];
        if let Some(cmd) = &self.suggested_command {
            lines.push(format!("Suggested command: {cmd}"));
        }
        lines.join("\n")
    }
}

/// An operation name did not match any known [`OperationType`](crate::OperationType).
///
/// Unknown names are an error, not a no-op: a typo in a configured
/// operation must surface at startup rather than silently skip enforcement.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown operation type '{0}'")]
pub struct UnknownOperation(pub String);
