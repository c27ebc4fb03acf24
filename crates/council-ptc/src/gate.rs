// gate.rs — The PTC gate.
//
// Check precedence, first match wins:
//
// 1. file_count >= threshold → batch script, regardless of operation.
// 2. lint_fix / format / batch_replace → the dedicated tool.
// 3. rename → the rename script (consistency across references).
// 4. anything else → manual execution is fine.
//
// `enforce()` turns a forcing result into a PtcRequired error in strict
// mode. `bypass()` exists for emergencies only; every bypass is counted
// and its reason retained for audit.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{PtcRequired, UnknownOperation};

/// Default minimum file count that forces batch tooling.
pub const DEFAULT_MIN_FILES_FOR_BATCH: usize = 3;

/// The generic batch-replace command suggested for multi-file edits.
const BATCH_REPLACE_COMMAND: &str = "python scripts/batch_replace.py";

/// The kind of file modification an agent proposes to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    /// Ordinary single-file edit.
    Edit,
    /// Lint autofix run.
    LintFix,
    /// Code formatting run.
    Format,
    /// Symbol or file rename.
    Rename,
    /// Bulk text replacement.
    BatchReplace,
    /// Structural refactor.
    Refactor,
}

impl OperationType {
    fn as_str(&self) -> &'static str {
        match self {
            OperationType::Edit => "edit",
            OperationType::LintFix => "lint_fix",
            OperationType::Format => "format",
            OperationType::Rename => "rename",
            OperationType::BatchReplace => "batch_replace",
            OperationType::Refactor => "refactor",
        }
    }

    /// The automated command for operations that have one.
    fn suggested_command(&self) -> Option<&'static str> {
        match self {
            OperationType::LintFix => Some("ruff check --fix ."),
            OperationType::Format => Some("black . && isort ."),
            OperationType::BatchReplace => Some(BATCH_REPLACE_COMMAND),
            OperationType::Rename => Some("python scripts/batch_rename.py"),
            OperationType::Edit | OperationType::Refactor => None,
        }
    }

    /// Whether this operation always forces PTC regardless of file count.
    fn always_forces_ptc(&self) -> bool {
        matches!(
            self,
            OperationType::LintFix | OperationType::Format | OperationType::BatchReplace
        )
    }
}

impl std::fmt::Display for OperationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationType {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "edit" => Ok(OperationType::Edit),
            "lint_fix" => Ok(OperationType::LintFix),
            "format" => Ok(OperationType::Format),
            "rename" => Ok(OperationType::Rename),
            "batch_replace" => Ok(OperationType::BatchReplace),
            "refactor" => Ok(OperationType::Refactor),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

/// The outcome of a PTC check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PtcCheckResult {
    /// Whether the operation must go through programmatic tooling.
    pub should_use_ptc: bool,
    /// Human-readable explanation of the decision.
    pub reason: String,
    /// The command to run instead of editing manually, when one exists.
    pub suggested_command: Option<String>,
}

/// One recorded bypass of the gate, kept for the process lifetime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BypassRecord {
    pub at: DateTime<Utc>,
    pub reason: String,
}

/// The PTC enforcement gate.
///
/// Stateless apart from the bypass audit trail. One instance per active
/// session; callers sharing an instance across concurrent agents must
/// serialize access externally.
#[derive(Debug, Clone)]
pub struct PtcGate {
    min_files_for_batch: usize,
    strict: bool,
    bypasses: Vec<BypassRecord>,
}

impl Default for PtcGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_FILES_FOR_BATCH, true)
    }
}

impl PtcGate {
    pub fn new(min_files_for_batch: usize, strict: bool) -> Self {
        Self {
            min_files_for_batch,
            strict,
            bypasses: Vec::new(),
        }
    }

    /// Whether strict mode is on (enforce blocks instead of no-opping).
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Check whether a proposed operation should use programmatic tooling.
    ///
    /// `affected_files` is advisory; the decision is driven by `file_count`
    /// and `operation`.
    pub fn check(
        &self,
        file_count: usize,
        operation: OperationType,
        affected_files: Option<&[String]>,
    ) -> PtcCheckResult {
        if let Some(files) = affected_files {
            tracing::trace!(count = file_count, files = ?files, %operation, "ptc check");
        }

        // Rule 1: batch-size threshold, regardless of operation.
        if file_count >= self.min_files_for_batch {
            return PtcCheckResult {
                should_use_ptc: true,
                reason: format!(
                    "{file_count} files affected (>= {}); a batch script is required",
                    self.min_files_for_batch
                ),
                suggested_command: Some(BATCH_REPLACE_COMMAND.to_string()),
            };
        }

        // Rule 2: operations with a dedicated automated tool.
        if operation.always_forces_ptc() {
            return PtcCheckResult {
                should_use_ptc: true,
                reason: format!("{operation} operations must use automated tooling"),
                suggested_command: operation.suggested_command().map(String::from),
            };
        }

        // Rule 3: renames must go through the script for consistency.
        if operation == OperationType::Rename {
            return PtcCheckResult {
                should_use_ptc: true,
                reason: "rename operations must use a script to keep references consistent"
                    .to_string(),
                suggested_command: operation.suggested_command().map(String::from),
            };
        }

        PtcCheckResult {
            should_use_ptc: false,
            reason: format!("single-file {operation} operation; manual execution is fine"),
            suggested_command: None,
        }
    }

    /// Enforce a check result.
    ///
    /// Errors only when the result forces PTC and strict mode is on;
    /// otherwise a no-op.
    pub fn enforce(&self, result: &PtcCheckResult) -> Result<(), PtcRequired> {
        if result.should_use_ptc && self.strict {
            return Err(PtcRequired {
                reason: result.reason.clone(),
                suggested_command: result.suggested_command.clone(),
            });
        }
        Ok(())
    }

    /// Check and enforce in one call.
    pub fn check_and_enforce(
        &self,
        file_count: usize,
        operation: OperationType,
    ) -> Result<PtcCheckResult, PtcRequired> {
        let result = self.check(file_count, operation, None);
        self.enforce(&result)?;
        Ok(result)
    }

    /// Bypass the gate for an emergency. Counted and retained for audit.
    pub fn bypass(&mut self, reason: impl Into<String>) {
        let record = BypassRecord {
            at: Utc::now(),
            reason: reason.into(),
        };
        tracing::warn!(
            count = self.bypasses.len() + 1,
            reason = %record.reason,
            "PTC check bypassed"
        );
        self.bypasses.push(record);
    }

    /// How many times the gate has been bypassed in this process.
    pub fn bypass_count(&self) -> usize {
        self.bypasses.len()
    }

    /// Every bypass recorded so far, oldest first.
    pub fn bypass_log(&self) -> &[BypassRecord] {
        &self.bypasses
    }
}
