//! # council-ptc
//!
//! Pre-action enforcement that redirects batch-style file modifications to
//! programmatic tooling (PTC: programmatic tool calls).
//!
//! Manual edits across many files are error-prone; lint fixes, formatting
//! runs, and renames have dedicated tools that do the whole job in one
//! pass. The [`PtcGate`] checks a proposed operation and, in strict mode,
//! blocks manual execution with a [`PtcRequired`] error that carries the
//! suggested command as remediation.
//!
//! ## Quick Example
//!
//! ```rust
//! use council_ptc::{OperationType, PtcGate};
//!
//! let gate = PtcGate::default();
//! let result = gate.check(5, OperationType::Edit, None);
//! assert!(result.should_use_ptc);
//! assert!(result.suggested_command.is_some());
//! ```

pub mod error;
pub mod gate;

pub use error::{PtcRequired, UnknownOperation};
pub use gate::{BypassRecord, OperationType, PtcCheckResult, PtcGate};
