// error.rs — Error types for policy loading.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the fallible policy-load path.
///
/// `PolicyStore::load` swallows these into an all-deny policy with a
/// warning; callers that want the cause use `try_load`.
#[derive(Debug, Error)]
pub enum PolicyError {
    /// The policy document could not be read.
    #[error("failed to read policy document at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The policy document is not valid JSON (or has the wrong shape).
    #[error("failed to parse policy document at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
