// error.rs — Error types for the authorization proxy.

use thiserror::Error;

/// Errors that can occur while running a proxy session.
///
/// Authorization denials are not errors at this level — they are answered
/// on the wire as `-32001` responses and the session continues.
#[derive(Debug, Error)]
pub enum GuardError {
    /// No tool-server command was provided.
    #[error("no tool server command provided")]
    EmptyCommand,

    /// The tool-server subprocess could not be spawned.
    #[error("failed to spawn tool server '{command}': {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The spawned subprocess has no stdin pipe.
    #[error("tool server stdin unavailable")]
    MissingStdin,

    /// The spawned subprocess has no stdout pipe.
    #[error("tool server stdout unavailable")]
    MissingStdout,

    /// An I/O operation on one of the proxied streams failed.
    #[error("proxy stream I/O error: {0}")]
    Io(#[from] std::io::Error),
}
