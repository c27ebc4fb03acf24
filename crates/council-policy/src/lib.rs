//! # council-policy
//!
//! Role → permission and tool-alias mappings for the council governance
//! layer, loaded once from a JSON policy document at startup.
//!
//! The store is fail-closed: a missing or malformed document yields an
//! empty policy that denies every tool, rather than a startup failure
//! that would crash-loop a supervising process. The tables are read-only
//! after construction and safe for concurrent reads.
//!
//! ## Policy document
//!
//! ```json
//! {
//!   "roles": {"claude": {"permissions": ["read_file", "list_files"]}},
//!   "tool_aliases": {"ls": "list_files"},
//!   "default_role": "claude"
//! }
//! ```

pub mod document;
pub mod error;
pub mod store;

pub use document::{PolicyDocument, RoleDef};
pub use error::PolicyError;
pub use store::PolicyStore;
