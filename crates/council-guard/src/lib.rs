//! # council-guard
//!
//! JSON-RPC 2.0 authorization proxy between an agent client and a spawned
//! tool server.
//!
//! The proxy terminates the client side of a newline-delimited JSON-RPC
//! stream, screens every `tools/call` request against a role's permission
//! set (aliases resolved first), and forwards everything else untouched.
//! Denied requests are answered in place with a `-32001` error response
//! and never reach the tool server. Lines that are not valid JSON pass
//! through verbatim: transport fidelity takes precedence over strict
//! validation.
//!
//! Two independent pumps move lines concurrently, client → server and
//! server → client; ordering is exact within a direction and unspecified
//! across directions. A termination signal stops the tool server and
//! exits within a bounded grace period.

pub mod authorizer;
pub mod error;
pub mod proxy;

pub use authorizer::{Authorizer, Disposition, PERMISSION_DENIED_CODE};
pub use error::GuardError;
pub use proxy::ProxySession;
