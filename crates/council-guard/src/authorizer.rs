// authorizer.rs — Per-line screening of the client → server stream.
//
// The Authorizer is the synchronous core of the proxy: one line in, one
// disposition out. It resolves the role's permission set once at startup
// (fail-closed to empty) and holds the policy store for alias resolution.
//
// Screening rules, in order:
// - Not JSON → forward verbatim. Malformed lines must not be dropped.
// - method != "tools/call" → forward.
// - Resolved tool name == "tool_search" → forward unconditionally, so an
//   agent can always discover what it may call.
// - Resolved name not in the permission set (or no name at all) → deny
//   with a -32001 error response carrying the original request id.

use std::collections::HashSet;

use serde_json::{json, Value};

use council_policy::PolicyStore;

/// JSON-RPC error code for an authorization denial.
pub const PERMISSION_DENIED_CODE: i64 = -32001;

/// The discovery tool that is allowed regardless of role permissions.
const ALWAYS_ALLOWED_TOOL: &str = "tool_search";

/// What to do with one inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    /// Forward the line to the tool server unchanged.
    Forward,
    /// Do not forward; emit this serialized error response to the client.
    Deny(String),
}

/// Screens inbound JSON-RPC lines against a role's permission set.
#[derive(Debug, Clone)]
pub struct Authorizer {
    role: String,
    permissions: HashSet<String>,
    policy: PolicyStore,
}

impl Authorizer {
    /// Resolve the role's effective permission set from the policy store.
    ///
    /// An unknown role (after the store's default-role fallback) yields an
    /// empty set, which denies every tool except `tool_search`.
    pub fn new(policy: PolicyStore, role: impl Into<String>) -> Self {
        let role = role.into();
        let permissions = policy.get_permissions(&role);
        if permissions.is_empty() {
            tracing::warn!(
                role = %role,
                "role has no permissions; only tool_search will be allowed"
            );
        }
        Self {
            role,
            permissions,
            policy,
        }
    }

    /// The role this authorizer enforces.
    pub fn role(&self) -> &str {
        &self.role
    }

    /// Screen one inbound line.
    pub fn screen(&self, line: &str) -> Disposition {
        let request: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            // Transport fidelity over validation: pass it through.
            Err(_) => return Disposition::Forward,
        };

        if request.get("method").and_then(Value::as_str) != Some("tools/call") {
            return Disposition::Forward;
        }

        let id = request.get("id").cloned().unwrap_or(Value::Null);
        let Some(name) = request.pointer("/params/name").and_then(Value::as_str) else {
            // A tools/call without a resolvable tool name never reaches
            // the server.
            tracing::warn!(role = %self.role, "denying tools/call with no tool name");
            return Disposition::Deny(self.denial("<unresolved>", "<unresolved>", id));
        };

        let resolved = self.policy.resolve_alias(name);
        if resolved == ALWAYS_ALLOWED_TOOL {
            return Disposition::Forward;
        }
        if self.permissions.contains(resolved) {
            Disposition::Forward
        } else {
            tracing::warn!(
                role = %self.role,
                tool = %name,
                resolved = %resolved,
                "denying unauthorized tool call"
            );
            Disposition::Deny(self.denial(name, resolved, id))
        }
    }

    fn denial(&self, name: &str, resolved: &str, id: Value) -> String {
        json!({
            "jsonrpc": "2.0",
            "error": {
                "code": PERMISSION_DENIED_CODE,
                "message": format!(
                    "Permission Denied: Role '{}' cannot use tool '{}' (resolved: '{}').",
                    self.role, name, resolved
                ),
            },
            "id": id,
        })
        .to_string()
    }
}
