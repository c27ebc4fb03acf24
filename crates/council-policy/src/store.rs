// store.rs — Read-only policy store.
//
// Loaded once at startup. `load()` never fails: an absent or malformed
// document degrades to the empty policy, which denies everything until
// the document is fixed. The supervising process is not crash-looped.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::document::PolicyDocument;
use crate::error::PolicyError;

/// Role permissions and tool aliases, read-only after startup.
#[derive(Debug, Clone, Default)]
pub struct PolicyStore {
    document: PolicyDocument,
}

impl PolicyStore {
    /// Wrap an already-parsed document.
    pub fn from_document(document: PolicyDocument) -> Self {
        Self { document }
    }

    /// Load the policy document, degrading to all-deny on any failure.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(
                path = %path.display(),
                "policy document missing; every tool call will be denied"
            );
            return Self::default();
        }
        match Self::try_load(path) {
            Ok(document) => Self { document },
            Err(error) => {
                tracing::warn!(
                    %error,
                    "policy document unreadable; every tool call will be denied"
                );
                Self::default()
            }
        }
    }

    /// The fallible load path, for callers that want the cause.
    pub fn try_load(path: impl AsRef<Path>) -> Result<PolicyDocument, PolicyError> {
        let path = path.as_ref();
        let data = fs::read_to_string(path).map_err(|source| PolicyError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| PolicyError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The effective permission set for a role.
    ///
    /// Role lookup is case-insensitive on the requested name. An unknown
    /// role falls back to the configured default role; if that is also
    /// absent the set is empty (fail-closed).
    pub fn get_permissions(&self, role: &str) -> HashSet<String> {
        let role_def = self
            .document
            .roles
            .get(&role.to_lowercase())
            .or_else(|| {
                self.document
                    .default_role
                    .as_deref()
                    .and_then(|default| self.document.roles.get(default))
            });
        role_def
            .map(|def| def.permissions.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Resolve a tool name through the alias table (identity if no alias).
    pub fn resolve_alias<'a>(&'a self, name: &'a str) -> &'a str {
        self.document
            .tool_aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    /// The configured default role, if any.
    pub fn default_role(&self) -> Option<&str> {
        self.document.default_role.as_deref()
    }
}
