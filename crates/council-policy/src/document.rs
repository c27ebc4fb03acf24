// document.rs — The serialized policy document.
//
// Every field defaults so partial documents parse: a file containing only
// `{"roles": {...}}` is valid and simply has no aliases or default role.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Root of the policy document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyDocument {
    /// Role name → role definition. Keys are stored lower-cased by convention.
    #[serde(default)]
    pub roles: HashMap<String, RoleDef>,

    /// Alternate tool name → canonical tool name (many-to-one).
    #[serde(default)]
    pub tool_aliases: HashMap<String, String>,

    /// Role to fall back to when a requested role is not defined.
    #[serde(default)]
    pub default_role: Option<String>,
}

/// A role's permitted tool set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoleDef {
    /// Canonical tool names this role may call.
    #[serde(default)]
    pub permissions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_document_parses() {
        let doc: PolicyDocument = serde_json::from_str(
            r#"{
                "roles": {"claude": {"permissions": ["read_file", "list_files"]}},
                "tool_aliases": {"ls": "list_files"},
                "default_role": "claude"
            }"#,
        )
        .unwrap();

        assert_eq!(doc.roles["claude"].permissions.len(), 2);
        assert_eq!(doc.tool_aliases["ls"], "list_files");
        assert_eq!(doc.default_role.as_deref(), Some("claude"));
    }

    #[test]
    fn partial_document_parses_with_defaults() {
        let doc: PolicyDocument =
            serde_json::from_str(r#"{"roles": {"codex": {}}}"#).unwrap();
        assert!(doc.roles["codex"].permissions.is_empty());
        assert!(doc.tool_aliases.is_empty());
        assert!(doc.default_role.is_none());
    }

    #[test]
    fn empty_object_is_a_valid_document() {
        let doc: PolicyDocument = serde_json::from_str("{}").unwrap();
        assert_eq!(doc, PolicyDocument::default());
    }
}
