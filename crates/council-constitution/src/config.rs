// config.rs — Constitution configuration.
//
// The defaults mirror the rule set the council ships with: a short
// blacklist of destructive shell/SQL fragments and the deploy-class
// actions that always need a sudo token.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Default ceiling for Jaccard similarity against recent messages.
pub const DEFAULT_MAX_REPETITION_SIMILARITY: f64 = 0.8;

/// Configuration for the [`Constitution`](crate::Constitution) rule set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConstitutionConfig {
    /// Substrings that mark a message as dangerous (matched case-insensitively).
    #[serde(default = "default_dangerous_commands")]
    pub dangerous_commands: HashSet<String>,

    /// Similarity above this threshold counts as repetition (0–1).
    #[serde(default = "default_similarity")]
    pub max_repetition_similarity: f64,

    /// Tools that always require a sudo token.
    #[serde(default = "default_sudo_required_actions")]
    pub sudo_required_actions: HashSet<String>,
}

impl Default for ConstitutionConfig {
    fn default() -> Self {
        Self {
            dangerous_commands: default_dangerous_commands(),
            max_repetition_similarity: DEFAULT_MAX_REPETITION_SIMILARITY,
            sudo_required_actions: default_sudo_required_actions(),
        }
    }
}

fn default_dangerous_commands() -> HashSet<String> {
    ["rm -rf", "dd if=", "mkfs", "DROP TABLE", "DELETE FROM"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_sudo_required_actions() -> HashSet<String> {
    ["deploy", "push_to_main", "delete_branch"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_similarity() -> f64 {
    DEFAULT_MAX_REPETITION_SIMILARITY
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_destructive_commands() {
        let config = ConstitutionConfig::default();
        assert!(config.dangerous_commands.contains("rm -rf"));
        assert!(config.dangerous_commands.contains("DROP TABLE"));
        assert_eq!(config.max_repetition_similarity, 0.8);
        assert!(config.sudo_required_actions.contains("deploy"));
    }

    #[test]
    fn partial_document_fills_defaults() {
        let config: ConstitutionConfig =
            serde_json::from_str(r#"{"max_repetition_similarity": 0.5}"#).unwrap();
        assert_eq!(config.max_repetition_similarity, 0.5);
        assert!(config.dangerous_commands.contains("mkfs"));
    }
}
