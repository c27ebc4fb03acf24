// engine.rs — The constitution rule interceptor.
//
// Every agent message passes through `Constitution::check()` before it is
// sent to a model. Rules run in a fixed order and the first violation
// short-circuits the rest:
//
// 1. Voting-phase silence — only `vote` messages pass while VOTING.
// 2. Dangerous commands — blacklist substring match, sudo token overrides.
// 3. Repetition — Jaccard similarity against the last 3 accepted messages.
// 4. Sudo-required actions — certain tools always need a token.
//
// The recent-message history is updated only when a message passes every
// rule, so rejected messages can never poison the repetition check.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::config::ConstitutionConfig;
use crate::error::{Rule, Violation};

/// How many accepted messages the history retains (FIFO, oldest evicted).
const HISTORY_CAP: usize = 10;

/// How many of the most recent history entries the repetition rule compares.
const REPETITION_WINDOW: usize = 3;

/// Messages shorter than this (in characters) skip the repetition check.
const REPETITION_MIN_LEN: usize = 50;

/// Phase of the deliberation, set by the facilitator that drives it.
///
/// There is no transition table — any caller may set any state from any
/// state. The engine conditions rule 1 solely on the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerState {
    #[default]
    Idle,
    Debating,
    Voting,
    Executing,
}

impl std::fmt::Display for SpeakerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SpeakerState::Idle => "idle",
            SpeakerState::Debating => "debating",
            SpeakerState::Voting => "voting",
            SpeakerState::Executing => "executing",
        };
        f.write_str(name)
    }
}

/// A message an agent wants to send to a model.
///
/// Ephemeral — only the content of passing messages is retained, in the
/// bounded history used by the repetition rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// The tool the agent intends to invoke (e.g., "think", "vote").
    pub tool: String,
    /// The message body.
    pub content: String,
}

impl AgentMessage {
    pub fn new(tool: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            content: content.into(),
        }
    }
}

/// The constitution interceptor.
///
/// One instance per active session; internal state (the history buffer)
/// is not locked, so callers sharing an instance across concurrent agents
/// must serialize access externally.
#[derive(Debug, Clone)]
pub struct Constitution {
    config: ConstitutionConfig,
    state: SpeakerState,
    recent: VecDeque<String>,
}

impl Default for Constitution {
    fn default() -> Self {
        Self::new(ConstitutionConfig::default())
    }
}

impl Constitution {
    pub fn new(config: ConstitutionConfig) -> Self {
        Self {
            config,
            state: SpeakerState::Idle,
            recent: VecDeque::with_capacity(HISTORY_CAP),
        }
    }

    /// Set the current speaker state. Unconditional — no transition validation.
    pub fn set_state(&mut self, state: SpeakerState) {
        self.state = state;
    }

    /// The current speaker state.
    pub fn state(&self) -> SpeakerState {
        self.state
    }

    /// Number of accepted messages currently held in the history.
    pub fn recent_len(&self) -> usize {
        self.recent.len()
    }

    /// Check a message against the constitution.
    ///
    /// A non-empty `sudo_token` is a capability flag, not a verified
    /// credential: it unconditionally authorizes dangerous commands and
    /// sudo-gated tools.
    ///
    /// On a full pass the message content is appended to the history and
    /// the history is trimmed to the last 10 entries.
    pub fn check(&mut self, msg: &AgentMessage, sudo_token: Option<&str>) -> Result<(), Violation> {
        if let Err(violation) = self.run_rules(msg, sudo_token) {
            tracing::debug!(
                rule = violation.rule.id(),
                tool = %msg.tool,
                "message rejected by constitution"
            );
            return Err(violation);
        }

        self.recent.push_back(msg.content.clone());
        if self.recent.len() > HISTORY_CAP {
            self.recent.pop_front();
        }
        Ok(())
    }

    fn run_rules(&self, msg: &AgentMessage, sudo_token: Option<&str>) -> Result<(), Violation> {
        let authorized = sudo_token.is_some_and(|token| !token.is_empty());

        self.check_voting_phase(&msg.tool)?;
        self.check_dangerous_commands(&msg.content, authorized)?;
        self.check_repetition(&msg.content)?;
        self.check_sudo_required(&msg.tool, authorized)?;
        Ok(())
    }

    /// Rule 1: only `vote` messages pass during the VOTING phase.
    fn check_voting_phase(&self, tool: &str) -> Result<(), Violation> {
        if self.state == SpeakerState::Voting && tool != "vote" {
            return Err(Violation::new(
                Rule::VotingSilence,
                "Silence in court! Only votes are allowed during VOTING phase.",
            ));
        }
        Ok(())
    }

    /// Rule 2: dangerous command fragments require a sudo token.
    fn check_dangerous_commands(&self, content: &str, authorized: bool) -> Result<(), Violation> {
        if authorized {
            return Ok(());
        }
        let content_lower = content.to_lowercase();
        for cmd in &self.config.dangerous_commands {
            if content_lower.contains(&cmd.to_lowercase()) {
                return Err(Violation::new(
                    Rule::DangerousCommand,
                    format!("Dangerous command '{cmd}' requires sudo_token authorization."),
                ));
            }
        }
        Ok(())
    }

    /// Rule 3: reject content too similar to a recent accepted message.
    fn check_repetition(&self, content: &str) -> Result<(), Violation> {
        // Character count, not bytes: multibyte content must clear the
        // same floor as ASCII.
        if content.chars().count() < REPETITION_MIN_LEN {
            return Ok(());
        }
        for prev in self.recent.iter().rev().take(REPETITION_WINDOW) {
            if jaccard_similarity(content, prev) > self.config.max_repetition_similarity {
                return Err(Violation::new(
                    Rule::Repetition,
                    "Do not repeat yourself. Add new information or conclude.",
                ));
            }
        }
        Ok(())
    }

    /// Rule 4: some tools always need a sudo token.
    fn check_sudo_required(&self, tool: &str, authorized: bool) -> Result<(), Violation> {
        if self.config.sudo_required_actions.contains(tool) && !authorized {
            return Err(Violation::new(
                Rule::SudoRequired,
                format!("Action '{tool}' requires sudo_token authorization."),
            ));
        }
        Ok(())
    }
}

/// Jaccard similarity of two strings over lower-cased, whitespace-tokenized
/// word sets. Identical sets score 1.0, disjoint sets 0.0; an empty side
/// scores 0.0.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    let set_a: HashSet<&str> = a.split_whitespace().collect();
    let set_b: HashSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_message(body: &str) -> String {
        // Pad to clear the 50-char repetition floor.
        format!("{body}; this sentence is padding to reach the repetition floor")
    }

    // ── Rule 1: voting silence ──

    #[test]
    fn voting_phase_blocks_non_vote_tools() {
        let mut constitution = Constitution::default();
        constitution.set_state(SpeakerState::Voting);

        let err = constitution
            .check(&AgentMessage::new("think", "hmm"), None)
            .unwrap_err();
        assert_eq!(err.rule, Rule::VotingSilence);
    }

    #[test]
    fn voting_phase_allows_votes() {
        let mut constitution = Constitution::default();
        constitution.set_state(SpeakerState::Voting);

        assert!(constitution
            .check(&AgentMessage::new("vote", "aye"), None)
            .is_ok());
    }

    #[test]
    fn non_voting_states_allow_any_tool() {
        let mut constitution = Constitution::default();
        for state in [
            SpeakerState::Idle,
            SpeakerState::Debating,
            SpeakerState::Executing,
        ] {
            constitution.set_state(state);
            assert!(constitution
                .check(&AgentMessage::new("think", "fine"), None)
                .is_ok());
        }
    }

    #[test]
    fn set_state_is_unconditional() {
        // No transition table: EXECUTING → VOTING is allowed.
        let mut constitution = Constitution::default();
        constitution.set_state(SpeakerState::Executing);
        constitution.set_state(SpeakerState::Voting);
        assert_eq!(constitution.state(), SpeakerState::Voting);
    }

    // ── Rule 2: dangerous commands ──

    #[test]
    fn dangerous_command_without_sudo_is_rejected() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("shell", "please run rm -rf /tmp/build");

        let err = constitution.check(&msg, None).unwrap_err();
        assert_eq!(err.rule, Rule::DangerousCommand);
        assert!(err.message.contains("rm -rf"));
    }

    #[test]
    fn any_nonempty_sudo_token_authorizes() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("shell", "please run rm -rf /tmp/build");

        assert!(constitution.check(&msg, Some("anything")).is_ok());
    }

    #[test]
    fn empty_sudo_token_does_not_authorize() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("shell", "DROP TABLE users;");

        let err = constitution.check(&msg, Some("")).unwrap_err();
        assert_eq!(err.rule, Rule::DangerousCommand);
    }

    #[test]
    fn dangerous_match_is_case_insensitive() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("shell", "drop table accounts");

        let err = constitution.check(&msg, None).unwrap_err();
        assert_eq!(err.rule, Rule::DangerousCommand);
    }

    // ── Rule 3: repetition ──

    #[test]
    fn identical_long_message_is_repetition() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("think", long_message("we should refactor the parser"));

        constitution.check(&msg, None).unwrap();
        let err = constitution.check(&msg, None).unwrap_err();
        assert_eq!(err.rule, Rule::Repetition);
    }

    #[test]
    fn short_messages_never_trigger_repetition() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("think", "short repeated line");
        assert!(msg.content.len() < 50);

        for _ in 0..5 {
            assert!(constitution.check(&msg, None).is_ok());
        }
    }

    #[test]
    fn repetition_floor_counts_characters_not_bytes() {
        let mut constitution = Constitution::default();
        // 24 characters but 72 bytes: below the floor either way it is
        // measured in characters.
        let msg = AgentMessage::new("think", "各委員は同じ結論を繰り返し述べている点に注意せよ");
        assert!(msg.content.chars().count() < 50);
        assert!(msg.content.len() > 50);

        constitution.check(&msg, None).unwrap();
        assert!(constitution.check(&msg, None).is_ok());
    }

    #[test]
    fn repetition_only_checks_last_three_entries() {
        let mut constitution = Constitution::default();
        let repeated = AgentMessage::new("think", long_message("the original observation"));
        constitution.check(&repeated, None).unwrap();

        // Push three mutually dissimilar messages so the original falls out
        // of the window.
        let fillers = [
            "the scheduler drops idle workers after sixty seconds of queue starvation",
            "compression ratios improved once we switched the codec into streaming mode",
            "benchmark results show latency regressions isolated in cold start paths",
        ];
        for filler in fillers {
            assert!(filler.len() >= 50);
            constitution
                .check(&AgentMessage::new("think", filler), None)
                .unwrap();
        }

        assert!(constitution.check(&repeated, None).is_ok());
    }

    #[test]
    fn rejected_message_leaves_history_untouched() {
        let mut constitution = Constitution::default();
        constitution.set_state(SpeakerState::Voting);
        let msg = AgentMessage::new("think", long_message("this never lands in history"));

        assert!(constitution.check(&msg, None).is_err());
        assert_eq!(constitution.recent_len(), 0);
    }

    // ── Rule 4: sudo-required actions ──

    #[test]
    fn sudo_required_tool_without_token_is_rejected() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("deploy", "ship v1.2.0");

        let err = constitution.check(&msg, None).unwrap_err();
        assert_eq!(err.rule, Rule::SudoRequired);
        assert!(err.message.contains("deploy"));
    }

    #[test]
    fn sudo_required_tool_with_token_passes() {
        let mut constitution = Constitution::default();
        let msg = AgentMessage::new("push_to_main", "release");

        assert!(constitution.check(&msg, Some("token")).is_ok());
    }

    // ── Ordering and history ──

    #[test]
    fn first_violation_wins() {
        // Violates rule 1 (voting) and rule 2 (dangerous) — rule 1 reports.
        let mut constitution = Constitution::default();
        constitution.set_state(SpeakerState::Voting);
        let msg = AgentMessage::new("shell", "rm -rf /");

        let err = constitution.check(&msg, None).unwrap_err();
        assert_eq!(err.rule, Rule::VotingSilence);
    }

    #[test]
    fn history_never_exceeds_ten_entries() {
        let mut constitution = Constitution::default();
        // Short messages skip the repetition rule but still land in history.
        for i in 0..25 {
            let msg = AgentMessage::new("think", format!("note {i}"));
            constitution.check(&msg, None).unwrap();
            assert!(constitution.recent_len() <= 10);
        }
        assert_eq!(constitution.recent_len(), 10);
    }

    // ── Jaccard similarity ──

    #[test]
    fn jaccard_identical_word_sets_is_one() {
        assert_eq!(jaccard_similarity("alpha beta gamma", "gamma beta alpha"), 1.0);
    }

    #[test]
    fn jaccard_disjoint_word_sets_is_zero() {
        assert_eq!(jaccard_similarity("alpha beta", "gamma delta"), 0.0);
    }

    #[test]
    fn jaccard_empty_side_is_zero() {
        assert_eq!(jaccard_similarity("", "alpha"), 0.0);
        assert_eq!(jaccard_similarity("alpha", ""), 0.0);
    }

    #[test]
    fn jaccard_is_case_insensitive() {
        assert_eq!(jaccard_similarity("Alpha BETA", "alpha beta"), 1.0);
    }

    #[test]
    fn jaccard_partial_overlap() {
        // {a, b} vs {b, c}: intersection 1, union 3.
        let similarity = jaccard_similarity("a b", "b c");
        assert!((similarity - 1.0 / 3.0).abs() < 1e-9);
    }
}
