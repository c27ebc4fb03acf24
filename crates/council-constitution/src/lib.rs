//! # council-constitution
//!
//! Stateful rule interceptor that validates agent messages before they
//! reach a language model.
//!
//! The [`Constitution`] holds a small set of hard-coded rules conditioned
//! on the current [`SpeakerState`] of the deliberation: voting-phase
//! silence, a dangerous-command blacklist, repetition detection against a
//! bounded recent-message history, and sudo-gated actions. Every rule is
//! checked synchronously; the first violation short-circuits the rest and
//! is returned as a [`Violation`] carrying the rule id and message.
//!
//! ## Quick Example
//!
//! ```rust
//! use council_constitution::{AgentMessage, Constitution, SpeakerState};
//!
//! let mut constitution = Constitution::default();
//! constitution.set_state(SpeakerState::Voting);
//!
//! let msg = AgentMessage::new("think", "still deliberating...");
//! let verdict = constitution.check(&msg, None);
//! assert!(verdict.is_err()); // only votes pass during VOTING
//! ```

pub mod config;
pub mod engine;
pub mod error;

pub use config::ConstitutionConfig;
pub use engine::{jaccard_similarity, AgentMessage, Constitution, SpeakerState};
pub use error::{Rule, Violation};
