//! Interview session progression
//!
//! This module provides the `InterviewSession` engine that manages:
//! - Session creation and start against the backend
//! - The question cursor (one current question, exhaustion detection)
//! - Answer capture and idempotent submission
//! - Per-question and total timers
//! - Completion and the feedback summary

mod config;
mod session;
mod state;
mod stats;
mod timer;

pub use config::{SessionPlan, DIFFICULTY_RANGE, QUESTION_COUNT_CHOICES};
pub use session::{InterviewSession, SessionError, SubmitOutcome};
pub use state::{AnswerPhase, SessionPhase};
pub use stats::SessionSummary;
pub use timer::SessionTimer;
