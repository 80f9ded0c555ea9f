use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::QuestionReview;

/// Outcome of a completed session: every question with its answer,
/// feedback and sub-scores as the backend produced them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Backend id of the completed interview
    pub interview_id: i64,

    /// Questions in order, with answers where one was submitted
    pub entries: Vec<QuestionReview>,

    /// Total elapsed seconds reported to the backend
    pub total_seconds: u64,

    /// When the session completed
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn question_count(&self) -> usize {
        self.entries.len()
    }

    pub fn answered_count(&self) -> usize {
        self.entries.iter().filter(|e| e.answer.is_some()).count()
    }

    /// Answered questions as a percentage of the total, rounded.
    pub fn completion_percent(&self) -> u32 {
        if self.entries.is_empty() {
            return 0;
        }
        let ratio = self.answered_count() as f64 / self.entries.len() as f64;
        (ratio * 100.0).round() as u32
    }
}
