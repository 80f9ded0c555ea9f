use serde::{Deserialize, Serialize};

use crate::api::{CreateInterviewRequest, InterviewMode, InterviewType};

/// Question counts the product offers at configuration time.
pub const QUESTION_COUNT_CHOICES: [u32; 3] = [5, 10, 15];

/// Difficulty range (1 = basics, 5 = expert).
pub const DIFFICULTY_RANGE: std::ops::RangeInclusive<u8> = 1..=5;

/// Parameters for one interview session, collected before anything is
/// created on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPlan {
    /// Resume backing this session (must already exist on the backend)
    pub resume_id: i64,

    /// Target position
    pub position_id: i64,

    /// Number of questions, one of `QUESTION_COUNT_CHOICES`
    pub question_count: u32,

    /// Difficulty level, 1 to 5
    pub difficulty_level: u8,

    /// Whether the session may be finished while questions remain
    /// unanswered. Explicit policy rather than a side effect of UI wiring.
    pub allow_early_end: bool,

    /// Optional session title; a default is derived when absent
    pub title: Option<String>,
}

impl SessionPlan {
    pub fn new(resume_id: i64, position_id: i64) -> Self {
        Self {
            resume_id,
            position_id,
            question_count: 5,
            difficulty_level: 3,
            allow_early_end: false,
            title: None,
        }
    }

    /// Check the enumerated parameter constraints.
    pub fn validate(&self) -> Result<(), String> {
        if !QUESTION_COUNT_CHOICES.contains(&self.question_count) {
            return Err(format!(
                "question count must be one of {:?}, got {}",
                QUESTION_COUNT_CHOICES, self.question_count
            ));
        }
        if !DIFFICULTY_RANGE.contains(&self.difficulty_level) {
            return Err(format!(
                "difficulty level must be between 1 and 5, got {}",
                self.difficulty_level
            ));
        }
        Ok(())
    }

    pub(crate) fn to_create_request(&self) -> CreateInterviewRequest {
        let title = self.title.clone().unwrap_or_else(|| {
            format!("Mock interview practice (difficulty {})", self.difficulty_level)
        });
        CreateInterviewRequest {
            resume_id: self.resume_id,
            position_id: self.position_id,
            description: format!(
                "Practice session, {} questions at difficulty {}",
                self.question_count, self.difficulty_level
            ),
            title,
            kind: InterviewType::Text,
            mode: InterviewMode::Practice,
            question_count: self.question_count,
            difficulty_level: self.difficulty_level,
            // Rough planning figure the product shows at configuration time.
            expected_duration_minutes: self.question_count * 5,
        }
    }
}
