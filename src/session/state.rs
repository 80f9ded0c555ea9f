use crate::api::Question;

/// Where an in-progress session stands for the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerPhase {
    /// Question shown, no recording yet
    AwaitingRecording,
    /// Input acquired, frames accumulating
    Recording,
    /// Buffer finalized, payload held for submission (or retry)
    Captured,
    /// Upload in flight
    Submitting,
    /// Answer accepted but the next question fetch failed; the cursor sits
    /// between questions until a retry succeeds
    AwaitingNext,
    /// Every answer is in but backend finalization failed; only `finish`
    /// can move the session forward
    Completing,
}

/// Session lifecycle as one tagged value.
///
/// A single value instead of independent flags, so the recording and
/// submitting states cannot fall out of sync with the question cursor.
#[derive(Debug, Clone)]
pub enum SessionPhase {
    /// Plan collected, nothing created on the backend yet
    Configuring,
    /// Exactly one question is current
    InProgress {
        /// 1-based ordinal of the current question
        index: u32,
        question: Question,
        answer: AnswerPhase,
    },
    /// Terminal; the session cannot be reopened
    Completed,
}

impl SessionPhase {
    /// Short name for error messages and logging.
    pub fn name(&self) -> &'static str {
        match self {
            SessionPhase::Configuring => "configuring",
            SessionPhase::InProgress { answer, .. } => match answer {
                AnswerPhase::AwaitingRecording => "awaiting recording",
                AnswerPhase::Recording => "recording",
                AnswerPhase::Captured => "captured",
                AnswerPhase::Submitting => "submitting",
                AnswerPhase::AwaitingNext => "awaiting the next question",
                AnswerPhase::Completing => "completing",
            },
            SessionPhase::Completed => "completed",
        }
    }

    pub fn current_question(&self) -> Option<&Question> {
        match self {
            SessionPhase::InProgress { question, .. } => Some(question),
            _ => None,
        }
    }

    pub fn current_index(&self) -> Option<u32> {
        match self {
            SessionPhase::InProgress { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, SessionPhase::Completed)
    }
}
