use super::config::SessionPlan;
use super::state::{AnswerPhase, SessionPhase};
use super::stats::SessionSummary;
use super::timer::SessionTimer;
use crate::api::{ApiError, InterviewApi, Question};
use crate::audio::{AnswerRecorder, CaptureBackend, CaptureConfig, CapturedAnswer};
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Errors from driving an interview session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A backend call failed; inspect the inner error for the class
    /// (authentication, rejection, transport).
    #[error("backend call failed: {0}")]
    Api(#[from] ApiError),

    /// The plan violates the enumerated parameter constraints.
    #[error("invalid session plan: {0}")]
    InvalidPlan(String),

    /// The operation is not legal in the current phase.
    #[error("cannot {action} while the session is {phase}")]
    Phase {
        action: &'static str,
        phase: &'static str,
    },

    /// Submission requested without a finalized recording buffer.
    #[error("no captured answer to submit")]
    NothingCaptured,

    /// Audio input could not be acquired or finalized.
    #[error("audio capture failed: {0}")]
    Capture(String),

    /// The plan does not allow finishing with unanswered questions.
    #[error("ending the session early is disabled by the plan")]
    EarlyEndDisabled,
}

/// What a successful submission led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The cursor advanced; a new question is current
    NextQuestion,
    /// That was the last answer; the session is completed
    Completed,
}

/// Drives one mock-interview attempt end to end.
///
/// Lifecycle: `Configuring` → (`begin`) → `InProgress` → `Completed`, with
/// the per-question cycle awaiting-recording → recording → captured →
/// submitting nested inside `InProgress`. Completion fires exactly once,
/// whether reached by answering the full question budget, by the backend's
/// exhaustion signal, or by an explicit early end (when the plan allows it).
pub struct InterviewSession<A: InterviewApi> {
    api: Arc<A>,
    plan: SessionPlan,
    phase: SessionPhase,
    interview_id: Option<i64>,
    /// Whether the backend acknowledged the start call; a retried `begin`
    /// must re-issue it when a transient failure interrupted the lifecycle.
    started: bool,
    recorder: AnswerRecorder,
    /// Finalized payload awaiting submission; retained across failed
    /// submissions so a retry reuses the same bytes and submission id.
    pending: Option<CapturedAnswer>,
    timer: SessionTimer,
    summary: Option<SessionSummary>,
}

impl<A: InterviewApi> InterviewSession<A> {
    pub fn new(
        api: Arc<A>,
        plan: SessionPlan,
        capture_config: CaptureConfig,
    ) -> Result<Self, SessionError> {
        plan.validate().map_err(SessionError::InvalidPlan)?;
        Ok(Self {
            api,
            plan,
            phase: SessionPhase::Configuring,
            interview_id: None,
            started: false,
            recorder: AnswerRecorder::new(capture_config),
            pending: None,
            timer: SessionTimer::new(),
            summary: None,
        })
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn plan(&self) -> &SessionPlan {
        &self.plan
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.phase.current_question()
    }

    /// 1-based ordinal of the current question, if one is current.
    pub fn current_index(&self) -> Option<u32> {
        self.phase.current_index()
    }

    pub fn question_seconds(&self) -> u64 {
        self.timer.question_seconds()
    }

    pub fn total_seconds(&self) -> u64 {
        self.timer.total_seconds()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    pub fn has_captured_answer(&self) -> bool {
        self.pending.is_some()
    }

    /// Available once the session has completed.
    pub fn summary(&self) -> Option<&SessionSummary> {
        self.summary.as_ref()
    }

    /// Create and start the interview on the backend, then fetch the first
    /// question. An immediate exhaustion signal completes the session with
    /// an empty question list.
    pub async fn begin(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, SessionPhase::Configuring) {
            return Err(self.phase_error("begin"));
        }

        // Each lifecycle step is tracked separately so a retried `begin`
        // after a transient failure resumes where it stopped: it never
        // creates a duplicate interview and never fetches questions from a
        // session the backend still considers created-but-not-started.
        let interview_id = match self.interview_id {
            Some(id) => id,
            None => {
                let interview = self
                    .api
                    .create_interview(&self.plan.to_create_request())
                    .await?;
                self.interview_id = Some(interview.id);
                interview.id
            }
        };

        if !self.started {
            self.api.start_interview(interview_id).await?;
            self.started = true;
            info!(
                "interview {interview_id} started: {} questions at difficulty {}",
                self.plan.question_count, self.plan.difficulty_level
            );
        }

        match self.api.next_question(interview_id).await {
            Ok(question) => {
                self.phase = SessionPhase::InProgress {
                    index: 1,
                    question,
                    answer: AnswerPhase::AwaitingRecording,
                };
                self.timer.reset_question();
                Ok(())
            }
            Err(e) if e.is_exhausted() => {
                warn!("interview {interview_id} has no questions");
                self.finalize().await
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Acquire the audio input and start recording the current answer.
    ///
    /// On acquisition failure (e.g. permission denied) the session stays in
    /// awaiting-recording and no timer starts.
    pub async fn start_recording(
        &mut self,
        backend: Box<dyn CaptureBackend>,
    ) -> Result<(), SessionError> {
        match &mut self.phase {
            SessionPhase::InProgress { answer, .. }
                if *answer == AnswerPhase::AwaitingRecording =>
            {
                self.recorder
                    .start(backend)
                    .await
                    .map_err(|e| SessionError::Capture(format!("{e:#}")))?;
                *answer = AnswerPhase::Recording;
                self.timer.reset_question();
                self.timer.start();
                Ok(())
            }
            _ => Err(self.phase_error("start recording")),
        }
    }

    /// Stop recording and hold the finalized payload for submission.
    ///
    /// Stopping when no recording is active is a no-op: no timer side
    /// effects, nothing captured.
    pub async fn stop_recording(&mut self) -> Result<(), SessionError> {
        let SessionPhase::InProgress { answer, .. } = &mut self.phase else {
            return Ok(());
        };
        if *answer != AnswerPhase::Recording {
            return Ok(());
        }

        let captured = self
            .recorder
            .stop()
            .await
            .map_err(|e| SessionError::Capture(format!("{e:#}")))?;
        self.timer.pause();

        match captured {
            Some(payload) => {
                self.pending = Some(payload);
                *answer = AnswerPhase::Captured;
            }
            None => *answer = AnswerPhase::AwaitingRecording,
        }
        Ok(())
    }

    /// Submit the captured answer for the current question.
    ///
    /// On success the cursor advances, or the session completes when the
    /// question budget is spent or the backend signals exhaustion. On
    /// failure the payload is retained so the user can retry.
    pub async fn submit_answer(&mut self) -> Result<SubmitOutcome, SessionError> {
        let (index, question_id) = match &mut self.phase {
            SessionPhase::InProgress {
                index,
                question,
                answer,
            } if *answer == AnswerPhase::Captured => {
                let ids = (*index, question.id);
                *answer = AnswerPhase::Submitting;
                ids
            }
            SessionPhase::InProgress {
                answer: AnswerPhase::Submitting,
                ..
            } => return Err(self.phase_error("submit again")),
            SessionPhase::InProgress {
                answer: AnswerPhase::Completing,
                ..
            } => return Err(self.phase_error("submit an answer")),
            _ => {
                if self.pending.is_none() {
                    return Err(SessionError::NothingCaptured);
                }
                return Err(self.phase_error("submit an answer"));
            }
        };

        let payload = self.pending.as_ref().ok_or(SessionError::NothingCaptured)?;
        if let Err(e) = self.api.submit_audio_answer(question_id, payload).await {
            warn!("answer submission failed for question {question_id}: {e}");
            // Back to captured: the payload stays available for a retry
            // under the same submission id.
            if let SessionPhase::InProgress { answer, .. } = &mut self.phase {
                *answer = AnswerPhase::Captured;
            }
            return Err(e.into());
        }
        self.pending = None;
        info!("answer {index}/{} submitted", self.plan.question_count);

        // Redundant with the backend's exhaustion signal, kept so an
        // off-by-one backend cannot push the cursor past the budget.
        if index >= self.plan.question_count {
            self.finalize().await?;
            return Ok(SubmitOutcome::Completed);
        }
        self.advance().await
    }

    /// Move the cursor to the next question, or complete on exhaustion.
    async fn advance(&mut self) -> Result<SubmitOutcome, SessionError> {
        let interview_id = self.require_interview_id("advance")?;
        match self.api.next_question(interview_id).await {
            Ok(question) => {
                let Some(index) = self.phase.current_index() else {
                    return Err(self.phase_error("advance"));
                };
                self.phase = SessionPhase::InProgress {
                    index: index + 1,
                    question,
                    answer: AnswerPhase::AwaitingRecording,
                };
                self.timer.reset_question();
                Ok(SubmitOutcome::NextQuestion)
            }
            Err(e) if e.is_exhausted() => {
                info!("question cursor exhausted for interview {interview_id}");
                self.finalize().await?;
                Ok(SubmitOutcome::Completed)
            }
            Err(e) => {
                // The answer was accepted; only the fetch failed. Park the
                // cursor between questions so a retry cannot re-record or
                // resubmit the answered question.
                if let SessionPhase::InProgress { answer, .. } = &mut self.phase {
                    *answer = AnswerPhase::AwaitingNext;
                }
                Err(e.into())
            }
        }
    }

    /// Retry moving the cursor after a transient failure left it between
    /// questions (answer accepted, next question never arrived).
    pub async fn fetch_next_question(&mut self) -> Result<SubmitOutcome, SessionError> {
        match &self.phase {
            SessionPhase::InProgress {
                answer: AnswerPhase::AwaitingNext,
                ..
            } => self.advance().await,
            _ => Err(self.phase_error("fetch the next question")),
        }
    }

    /// Finish the session before every question is answered.
    ///
    /// Allowed only when the plan opts in. Any active recording is stopped
    /// and its payload discarded.
    pub async fn end_early(&mut self) -> Result<(), SessionError> {
        if !matches!(self.phase, SessionPhase::InProgress { .. }) {
            return Err(self.phase_error("end early"));
        }
        if !self.plan.allow_early_end {
            return Err(SessionError::EarlyEndDisabled);
        }
        if self.recorder.is_recording() {
            self.stop_recording().await?;
        }
        self.pending = None;
        self.finalize().await
    }

    /// Retry backend finalization after a transient failure interrupted it
    /// (the complete call, the time report, or the summary fetch).
    ///
    /// Calling on an already completed session is a no-op.
    pub async fn finish(&mut self) -> Result<(), SessionError> {
        match &self.phase {
            SessionPhase::InProgress {
                answer: AnswerPhase::Completing,
                ..
            } => self.finalize().await,
            SessionPhase::Completed => Ok(()),
            _ => Err(self.phase_error("finish")),
        }
    }

    /// Complete the interview on the backend, report total time, and fetch
    /// the summary. Idempotent: a second call is a no-op.
    async fn finalize(&mut self) -> Result<(), SessionError> {
        if self.phase.is_completed() {
            return Ok(());
        }
        let interview_id = self.require_interview_id("complete")?;

        // Park the cursor first: if a backend call below fails, the session
        // must sit where `finish` can retry it, not wedged mid-submission.
        if let SessionPhase::InProgress { answer, .. } = &mut self.phase {
            *answer = AnswerPhase::Completing;
        }

        self.timer.pause();
        let total_seconds = self.timer.total_seconds();

        self.api.complete_interview(interview_id).await?;
        self.api.report_time(interview_id, total_seconds).await?;
        let entries = self.api.interview_questions(interview_id).await?;

        let summary = SessionSummary {
            interview_id,
            entries,
            total_seconds,
            completed_at: Utc::now(),
        };
        info!(
            "interview {} completed: {}/{} answered in {}s",
            interview_id,
            summary.answered_count(),
            summary.question_count(),
            total_seconds
        );
        self.summary = Some(summary);
        self.phase = SessionPhase::Completed;
        Ok(())
    }

    fn require_interview_id(&self, action: &'static str) -> Result<i64, SessionError> {
        self.interview_id.ok_or_else(|| SessionError::Phase {
            action,
            phase: self.phase.name(),
        })
    }

    fn phase_error(&self, action: &'static str) -> SessionError {
        SessionError::Phase {
            action,
            phase: self.phase.name(),
        }
    }
}
