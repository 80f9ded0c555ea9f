pub mod api;
pub mod audio;
pub mod config;
pub mod session;

pub use api::{
    AnswerReview, ApiError, Company, CreateInterviewRequest, HttpInterviewApi, Interview,
    InterviewApi, InterviewMode, InterviewType, Position, Question, QuestionReview, Resume,
};
pub use audio::{
    AnswerRecorder, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig,
    CaptureSource, CapturedAnswer, FileCaptureBackend,
};
pub use config::Config;
pub use session::{
    AnswerPhase, InterviewSession, SessionError, SessionPhase, SessionPlan, SessionSummary,
    SessionTimer, SubmitOutcome, QUESTION_COUNT_CHOICES,
};
