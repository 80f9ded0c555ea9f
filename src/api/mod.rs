//! Interview backend consumption layer
//!
//! This module wraps the REST backend behind the `InterviewApi` trait:
//! - POST /api/interviews - create a session
//! - POST /api/interviews/:id/start - mark it started
//! - GET  /api/interviews/:id/next-question - next question (410 = exhausted)
//! - POST /api/interviews/questions/:id/answer/audio - upload an answer
//! - POST /api/interviews/:id/complete, /:id/time - finalize
//! - GET  /api/interviews/:id/questions - summary with feedback and scores
//! - resume / company / position lookups for configuration

mod client;
mod error;
mod types;

pub use client::{HttpInterviewApi, InterviewApi};
pub use error::ApiError;
pub use types::{
    AnswerReview, Company, CreateInterviewRequest, Interview, InterviewMode, InterviewType,
    Position, Question, QuestionReview, Resume, TimeReport,
};
