use super::error::ApiError;
use super::types::{
    Company, CreateInterviewRequest, Envelope, Interview, Position, Question, QuestionReview,
    Resume, TimeReport,
};
use crate::audio::CapturedAnswer;
use reqwest::multipart::{Form, Part};
use reqwest::{Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info};

/// The interview backend, identified by its logical operations.
///
/// `HttpInterviewApi` is the production implementation; tests script the
/// trait directly to drive the session engine without a network.
#[async_trait::async_trait]
pub trait InterviewApi: Send + Sync {
    async fn create_interview(&self, req: &CreateInterviewRequest) -> Result<Interview, ApiError>;

    async fn start_interview(&self, interview_id: i64) -> Result<(), ApiError>;

    /// Fetch the next question. Returns `ApiError::Exhausted` when the
    /// backend signals that no further questions exist.
    async fn next_question(&self, interview_id: i64) -> Result<Question, ApiError>;

    /// Upload one captured audio answer for a question.
    async fn submit_audio_answer(
        &self,
        question_id: i64,
        answer: &CapturedAnswer,
    ) -> Result<(), ApiError>;

    async fn complete_interview(&self, interview_id: i64) -> Result<(), ApiError>;

    /// Report accumulated total elapsed seconds for a completed session.
    async fn report_time(&self, interview_id: i64, total_seconds: u64) -> Result<(), ApiError>;

    /// Full question + answer + feedback list for the summary view.
    async fn interview_questions(
        &self,
        interview_id: i64,
    ) -> Result<Vec<QuestionReview>, ApiError>;

    async fn my_resume(&self) -> Result<Resume, ApiError>;

    async fn resume_exists(&self) -> Result<bool, ApiError>;

    async fn list_companies(&self) -> Result<Vec<Company>, ApiError>;

    async fn list_positions(&self, company_id: i64) -> Result<Vec<Position>, ApiError>;
}

/// reqwest-backed `InterviewApi` with a bearer credential on every request.
pub struct HttpInterviewApi {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpInterviewApi {
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Ok(Self {
            http,
            base_url,
            token: token.into(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Response, ApiError> {
        debug!("GET {}", path);
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(resp).await
    }

    async fn post_empty(&self, path: &str) -> Result<Response, ApiError> {
        debug!("POST {}", path);
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check(resp).await
    }

    async fn post_json<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Response, ApiError> {
        debug!("POST {}", path);
        let resp = self
            .http
            .post(self.url(path))
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::check(resp).await
    }

    /// Map HTTP status codes onto the client error taxonomy.
    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        match status {
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            StatusCode::GONE => Err(ApiError::Exhausted),
            StatusCode::NOT_FOUND => {
                let path = resp.url().path().to_string();
                Err(ApiError::NotFound(path))
            }
            s if s.is_client_error() => {
                let message = resp
                    .text()
                    .await
                    .ok()
                    .filter(|t| !t.is_empty())
                    .unwrap_or_else(|| s.to_string());
                Err(ApiError::Rejected(message))
            }
            s => Err(ApiError::Server { status: s.as_u16() }),
        }
    }
}

#[async_trait::async_trait]
impl InterviewApi for HttpInterviewApi {
    async fn create_interview(&self, req: &CreateInterviewRequest) -> Result<Interview, ApiError> {
        let resp = self.post_json("/api/interviews", req).await?;
        let envelope: Envelope<Interview> = resp.json().await?;
        info!("created interview {}", envelope.data.id);
        Ok(envelope.data)
    }

    async fn start_interview(&self, interview_id: i64) -> Result<(), ApiError> {
        self.post_empty(&format!("/api/interviews/{interview_id}/start"))
            .await?;
        Ok(())
    }

    async fn next_question(&self, interview_id: i64) -> Result<Question, ApiError> {
        let resp = self
            .get(&format!("/api/interviews/{interview_id}/next-question"))
            .await?;
        let envelope: Envelope<Question> = resp.json().await?;
        Ok(envelope.data)
    }

    async fn submit_audio_answer(
        &self,
        question_id: i64,
        answer: &CapturedAnswer,
    ) -> Result<(), ApiError> {
        let file = Part::bytes(answer.wav_bytes.clone())
            .file_name("answer.wav")
            .mime_str("audio/wav")?;
        let form = Form::new()
            .part("file", file)
            // Stable across retries so the backend can dedupe resubmissions.
            .text("submissionId", answer.submission_id.to_string());

        debug!(
            "POST /api/interviews/questions/{}/answer/audio ({} bytes)",
            question_id,
            answer.wav_bytes.len()
        );
        let resp = self
            .http
            .post(self.url(&format!(
                "/api/interviews/questions/{question_id}/answer/audio"
            )))
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn complete_interview(&self, interview_id: i64) -> Result<(), ApiError> {
        self.post_empty(&format!("/api/interviews/{interview_id}/complete"))
            .await?;
        Ok(())
    }

    async fn report_time(&self, interview_id: i64, total_seconds: u64) -> Result<(), ApiError> {
        let body = TimeReport {
            time_in_seconds: total_seconds,
        };
        self.post_json(&format!("/api/interviews/{interview_id}/time"), &body)
            .await?;
        Ok(())
    }

    async fn interview_questions(
        &self,
        interview_id: i64,
    ) -> Result<Vec<QuestionReview>, ApiError> {
        let resp = self
            .get(&format!("/api/interviews/{interview_id}/questions"))
            .await?;
        let envelope: Envelope<Vec<QuestionReview>> = resp.json().await?;
        Ok(envelope.data)
    }

    async fn my_resume(&self) -> Result<Resume, ApiError> {
        let resp = self.get("/api/resume").await?;
        let envelope: Envelope<Resume> = resp.json().await?;
        Ok(envelope.data)
    }

    async fn resume_exists(&self) -> Result<bool, ApiError> {
        let resp = self.get("/api/resume/exists").await?;
        let envelope: Envelope<bool> = resp.json().await?;
        Ok(envelope.data)
    }

    async fn list_companies(&self) -> Result<Vec<Company>, ApiError> {
        let resp = self.get("/api/companies").await?;
        let envelope: Envelope<Vec<Company>> = resp.json().await?;
        Ok(envelope.data)
    }

    async fn list_positions(&self, company_id: i64) -> Result<Vec<Position>, ApiError> {
        let resp = self
            .get(&format!("/api/companies/{company_id}/positions"))
            .await?;
        let envelope: Envelope<Vec<Position>> = resp.json().await?;
        Ok(envelope.data)
    }
}
