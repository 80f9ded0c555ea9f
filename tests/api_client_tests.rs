// Integration tests for the HTTP interview client, run against an
// in-process axum server that mimics the real backend: enveloped JSON
// bodies, bearer auth, 410 for an exhausted question cursor, and a
// multipart audio upload endpoint.

use anyhow::Result;
use axum::extract::{Multipart, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use interv_practice::api::{CreateInterviewRequest, HttpInterviewApi, InterviewApi};
use interv_practice::audio::CapturedAnswer;
use interv_practice::{InterviewMode, InterviewType};
use serde_json::json;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

const TOKEN: &str = "test-token";

#[derive(Debug, Clone)]
struct Upload {
    question_id: i64,
    file_name: String,
    bytes: usize,
    submission_id: String,
}

#[derive(Clone, Default)]
struct BackendState {
    remaining_questions: Arc<Mutex<VecDeque<i64>>>,
    uploads: Arc<Mutex<Vec<Upload>>>,
    completed: Arc<Mutex<Vec<i64>>>,
    reported_seconds: Arc<Mutex<Option<u64>>>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {TOKEN}"))
        .unwrap_or(false)
}

async fn create_interview(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"data": {"id": 42, "title": "Practice", "status": "CREATED"}})).into_response()
}

async fn start_interview(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"data": null})).into_response()
}

async fn next_question(State(state): State<BackendState>, headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    match state.remaining_questions.lock().unwrap().pop_front() {
        Some(id) => Json(json!({"data": {
            "id": id,
            "sequence": 1,
            "content": "Tell me about a project you are proud of.",
            "difficultyLevel": 3
        }}))
        .into_response(),
        None => StatusCode::GONE.into_response(),
    }
}

async fn upload_answer(
    State(state): State<BackendState>,
    Path(question_id): Path<i64>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    let mut file_name = String::new();
    let mut bytes = 0usize;
    let mut submission_id = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().unwrap_or_default().to_string();
                bytes = field.bytes().await.unwrap().len();
            }
            Some("submissionId") => {
                submission_id = field.text().await.unwrap();
            }
            _ => {}
        }
    }

    state.uploads.lock().unwrap().push(Upload {
        question_id,
        file_name,
        bytes,
        submission_id,
    });
    Json(json!({"data": null})).into_response()
}

async fn complete_interview(
    State(state): State<BackendState>,
    Path(interview_id): Path<i64>,
) -> Response {
    state.completed.lock().unwrap().push(interview_id);
    Json(json!({"data": null})).into_response()
}

async fn report_time(
    State(state): State<BackendState>,
    Json(body): Json<serde_json::Value>,
) -> Response {
    let seconds = body
        .get("timeInSeconds")
        .and_then(|v| v.as_u64())
        .unwrap_or(0);
    *state.reported_seconds.lock().unwrap() = Some(seconds);
    Json(json!({"data": null})).into_response()
}

async fn interview_questions() -> Response {
    Json(json!({"data": [
        {
            "id": 7,
            "sequence": 1,
            "content": "Tell me about a project you are proud of.",
            "answer": {
                "content": "I built a search index.",
                "feedback": "Good structure, add metrics.",
                "communicationScore": 8,
                "technicalScore": 7,
                "structureScore": 9
            }
        },
        {
            "id": 8,
            "sequence": 2,
            "content": "Why this company?",
            "answer": null
        }
    ]}))
    .into_response()
}

async fn list_companies() -> Response {
    Json(json!({"data": [
        {"id": 1, "name": "Acme"},
        {"id": 2, "name": "Globex"}
    ]}))
    .into_response()
}

async fn resume_exists() -> Response {
    Json(json!({"data": true})).into_response()
}

/// Bind the mock backend on an ephemeral port and return its state.
async fn spawn_backend(question_ids: Vec<i64>) -> Result<(SocketAddr, BackendState)> {
    let state = BackendState::default();
    *state.remaining_questions.lock().unwrap() = question_ids.into_iter().collect();

    let app = Router::new()
        .route("/api/interviews", post(create_interview))
        .route("/api/interviews/:id/start", post(start_interview))
        .route("/api/interviews/:id/next-question", get(next_question))
        .route(
            "/api/interviews/questions/:id/answer/audio",
            post(upload_answer),
        )
        .route("/api/interviews/:id/complete", post(complete_interview))
        .route("/api/interviews/:id/time", post(report_time))
        .route("/api/interviews/:id/questions", get(interview_questions))
        .route("/api/companies", get(list_companies))
        .route("/api/resume/exists", get(resume_exists))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Ok((addr, state))
}

fn client(addr: SocketAddr, token: &str) -> HttpInterviewApi {
    HttpInterviewApi::new(format!("http://{addr}"), token, Duration::from_secs(5))
        .expect("client builds")
}

fn create_request() -> CreateInterviewRequest {
    CreateInterviewRequest {
        resume_id: 1,
        position_id: 10,
        title: "Practice".to_string(),
        description: "5 questions".to_string(),
        kind: InterviewType::Text,
        mode: InterviewMode::Practice,
        question_count: 5,
        difficulty_level: 3,
        expected_duration_minutes: 25,
    }
}

fn captured_answer() -> CapturedAnswer {
    CapturedAnswer {
        wav_bytes: vec![0u8; 128],
        duration_seconds: 1.0,
        sample_rate: 16000,
        channels: 1,
        submission_id: Uuid::new_v4(),
    }
}

#[tokio::test]
async fn bearer_token_is_attached_to_every_request() -> Result<()> {
    let (addr, _state) = spawn_backend(vec![7]).await?;

    let ok = client(addr, TOKEN);
    let interview = ok.create_interview(&create_request()).await?;
    assert_eq!(interview.id, 42);

    let stale = client(addr, "expired");
    let err = stale
        .create_interview(&create_request())
        .await
        .expect_err("stale credential");
    assert!(err.is_unauthorized());
    Ok(())
}

#[tokio::test]
async fn gone_status_maps_to_the_exhaustion_signal() -> Result<()> {
    let (addr, _state) = spawn_backend(vec![7]).await?;
    let api = client(addr, TOKEN);

    let question = api.next_question(42).await?;
    assert_eq!(question.id, 7);
    assert!(!question.content.is_empty());

    let err = api.next_question(42).await.expect_err("cursor exhausted");
    assert!(err.is_exhausted());
    Ok(())
}

#[tokio::test]
async fn audio_upload_carries_file_and_stable_submission_id() -> Result<()> {
    let (addr, state) = spawn_backend(vec![]).await?;
    let api = client(addr, TOKEN);

    let answer = captured_answer();
    api.submit_audio_answer(7, &answer).await?;
    // Retry with the same payload, as the session engine does after a
    // transient failure.
    api.submit_audio_answer(7, &answer).await?;

    let uploads = state.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 2);
    for upload in &uploads {
        assert_eq!(upload.question_id, 7);
        assert_eq!(upload.file_name, "answer.wav");
        assert_eq!(upload.bytes, 128);
        assert_eq!(upload.submission_id, answer.submission_id.to_string());
    }
    Ok(())
}

#[tokio::test]
async fn completion_flow_reports_time_and_decodes_the_review_list() -> Result<()> {
    let (addr, state) = spawn_backend(vec![]).await?;
    let api = client(addr, TOKEN);

    api.complete_interview(42).await?;
    api.report_time(42, 93).await?;
    let reviews = api.interview_questions(42).await?;

    assert_eq!(*state.completed.lock().unwrap(), vec![42]);
    assert_eq!(*state.reported_seconds.lock().unwrap(), Some(93));

    assert_eq!(reviews.len(), 2);
    let answered = reviews[0].answer.as_ref().expect("first is answered");
    assert_eq!(answered.communication_score, Some(8));
    assert_eq!(answered.technical_score, Some(7));
    assert_eq!(answered.structure_score, Some(9));
    assert_eq!(answered.feedback.as_deref(), Some("Good structure, add metrics."));
    assert!(reviews[1].answer.is_none());
    Ok(())
}

#[tokio::test]
async fn enveloped_lookups_are_unwrapped() -> Result<()> {
    let (addr, _state) = spawn_backend(vec![]).await?;
    let api = client(addr, TOKEN);

    assert!(api.resume_exists().await?);

    let companies = api.list_companies().await?;
    assert_eq!(companies.len(), 2);
    assert_eq!(companies[0].name, "Acme");
    Ok(())
}
