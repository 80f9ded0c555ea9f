use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use interv_practice::{
    ApiError, CaptureBackendFactory, CaptureSource, Config, HttpInterviewApi, InterviewApi,
    InterviewSession, SessionError, SessionPlan, SubmitOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "interv-practice", about = "Mock-interview practice session runner")]
struct Cli {
    /// Configuration file (without extension)
    #[arg(long, default_value = "config/interv-practice")]
    config: String,

    /// Bearer token for the interview backend (or INTERV_ACCESS_TOKEN)
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List companies available for interview configuration
    Companies,
    /// List open positions for a company
    Positions { company_id: i64 },
    /// Run a full practice session, answering each question from a WAV file
    Run {
        #[arg(long)]
        position_id: i64,

        /// Question count (5, 10 or 15)
        #[arg(long)]
        count: Option<u32>,

        /// Difficulty level (1-5)
        #[arg(long)]
        difficulty: Option<u8>,

        /// WAV files used as recorded answers, reused in order
        #[arg(long = "answer", required = true)]
        answers: Vec<PathBuf>,

        /// Finish the session after this many answers, leaving the rest
        /// unanswered
        #[arg(long)]
        end_early_after: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cfg = Config::load(&cli.config)?;

    let token = cli
        .token
        .or_else(|| std::env::var("INTERV_ACCESS_TOKEN").ok())
        .context("no bearer token: pass --token or set INTERV_ACCESS_TOKEN")?;
    let api = Arc::new(HttpInterviewApi::new(
        &cfg.api.base_url,
        token,
        Duration::from_secs(cfg.api.timeout_secs),
    )?);

    let result = match cli.command {
        Command::Companies => list_companies(api.as_ref()).await,
        Command::Positions { company_id } => list_positions(api.as_ref(), company_id).await,
        Command::Run {
            position_id,
            count,
            difficulty,
            answers,
            end_early_after,
        } => {
            run_session(
                api,
                &cfg,
                position_id,
                count,
                difficulty,
                answers,
                end_early_after,
            )
            .await
        }
    };

    // An expired credential is not retried locally; the user must sign in
    // again before rerunning.
    if let Err(err) = &result {
        if matches!(
            err.downcast_ref::<ApiError>(),
            Some(ApiError::Unauthorized)
        ) || matches!(
            err.downcast_ref::<SessionError>(),
            Some(SessionError::Api(ApiError::Unauthorized))
        ) {
            bail!("authentication expired: sign in again and retry");
        }
    }
    result
}

async fn list_companies(api: &HttpInterviewApi) -> Result<()> {
    for company in api.list_companies().await? {
        println!("{:>6}  {}", company.id, company.name);
    }
    Ok(())
}

async fn list_positions(api: &HttpInterviewApi, company_id: i64) -> Result<()> {
    for position in api.list_positions(company_id).await? {
        println!("{:>6}  {}", position.id, position.label());
    }
    Ok(())
}

async fn run_session(
    api: Arc<HttpInterviewApi>,
    cfg: &Config,
    position_id: i64,
    count: Option<u32>,
    difficulty: Option<u8>,
    answers: Vec<PathBuf>,
    end_early_after: Option<u32>,
) -> Result<()> {
    if !api.resume_exists().await? {
        bail!("no resume on file; create one before practicing");
    }
    let resume = api.my_resume().await?;

    let mut plan = SessionPlan::new(resume.id, position_id);
    plan.question_count = count.unwrap_or(cfg.session.question_count);
    plan.difficulty_level = difficulty.unwrap_or(cfg.session.difficulty_level);
    plan.allow_early_end = cfg.session.allow_early_end || end_early_after.is_some();

    let capture_config = cfg.capture_config();
    let mut session = InterviewSession::new(api, plan, capture_config.clone())?;
    session.begin().await?;

    let mut answer_files = answers.iter().cycle();
    let mut answered = 0u32;

    while let Some(question) = session.current_question().cloned() {
        let index = session.current_index().unwrap_or(0);
        println!("\nQ{index}: {}", question.content);

        if let Some(limit) = end_early_after {
            if answered >= limit {
                info!("ending early after {answered} answers");
                session.end_early().await?;
                break;
            }
        }

        let answer_file = answer_files
            .next()
            .context("at least one answer file is required")?;
        let backend = CaptureBackendFactory::create(
            CaptureSource::File(answer_file.clone()),
            capture_config.clone(),
        )?;
        session.start_recording(backend).await?;
        session.stop_recording().await?;

        answered += 1;
        match session.submit_answer().await? {
            SubmitOutcome::Completed => break,
            SubmitOutcome::NextQuestion => continue,
        }
    }

    let summary = session
        .summary()
        .context("session ended without a summary")?;
    println!(
        "\nCompleted: {}/{} answered ({}%), {}s total",
        summary.answered_count(),
        summary.question_count(),
        summary.completion_percent(),
        summary.total_seconds
    );
    for (i, entry) in summary.entries.iter().enumerate() {
        println!("\nQ{}: {}", i + 1, entry.content);
        match &entry.answer {
            Some(answer) => {
                if let Some(text) = &answer.content {
                    println!("  answer: {text}");
                }
                if let Some(feedback) = &answer.feedback {
                    println!("  feedback: {feedback}");
                }
                let scores = [
                    ("communication", answer.communication_score),
                    ("technical", answer.technical_score),
                    ("structure", answer.structure_score),
                ];
                for (label, score) in scores {
                    if let Some(score) = score {
                        println!("  {label}: {score}/10");
                    }
                }
            }
            None => println!("  (no answer submitted)"),
        }
    }
    Ok(())
}
