use anyhow::{Context, Result};
use std::io::Cursor;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::backend::{CaptureBackend, CaptureConfig};

/// One finalized answer recording, ready for upload.
#[derive(Debug, Clone)]
pub struct CapturedAnswer {
    /// WAV-encoded audio payload
    pub wav_bytes: Vec<u8>,
    /// Recorded duration in seconds
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    /// Stable per-capture id, reused across submission retries so the
    /// backend can dedupe resubmissions.
    pub submission_id: Uuid,
}

struct ActiveCapture {
    backend: Box<dyn CaptureBackend>,
    samples: Arc<Mutex<Vec<i16>>>,
    task: JoinHandle<()>,
}

impl Drop for ActiveCapture {
    fn drop(&mut self) {
        // Teardown path: the backend's own Drop releases the input device.
        self.task.abort();
    }
}

/// Owns one record cycle: acquire input, accumulate frames, finalize.
///
/// The accumulated buffer is transient. It exists only between `start` and
/// `stop`, and the finalized payload is discarded by the caller after a
/// successful submission.
pub struct AnswerRecorder {
    config: CaptureConfig,
    active: Option<ActiveCapture>,
}

impl AnswerRecorder {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            active: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    /// Acquire the input and begin accumulating frames.
    ///
    /// Fails without acquiring anything when the backend cannot start
    /// (e.g. microphone permission denied).
    pub async fn start(&mut self, mut backend: Box<dyn CaptureBackend>) -> Result<()> {
        if self.active.is_some() {
            anyhow::bail!("a recording is already in progress");
        }

        let mut audio_rx = backend
            .start()
            .await
            .context("failed to acquire audio input")?;

        let samples = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&samples);
        let task = tokio::spawn(async move {
            while let Some(frame) = audio_rx.recv().await {
                sink.lock().await.extend_from_slice(&frame.samples);
            }
        });

        info!("recording started ({})", backend.name());
        self.active = Some(ActiveCapture {
            backend,
            samples,
            task,
        });
        Ok(())
    }

    /// Stop capturing and finalize the buffer into a single WAV payload.
    ///
    /// Returns `None` when no recording was in progress (a no-op, by
    /// contract with the session engine). The input is released on every
    /// path, including encode failure.
    pub async fn stop(&mut self) -> Result<Option<CapturedAnswer>> {
        let Some(mut active) = self.active.take() else {
            return Ok(None);
        };

        if let Err(e) = active.backend.stop().await {
            warn!("failed to stop capture backend: {}", e);
        }
        if let Err(e) = (&mut active.task).await {
            if !e.is_cancelled() {
                error!("capture task panicked: {}", e);
            }
        }

        let samples = {
            let mut guard = active.samples.lock().await;
            std::mem::take(&mut *guard)
        };
        drop(active); // release the backend before encoding

        let sample_rate = self.config.sample_rate;
        let channels = self.config.channels;
        let duration_seconds = samples.len() as f64 / (sample_rate as f64 * channels as f64);
        let wav_bytes = encode_wav(&samples, sample_rate, channels)?;

        info!(
            "recording stopped: {:.1}s, {} samples, {} bytes",
            duration_seconds,
            samples.len(),
            wav_bytes.len()
        );

        Ok(Some(CapturedAnswer {
            wav_bytes,
            duration_seconds,
            sample_rate,
            channels,
            submission_id: Uuid::new_v4(),
        }))
    }
}

/// Encode i16 PCM samples as an in-memory WAV file.
fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer =
            hound::WavWriter::new(&mut cursor, spec).context("failed to create WAV writer")?;
        for &sample in samples {
            writer
                .write_sample(sample)
                .context("failed to write sample to WAV")?;
        }
        writer.finalize().context("failed to finalize WAV")?;
    }
    Ok(cursor.into_inner())
}
