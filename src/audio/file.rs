use anyhow::{Context, Result};
use hound::WavReader;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::info;

use super::backend::{AudioFrame, CaptureBackend, CaptureConfig};

/// Capture backend that streams a WAV file as if it were a live input.
///
/// Used by tests and by scripted CLI sessions, where each answer is played
/// back from a fixture instead of a microphone.
pub struct FileCaptureBackend {
    path: PathBuf,
    config: CaptureConfig,
    capturing: bool,
    task: Option<JoinHandle<()>>,
}

impl FileCaptureBackend {
    pub fn new(path: PathBuf, config: CaptureConfig) -> Self {
        Self {
            path,
            config,
            capturing: false,
            task: None,
        }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for FileCaptureBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>> {
        if self.capturing {
            anyhow::bail!("file capture already started: {}", self.path.display());
        }

        let reader = WavReader::open(&self.path)
            .with_context(|| format!("failed to open WAV file: {}", self.path.display()))?;
        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("failed to read audio samples")?;

        info!(
            "streaming {} as capture input: {}Hz, {} channels, {} samples",
            self.path.display(),
            spec.sample_rate,
            spec.channels,
            samples.len()
        );

        let frame_duration_ms = self.config.frame_duration_ms.max(1);
        let samples_per_frame =
            (spec.sample_rate as u64 * frame_duration_ms / 1000) as usize * spec.channels as usize;
        let samples_per_frame = samples_per_frame.max(1);

        let (tx, rx) = mpsc::channel(64);
        let task = tokio::spawn(async move {
            for (i, chunk) in samples.chunks(samples_per_frame).enumerate() {
                let frame = AudioFrame {
                    samples: chunk.to_vec(),
                    sample_rate: spec.sample_rate,
                    channels: spec.channels,
                    timestamp_ms: i as u64 * frame_duration_ms,
                };
                if tx.send(frame).await.is_err() {
                    break; // receiver dropped, stop streaming
                }
            }
        });

        self.capturing = true;
        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.capturing = false;
        // The file is finite: drain it fully so a quick stop does not lose
        // the tail of the answer.
        if let Some(task) = self.task.take() {
            task.await.context("file streaming task panicked")?;
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileCaptureBackend {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
