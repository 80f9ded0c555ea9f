use anyhow::Result;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

/// Configuration for audio capture
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Target sample rate in Hz
    pub sample_rate: u32,
    /// Target channel count (1 = mono, 2 = stereo)
    pub channels: u16,
    /// Frame size in milliseconds
    pub frame_duration_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000, // what the transcription backend expects
            channels: 1,        // Mono
            frame_duration_ms: 100,
        }
    }
}

/// Audio capture backend trait
///
/// The input device (or file) is exclusively owned by one backend instance
/// for the duration of a capture cycle. `stop()` must release it, and
/// implementations also release on drop so view teardown never leaks the
/// device handle.
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing audio
    ///
    /// Returns a channel receiver that will receive audio frames. A failure
    /// here (e.g. device permission denied) must leave nothing acquired.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing and release the input
    async fn stop(&mut self) -> Result<()>;

    /// Check if backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}

/// Audio input source
#[derive(Debug, Clone)]
pub enum CaptureSource {
    /// Microphone input
    Microphone,
    /// WAV file input (testing and scripted sessions)
    File(PathBuf),
}

/// Capture backend factory
pub struct CaptureBackendFactory;

impl CaptureBackendFactory {
    pub fn create(source: CaptureSource, config: CaptureConfig) -> Result<Box<dyn CaptureBackend>> {
        match source {
            CaptureSource::File(path) => {
                let backend = super::file::FileCaptureBackend::new(path, config);
                Ok(Box::new(backend))
            }
            CaptureSource::Microphone => {
                anyhow::bail!("microphone capture requires a platform audio backend")
            }
        }
    }
}
