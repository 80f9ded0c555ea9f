use anyhow::Result;
use serde::Deserialize;

use crate::audio::CaptureConfig;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub audio: AudioConfig,
    pub session: SessionDefaults,
}

#[derive(Debug, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Defaults applied when the CLI does not override them.
#[derive(Debug, Deserialize)]
pub struct SessionDefaults {
    pub question_count: u32,
    pub difficulty_level: u8,
    pub allow_early_end: bool,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            sample_rate: self.audio.sample_rate,
            channels: self.audio.channels,
            ..CaptureConfig::default()
        }
    }
}
