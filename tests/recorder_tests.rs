// Integration tests for answer capture.
//
// A WAV fixture written to a temp directory stands in for the microphone,
// streamed through the file capture backend.

use anyhow::Result;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use interv_practice::audio::{
    AnswerRecorder, AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig,
    CaptureSource,
};
use std::io::Cursor;
use std::path::PathBuf;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Write `seconds` of a flat tone as a 16kHz mono WAV fixture.
fn write_fixture(dir: &TempDir, name: &str, seconds: u32) -> Result<PathBuf> {
    let path = dir.path().join(name);
    let spec = WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec)?;
    for _ in 0..(seconds * 16000) {
        writer.write_sample(1000i16)?;
    }
    writer.finalize()?;
    Ok(path)
}

fn file_backend(path: PathBuf) -> Box<dyn CaptureBackend> {
    CaptureBackendFactory::create(CaptureSource::File(path), CaptureConfig::default())
        .expect("file backend")
}

#[tokio::test]
async fn capture_cycle_produces_decodable_wav_payload() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = write_fixture(&dir, "answer.wav", 2)?;

    let mut recorder = AnswerRecorder::new(CaptureConfig::default());
    recorder.start(file_backend(fixture)).await?;
    assert!(recorder.is_recording());

    let captured = recorder.stop().await?.expect("payload after stop");
    assert!(!recorder.is_recording());

    assert_eq!(captured.sample_rate, 16000);
    assert_eq!(captured.channels, 1);
    assert!((captured.duration_seconds - 2.0).abs() < 0.01);

    // The payload must be a valid WAV file with every sample intact.
    let reader = WavReader::new(Cursor::new(captured.wav_bytes))?;
    assert_eq!(reader.spec().sample_rate, 16000);
    assert_eq!(reader.spec().channels, 1);
    let samples: Vec<i16> = reader.into_samples::<i16>().collect::<Result<_, _>>()?;
    assert_eq!(samples.len(), 2 * 16000);
    assert!(samples.iter().all(|&s| s == 1000));
    Ok(())
}

#[tokio::test]
async fn stop_without_start_returns_nothing() -> Result<()> {
    let mut recorder = AnswerRecorder::new(CaptureConfig::default());
    assert!(recorder.stop().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn second_start_is_rejected_while_recording() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = write_fixture(&dir, "answer.wav", 1)?;

    let mut recorder = AnswerRecorder::new(CaptureConfig::default());
    recorder.start(file_backend(fixture.clone())).await?;

    let err = recorder
        .start(file_backend(fixture))
        .await
        .expect_err("device must not be acquired twice");
    assert!(err.to_string().contains("already in progress"));

    // The original capture is still usable.
    assert!(recorder.is_recording());
    assert!(recorder.stop().await?.is_some());
    Ok(())
}

#[tokio::test]
async fn failed_acquisition_leaves_recorder_idle() -> Result<()> {
    let dir = TempDir::new()?;
    let missing = dir.path().join("does-not-exist.wav");

    let mut recorder = AnswerRecorder::new(CaptureConfig::default());
    let err = recorder
        .start(file_backend(missing))
        .await
        .expect_err("missing fixture must fail");
    assert!(err.to_string().contains("failed to acquire audio input"));

    assert!(!recorder.is_recording());
    assert!(recorder.stop().await?.is_none());
    Ok(())
}

#[tokio::test]
async fn each_capture_gets_its_own_submission_id() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = write_fixture(&dir, "answer.wav", 1)?;

    let mut recorder = AnswerRecorder::new(CaptureConfig::default());

    recorder.start(file_backend(fixture.clone())).await?;
    let first = recorder.stop().await?.expect("first capture");

    recorder.start(file_backend(fixture)).await?;
    let second = recorder.stop().await?.expect("second capture");

    assert_ne!(first.submission_id, second.submission_id);
    Ok(())
}

#[tokio::test]
async fn file_backend_frames_carry_the_source_format() -> Result<()> {
    let dir = TempDir::new()?;
    let fixture = write_fixture(&dir, "answer.wav", 1)?;

    let mut backend = file_backend(fixture);
    let mut rx: mpsc::Receiver<AudioFrame> = backend.start().await?;

    let mut total_samples = 0usize;
    let mut frames = 0usize;
    while let Some(frame) = rx.recv().await {
        assert_eq!(frame.sample_rate, 16000);
        assert_eq!(frame.channels, 1);
        assert_eq!(frame.timestamp_ms, frames as u64 * 100);
        total_samples += frame.samples.len();
        frames += 1;
    }
    backend.stop().await?;

    assert_eq!(total_samples, 16000);
    assert_eq!(frames, 10); // 1s of audio in 100ms frames
    Ok(())
}

#[test]
fn microphone_source_requires_a_platform_backend() {
    let result = CaptureBackendFactory::create(CaptureSource::Microphone, CaptureConfig::default());
    assert!(result.is_err());
}
