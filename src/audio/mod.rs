pub mod backend;
pub mod file;
pub mod recorder;

pub use backend::{AudioFrame, CaptureBackend, CaptureBackendFactory, CaptureConfig, CaptureSource};
pub use file::FileCaptureBackend;
pub use recorder::{AnswerRecorder, CapturedAnswer};
