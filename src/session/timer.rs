use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

struct TimerState {
    question_secs: AtomicU64,
    total_secs: AtomicU64,
    /// Bumped on every question change; ticks started under an older
    /// generation are discarded instead of landing on the new question.
    generation: AtomicU64,
    running: AtomicBool,
}

/// Per-question and total elapsed seconds for one session.
///
/// Both counters are driven by a single repeating one-second tick, active
/// only while recording. The tick task is cancelled on pause, on question
/// change, and on drop, so no tick can outlive the state it refers to.
pub struct SessionTimer {
    state: Arc<TimerState>,
    task: Option<JoinHandle<()>>,
}

impl SessionTimer {
    pub fn new() -> Self {
        Self {
            state: Arc::new(TimerState {
                question_secs: AtomicU64::new(0),
                total_secs: AtomicU64::new(0),
                generation: AtomicU64::new(0),
                running: AtomicBool::new(false),
            }),
            task: None,
        }
    }

    /// Seconds spent on the current question.
    pub fn question_seconds(&self) -> u64 {
        self.state.question_secs.load(Ordering::SeqCst)
    }

    /// Seconds accumulated across the whole session. Never resets.
    pub fn total_seconds(&self) -> u64 {
        self.state.total_secs.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::SeqCst)
    }

    /// Start ticking. Idempotent while already running.
    pub fn start(&mut self) {
        if self.state.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let state = Arc::clone(&self.state);
        let generation = state.generation.load(Ordering::SeqCst);
        self.task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1));
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                if !state.running.load(Ordering::SeqCst)
                    || state.generation.load(Ordering::SeqCst) != generation
                {
                    break;
                }
                state.question_secs.fetch_add(1, Ordering::SeqCst);
                state.total_secs.fetch_add(1, Ordering::SeqCst);
            }
        }));
    }

    /// Stop ticking; counters keep their values.
    pub fn pause(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Zero the per-question counter for a newly current question.
    ///
    /// The total counter is untouched. If the timer was running it keeps
    /// running, under a fresh generation.
    pub fn reset_question(&mut self) {
        let was_running = self.is_running();
        if was_running {
            self.pause();
        }
        self.state.generation.fetch_add(1, Ordering::SeqCst);
        self.state.question_secs.store(0, Ordering::SeqCst);
        if was_running {
            self.start();
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.pause();
    }
}
