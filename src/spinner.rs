use std::io::{IsTerminal, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(100);

/// Cosmetic progress indicator drawn on stderr while the scrape runs.
///
/// The background task only reads the `running` flag; it never sees any
/// scraped data.
pub struct Spinner {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Start spinning with `message`. Draws nothing unless stderr is a terminal.
    pub fn start(message: impl Into<String>) -> Self {
        let running = Arc::new(AtomicBool::new(true));

        if !std::io::stderr().is_terminal() {
            return Self {
                running,
                handle: None,
            };
        }

        let message = message.into();
        let flag = Arc::clone(&running);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            let mut frame = 0usize;
            while flag.load(Ordering::Relaxed) {
                interval.tick().await;
                let mut stderr = std::io::stderr();
                let _ = write!(stderr, "\r{} {}", FRAMES[frame % FRAMES.len()], message);
                let _ = stderr.flush();
                frame += 1;
            }
            let mut stderr = std::io::stderr();
            let _ = write!(stderr, "\r{}\r", " ".repeat(message.chars().count() + 2));
            let _ = stderr.flush();
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Signal the task to stop and wait for it to clear its line.
    pub async fn stop(mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
    }
}
