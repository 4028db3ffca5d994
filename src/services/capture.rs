//! Background capture and playback tasks
//!
//! Audio recording and playback run off the main flow on blocking tasks
//! that communicate results purely through the filesystem: the worker is
//! handed a target path and a stop flag, and writes (or reads) the file
//! until the flag is raised. The device I/O itself lives in the worker
//! closure supplied by the caller; this module only owns the task
//! lifecycle.
//!
//! Cancellation is cooperative: workers are expected to check the flag
//! once per buffer iteration (`config::CAPTURE_CHUNK_FRAMES` bounds the
//! latency). The join is bounded; a worker that misses the deadline is
//! detached and left to run out, never forcibly killed. Abandonment is
//! the fallback, not the mechanism.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

/// Result of stopping a capture task.
#[derive(Debug)]
pub enum CaptureOutcome {
    /// Worker acknowledged the stop flag and exited cleanly; the file at
    /// the returned path is complete.
    Finished(PathBuf),
    /// Worker exited with an error; the file may be partial or absent.
    Failed(String),
    /// Worker did not join within the deadline and was detached. The
    /// path may still be written to by the runaway worker.
    Abandoned(PathBuf),
}

/// A running background capture (or playback) worker.
pub struct CaptureTask {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<std::io::Result<()>>,
    output: PathBuf,
}

impl CaptureTask {
    /// Start `worker` on the blocking pool. The worker receives the
    /// output path and the shared stop flag and should return once the
    /// flag reads true.
    pub fn spawn<F>(output: PathBuf, worker: F) -> Self
    where
        F: FnOnce(&Path, &AtomicBool) -> std::io::Result<()> + Send + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let path = output.clone();

        let handle = tokio::task::spawn_blocking(move || worker(&path, &flag));

        tracing::debug!("Capture task started for {:?}", output);

        Self {
            stop,
            handle,
            output,
        }
    }

    /// Whether the worker is still running.
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Raise the stop flag and wait up to `timeout` for the worker to
    /// exit.
    pub async fn stop(self, timeout: Duration) -> CaptureOutcome {
        self.stop.store(true, Ordering::Relaxed);

        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(Ok(()))) => {
                tracing::debug!("Capture task finished: {:?}", self.output);
                CaptureOutcome::Finished(self.output)
            }
            Ok(Ok(Err(e))) => {
                tracing::warn!("Capture worker failed for {:?}: {}", self.output, e);
                CaptureOutcome::Failed(e.to_string())
            }
            Ok(Err(join_err)) => {
                tracing::warn!("Capture worker panicked for {:?}: {}", self.output, join_err);
                CaptureOutcome::Failed(join_err.to_string())
            }
            Err(_) => {
                tracing::warn!(
                    "Capture worker for {:?} missed its stop deadline; detaching",
                    self.output
                );
                CaptureOutcome::Abandoned(self.output)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_cooperative_worker_finishes() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("rec.wav");

        let task = CaptureTask::spawn(out.clone(), |path, stop| {
            let mut file = std::fs::File::create(path)?;
            // One buffer per iteration, flag checked each time around
            while !stop.load(Ordering::Relaxed) {
                file.write_all(&[0u8; 64])?;
                std::thread::sleep(Duration::from_millis(5));
            }
            file.flush()
        });

        tokio::time::sleep(Duration::from_millis(40)).await;

        match task.stop(Duration::from_secs(1)).await {
            CaptureOutcome::Finished(path) => {
                assert_eq!(path, out);
                assert!(std::fs::metadata(&out).unwrap().len() > 0);
            }
            other => panic!("expected Finished, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_stubborn_worker_is_abandoned() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("rec.wav");

        let task = CaptureTask::spawn(out.clone(), |_, _| {
            // Ignores the flag entirely
            std::thread::sleep(Duration::from_secs(3));
            Ok(())
        });

        match task.stop(Duration::from_millis(50)).await {
            CaptureOutcome::Abandoned(path) => assert_eq!(path, out),
            other => panic!("expected Abandoned, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failing_worker_reports_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("rec.wav");

        let task = CaptureTask::spawn(out, |_, _| {
            Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                "device unavailable",
            ))
        });

        match task.stop(Duration::from_secs(1)).await {
            CaptureOutcome::Failed(msg) => assert!(msg.contains("device unavailable")),
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_is_running_reflects_worker_state() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("rec.wav");

        let task = CaptureTask::spawn(out, |_, stop| {
            while !stop.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(2));
            }
            Ok(())
        });

        assert!(task.is_running());
        let outcome = task.stop(Duration::from_secs(1)).await;
        assert!(matches!(outcome, CaptureOutcome::Finished(_)));
    }
}
