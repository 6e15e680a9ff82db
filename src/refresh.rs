//! Live refresh loop.
//!
//! Re-runs a frame producer on a fixed interval and overwrites the
//! terminal with each frame. Cancellation is cooperative: the stop flag is
//! checked between ticks and while waiting, never during a render.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::output::CLEAR_SCREEN;

/// Longest sleep between stop-flag checks.
const POLL_SLICE: Duration = Duration::from_millis(100);

/// Shared cancellation flag, cheap to clone into a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    /// A flag that is not yet raised.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to finish after the current tick.
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether [`StopFlag::stop`] has been called.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Fixed-interval render loop.
#[derive(Debug, Clone)]
pub struct RefreshLoop {
    interval: Duration,
    stop: StopFlag,
}

impl RefreshLoop {
    /// Loop with the given interval; zero renders once.
    #[must_use]
    pub fn new(interval: Duration, stop: StopFlag) -> Self {
        Self { interval, stop }
    }

    /// Configured interval.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True when the loop renders a single frame.
    #[must_use]
    pub fn is_once(&self) -> bool {
        self.interval.is_zero()
    }

    /// Run until stopped.
    ///
    /// Each tick clears the screen and writes the frame produced by `tick`.
    /// A failed tick prints `Error: ...` and the loop carries on; with a
    /// zero interval the error is returned instead.
    pub fn run<F, W>(&self, mut tick: F, out: &mut W) -> Result<()>
    where
        F: FnMut() -> Result<String>,
        W: Write,
    {
        let mut frames = 0_u64;
        while !self.stop.is_stopped() {
            let started = Instant::now();
            match tick() {
                Ok(frame) => {
                    write!(out, "{CLEAR_SCREEN}{frame}")?;
                    if !frame.ends_with('\n') {
                        writeln!(out)?;
                    }
                }
                Err(e) if self.is_once() => return Err(e),
                Err(e) => {
                    log::warn!("refresh tick failed: {e}");
                    writeln!(out, "{CLEAR_SCREEN}Error: {e}")?;
                }
            }
            out.flush()?;
            frames += 1;

            if self.is_once() {
                break;
            }
            self.wait(self.interval.saturating_sub(started.elapsed()));
        }
        log::debug!("refresh loop finished after {frames} frames");
        Ok(())
    }

    /// Sleep up to `remaining`, waking early when stopped.
    fn wait(&self, remaining: Duration) {
        let deadline = Instant::now() + remaining;
        while !self.stop.is_stopped() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::sleep(POLL_SLICE.min(deadline - now));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_zero_interval_runs_once() {
        let looper = RefreshLoop::new(Duration::ZERO, StopFlag::new());
        let mut calls = 0;
        let mut out = Vec::new();

        looper
            .run(
                || {
                    calls += 1;
                    Ok("frame".to_string())
                },
                &mut out,
            )
            .expect("single run should succeed");

        assert_eq!(calls, 1);
        let text = String::from_utf8(out).expect("output should be utf-8");
        assert_eq!(text, format!("{CLEAR_SCREEN}frame\n"));
    }

    #[test]
    fn test_zero_interval_returns_error() {
        let looper = RefreshLoop::new(Duration::ZERO, StopFlag::new());
        let mut out = Vec::new();

        let err = looper.run(|| Err(Error::Source("boom".to_string())), &mut out).unwrap_err();
        assert!(matches!(err, Error::Source(_)));
        assert!(out.is_empty());
    }

    #[test]
    fn test_errors_do_not_stop_the_loop() {
        let stop = StopFlag::new();
        let looper = RefreshLoop::new(Duration::from_millis(1), stop.clone());
        let mut calls = 0;
        let mut out = Vec::new();

        looper
            .run(
                || {
                    calls += 1;
                    if calls == 3 {
                        stop.stop();
                    }
                    if calls == 1 {
                        Err(Error::Source("flaky".to_string()))
                    } else {
                        Ok(format!("frame {calls}\n"))
                    }
                },
                &mut out,
            )
            .expect("loop should finish cleanly");

        assert_eq!(calls, 3);
        let text = String::from_utf8(out).expect("output should be utf-8");
        assert!(text.contains("Error: Data source error: flaky"));
        assert!(text.contains("frame 2"));
        assert!(text.contains("frame 3"));
    }

    #[test]
    fn test_stopped_before_start_renders_nothing() {
        let stop = StopFlag::new();
        stop.stop();
        let looper = RefreshLoop::new(Duration::from_secs(60), stop);
        let mut out = Vec::new();

        looper.run(|| Ok("frame".to_string()), &mut out).expect("run should succeed");
        assert!(out.is_empty());
    }

    #[test]
    fn test_wait_wakes_on_stop() {
        let stop = StopFlag::new();
        let looper = RefreshLoop::new(Duration::from_secs(30), stop.clone());
        let started = Instant::now();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            stop.stop();
        });
        looper.wait(Duration::from_secs(30));
        handle.join().expect("stopper thread should succeed");

        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
