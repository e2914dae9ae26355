//! Periodic callback registration.
//!
//! A [`Ticker`] calls a callback once per period on the tokio runtime until
//! the callback returns `ControlFlow::Break`, or until its [`TickerHandle`]
//! is cancelled or dropped.
//!
//! Late ticks are delayed rather than bursted, so a stalled runtime never
//! replays the seconds it missed.

use std::ops::ControlFlow;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{CoreError, Result, ValidationError};

pub struct Ticker;

impl Ticker {
    /// Register `callback` to run every `period`, first firing one full
    /// period from now.
    ///
    /// # Errors
    ///
    /// Returns an error if `period` is zero or if called outside a tokio
    /// runtime.
    pub fn every<F>(period: Duration, mut callback: F) -> Result<TickerHandle>
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        if period.is_zero() {
            return Err(ValidationError::invalid("period", "tick period must be non-zero").into());
        }
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CoreError::Custom(format!("ticker needs a tokio runtime: {e}")))?;

        // Measured from registration, not from the task's first poll.
        let first = Instant::now() + period;
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(first, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if callback().is_break() {
                    break;
                }
            }
            tracing::debug!("ticker finished");
        });
        tracing::debug!(period_ms = period.as_millis() as u64, "ticker registered");
        Ok(TickerHandle { task: Some(task) })
    }
}

/// Cancellation handle for a [`Ticker`] registration. Dropping it cancels.
#[derive(Debug)]
pub struct TickerHandle {
    task: Option<JoinHandle<()>>,
}

impl TickerHandle {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            if !task.is_finished() {
                tracing::debug!("ticker cancelled");
            }
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    const PERIOD: Duration = Duration::from_secs(1);

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let _handle = Ticker::every(PERIOD, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        for expected in 1..=3 {
            tokio::time::advance(PERIOD).await;
            settle().await;
            assert_eq!(count.load(Ordering::SeqCst), expected);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_tick_is_one_period_after_registration() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let _handle = Ticker::every(PERIOD, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        // The task has not been polled yet.
        tokio::time::advance(PERIOD).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn break_ends_registration() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let handle = Ticker::every(PERIOD, move || {
            if c.fetch_add(1, Ordering::SeqCst) + 1 == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })
        .unwrap();

        for _ in 0..5 {
            tokio::time::advance(PERIOD).await;
            settle().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 2);
        assert!(!handle.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_stops_callbacks() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let mut handle = Ticker::every(PERIOD, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();

        tokio::time::advance(PERIOD).await;
        settle().await;
        handle.cancel();
        assert!(!handle.is_active());

        for _ in 0..3 {
            tokio::time::advance(PERIOD).await;
            settle().await;
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_cancels() {
        let count = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&count);
        let handle = Ticker::every(PERIOD, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ControlFlow::Continue(())
        })
        .unwrap();
        drop(handle);

        tokio::time::advance(PERIOD * 3).await;
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_period_rejected() {
        let result = Ticker::every(Duration::ZERO, || ControlFlow::Continue(()));
        assert!(matches!(result, Err(CoreError::Validation(_))));
    }

    #[test]
    fn outside_runtime_is_an_error() {
        let result = Ticker::every(PERIOD, || ControlFlow::Continue(()));
        assert!(matches!(result, Err(CoreError::Custom(_))));
    }
}
