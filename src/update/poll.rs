//! Fixed-interval retry polling under a cancellation deadline
//!
//! Network stages repeat an attempt every few seconds until it succeeds, an
//! overall budget runs out, or the pipeline-wide deadline fires. Attempts are
//! strictly sequential; a running attempt is never interrupted mid-flight.

use crate::core::error::{Result, UpdateError};
use std::thread;
use std::time::{Duration, Instant};

/// Default pause between attempts
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);

/// Default overall retry budget per operation
pub const DEFAULT_BUDGET: Duration = Duration::from_secs(60);

/// A monotonic point in time after which all pipeline work must stop.
///
/// Threaded through every network, extraction, and subprocess call; checked
/// at least once per poll interval and before each archive entry.
#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    at: Instant,
}

impl Deadline {
    /// A deadline this far in the future
    pub fn after(duration: Duration) -> Self {
        Deadline {
            at: Instant::now() + duration,
        }
    }

    /// Time left before the deadline, zero if already past
    pub fn remaining(&self) -> Duration {
        self.at.saturating_duration_since(Instant::now())
    }

    /// Whether the deadline has passed
    pub fn expired(&self) -> bool {
        self.remaining().is_zero()
    }
}

/// Timing policy for one polled operation
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    /// Pause between consecutive attempts
    pub interval: Duration,
    /// Overall time budget for the operation
    pub budget: Duration,
    /// Whether the first attempt fires without waiting one interval
    pub immediate: bool,
}

impl Default for PollPolicy {
    fn default() -> Self {
        PollPolicy {
            interval: DEFAULT_INTERVAL,
            budget: DEFAULT_BUDGET,
            immediate: true,
        }
    }
}

/// Outcome of a single poll attempt.
///
/// `Retry` errors are recorded and polling continues; `Fatal` conditions
/// stop polling at once and propagate unchanged.
#[derive(Debug)]
pub enum PollOutcome {
    /// The operation completed; stop polling successfully
    Done,
    /// Transient failure; record it and try again after one interval
    Retry(UpdateError),
    /// Terminal failure; abort polling immediately
    Fatal(UpdateError),
}

/// Repeat `op` at a fixed interval until it reports [`PollOutcome::Done`],
/// the policy budget elapses, or `deadline` fires, whichever comes first.
///
/// On budget exhaustion the returned error carries the last retryable error
/// observed, since the elapsed time alone says nothing about why attempts
/// kept failing.
pub fn poll_until<F>(
    deadline: &Deadline,
    policy: &PollPolicy,
    operation: &str,
    mut op: F,
) -> Result<()>
where
    F: FnMut() -> PollOutcome,
{
    let started = Instant::now();
    let mut last_error: Option<UpdateError> = None;
    let mut first = true;

    loop {
        if !(first && policy.immediate) {
            let remaining_budget = policy.budget.saturating_sub(started.elapsed());
            let pause = policy
                .interval
                .min(remaining_budget)
                .min(deadline.remaining());
            if !pause.is_zero() {
                thread::sleep(pause);
            }
        }
        first = false;

        if deadline.expired() {
            return Err(UpdateError::DeadlineElapsed {
                operation: operation.to_string(),
            });
        }
        if started.elapsed() >= policy.budget {
            return Err(UpdateError::RetriesExhausted {
                operation: operation.to_string(),
                budget: policy.budget,
                last_error: last_error.take().map(Box::new),
            });
        }

        match op() {
            PollOutcome::Done => return Ok(()),
            PollOutcome::Retry(err) => {
                tracing::debug!(operation, error = %err, "attempt failed, will retry");
                last_error = Some(err);
            },
            PollOutcome::Fatal(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(interval_ms: u64, budget_ms: u64) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(interval_ms),
            budget: Duration::from_millis(budget_ms),
            immediate: true,
        }
    }

    #[test]
    fn test_succeeds_on_third_attempt_within_two_intervals() {
        let deadline = Deadline::after(Duration::from_secs(10));
        let policy = fast_policy(20, 5_000);
        let mut attempts = 0;

        let started = Instant::now();
        let result = poll_until(&deadline, &policy, "flaky op", || {
            attempts += 1;
            if attempts < 3 {
                PollOutcome::Retry(UpdateError::network("temporary"))
            } else {
                PollOutcome::Done
            }
        });

        assert!(result.is_ok());
        assert_eq!(attempts, 3);
        // Two failed attempts cost two intervals; allow generous slack for
        // slow CI machines but stay far below the overall budget.
        assert!(started.elapsed() < Duration::from_millis(1_000));
    }

    #[test]
    fn test_times_out_at_budget_not_before() {
        let deadline = Deadline::after(Duration::from_secs(10));
        let policy = fast_policy(40, 150);

        let started = Instant::now();
        let result = poll_until(&deadline, &policy, "never succeeds", || {
            PollOutcome::Retry(UpdateError::network("still down"))
        });

        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(140), "returned too early: {:?}", elapsed);
        match result {
            Err(UpdateError::RetriesExhausted {
                operation,
                last_error,
                ..
            }) => {
                assert_eq!(operation, "never succeeds");
                assert!(last_error.is_some(), "last retryable error should be kept");
            },
            other => panic!("expected RetriesExhausted, got {:?}", other),
        }
    }

    #[test]
    fn test_deadline_cancels_polling() {
        let deadline = Deadline::after(Duration::from_millis(60));
        let policy = fast_policy(30, 60_000);

        let result = poll_until(&deadline, &policy, "cancelled op", || {
            PollOutcome::Retry(UpdateError::network("nope"))
        });

        assert!(matches!(result, Err(UpdateError::DeadlineElapsed { .. })));
    }

    #[test]
    fn test_fatal_outcome_aborts_immediately() {
        let deadline = Deadline::after(Duration::from_secs(10));
        let policy = fast_policy(20, 5_000);
        let mut attempts = 0;

        let result = poll_until(&deadline, &policy, "broken op", || {
            attempts += 1;
            PollOutcome::Fatal(UpdateError::configuration("unusable destination"))
        });

        assert_eq!(attempts, 1);
        assert!(matches!(
            result,
            Err(UpdateError::ConfigurationError { .. })
        ));
    }

    #[test]
    fn test_first_attempt_waits_when_not_immediate() {
        let deadline = Deadline::after(Duration::from_secs(10));
        let policy = PollPolicy {
            interval: Duration::from_millis(50),
            budget: Duration::from_secs(5),
            immediate: false,
        };

        let started = Instant::now();
        let result = poll_until(&deadline, &policy, "delayed op", || PollOutcome::Done);

        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn test_deadline_remaining_saturates() {
        let deadline = Deadline::after(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(5));
        assert!(deadline.expired());
        assert_eq!(deadline.remaining(), Duration::ZERO);
    }
}
