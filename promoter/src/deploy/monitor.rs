//! Processing monitor
//!
//! Bounded polling loop that waits for a registered version to finish
//! platform-side processing. The status source and the sleep function
//! are both injected so tests run on a virtual clock.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::errors::PromoterError;
use crate::models::version::{PollAttempt, VersionStatus};

/// Monitor tuning
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// Fixed delay between status queries
    pub poll_interval: Duration,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(20),
        }
    }
}

/// Terminal result of one wait
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The version reached `Ready` within the ceiling
    Ready {
        attempts: u32,
        elapsed: Duration,
    },

    /// The ceiling elapsed without observing `Ready`
    TimedOut {
        attempts: u32,
        elapsed: Duration,
        last_status: VersionStatus,
    },

    /// The platform reported the version absent. Registration runs
    /// before the wait stage, so this is an upstream contract
    /// violation and is never retried.
    NotFound {
        attempts: u32,
    },
}

/// Poll until `version_label` reaches `Ready` or `ceiling` is spent.
///
/// The first query is issued immediately; a ceiling of zero still
/// checks exactly once and honors the result. Elapsed time is the sum
/// of completed sleeps, so the loop finishes its last check at or
/// before the ceiling boundary and never overshoots by more than one
/// interval. The loop only reads platform state; it is itself the
/// retry mechanism and must not be wrapped in another one.
pub async fn await_ready<Q, QF, S, SF>(
    app_id: &str,
    version_label: &str,
    ceiling: Duration,
    settings: &MonitorSettings,
    mut query: Q,
    sleep_fn: S,
) -> Result<WaitOutcome, PromoterError>
where
    Q: FnMut() -> QF,
    QF: Future<Output = Result<VersionStatus, PromoterError>>,
    S: Fn(Duration) -> SF,
    SF: Future<Output = ()>,
{
    let interval = settings.poll_interval;
    if interval.is_zero() {
        return Err(PromoterError::ConfigError(
            "poll interval must be greater than zero".to_string(),
        ));
    }

    info!(
        "Waiting up to {:?} for version '{}' of '{}' to finish processing...",
        ceiling, version_label, app_id
    );

    let mut elapsed = Duration::ZERO;
    let mut attempts: u32 = 0;

    loop {
        attempts += 1;
        let status = query().await?;
        let attempt = PollAttempt::new(attempts, status);
        debug!(
            "Status check {} at {} (+{:?}): {}",
            attempt.attempt, attempt.issued_at, elapsed, attempt.status
        );

        match status {
            VersionStatus::Ready => {
                info!(
                    "Version '{}' ready after {} check(s) ({:?})",
                    version_label, attempts, elapsed
                );
                return Ok(WaitOutcome::Ready { attempts, elapsed });
            }
            VersionStatus::NotFound => {
                warn!(
                    "Version '{}' of '{}' not found on status check {}",
                    version_label, app_id, attempts
                );
                return Ok(WaitOutcome::NotFound { attempts });
            }
            VersionStatus::Pending | VersionStatus::Unknown => {}
        }

        // The next check would start past the ceiling: give up now
        // rather than sleeping into overshoot.
        if elapsed + interval > ceiling {
            warn!(
                "Version '{}' still {} after {:?} ({} check(s)), giving up",
                version_label, status, elapsed, attempts
            );
            return Ok(WaitOutcome::TimedOut {
                attempts,
                elapsed,
                last_status: status,
            });
        }

        sleep_fn(interval).await;
        elapsed += interval;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    fn settings(interval_secs: u64) -> MonitorSettings {
        MonitorSettings {
            poll_interval: Duration::from_secs(interval_secs),
        }
    }

    /// Status source that replays a fixed sequence, repeating the
    /// last entry, and counts queries.
    fn scripted(
        sequence: Vec<VersionStatus>,
        calls: &Cell<u32>,
    ) -> impl FnMut() -> std::future::Ready<Result<VersionStatus, PromoterError>> + '_ {
        let sequence = RefCell::new(sequence);
        move || {
            let n = calls.get() as usize;
            calls.set(calls.get() + 1);
            let seq = sequence.borrow();
            let status = *seq.get(n).unwrap_or_else(|| seq.last().unwrap());
            std::future::ready(Ok(status))
        }
    }

    fn no_sleep(_d: Duration) -> std::future::Ready<()> {
        std::future::ready(())
    }

    #[test]
    fn test_ready_on_first_check() {
        let calls = Cell::new(0);
        let outcome = tokio_test::block_on(await_ready(
            "api",
            "v1",
            Duration::from_secs(60),
            &settings(20),
            scripted(vec![VersionStatus::Ready], &calls),
            no_sleep,
        ))
        .unwrap();

        assert_eq!(
            outcome,
            WaitOutcome::Ready {
                attempts: 1,
                elapsed: Duration::ZERO
            }
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_ceiling_single_check() {
        let calls = Cell::new(0);
        let outcome = tokio_test::block_on(await_ready(
            "api",
            "v1",
            Duration::ZERO,
            &settings(20),
            scripted(vec![VersionStatus::Ready], &calls),
            no_sleep,
        ))
        .unwrap();

        assert!(matches!(outcome, WaitOutcome::Ready { attempts: 1, .. }));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_ceiling_pending_times_out() {
        let calls = Cell::new(0);
        let outcome = tokio_test::block_on(await_ready(
            "api",
            "v1",
            Duration::ZERO,
            &settings(20),
            scripted(vec![VersionStatus::Pending], &calls),
            no_sleep,
        ))
        .unwrap();

        assert_eq!(
            outcome,
            WaitOutcome::TimedOut {
                attempts: 1,
                elapsed: Duration::ZERO,
                last_status: VersionStatus::Pending,
            }
        );
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_not_found_is_immediate() {
        let calls = Cell::new(0);
        let outcome = tokio_test::block_on(await_ready(
            "api",
            "v1",
            Duration::from_secs(600),
            &settings(20),
            scripted(vec![VersionStatus::NotFound], &calls),
            no_sleep,
        ))
        .unwrap();

        assert_eq!(outcome, WaitOutcome::NotFound { attempts: 1 });
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let calls = Cell::new(0);
        let result = tokio_test::block_on(await_ready(
            "api",
            "v1",
            Duration::from_secs(60),
            &settings(0),
            scripted(vec![VersionStatus::Ready], &calls),
            no_sleep,
        ));

        assert!(matches!(result, Err(PromoterError::ConfigError(_))));
        assert_eq!(calls.get(), 0);
    }
}
