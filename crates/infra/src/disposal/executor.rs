//! Disposal executor with pacing, optional retries and burst backoff.

use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::{debug, info, warn};

use pokecull_inventory::{
    DEFAULT_RELEASE_DELAY, DisposalSchedule, RetentionPolicy, ScheduledDisposal,
};

use super::pacer::{Pace, Pacer};
use super::types::{BurstBackoff, DisposalRecord, DisposalReport, DisposalStatus, RetryPolicy};

/// Disposal executor configuration.
#[derive(Debug, Clone)]
pub struct DisposalExecutorConfig {
    /// Pause after each completed release call
    pub release_delay: Duration,
    /// Retries of a single failed call
    pub retry: RetryPolicy,
    /// Pause after consecutive failures (off by default)
    pub burst_backoff: Option<BurstBackoff>,
    /// Name for logging
    pub name: String,
}

impl Default for DisposalExecutorConfig {
    fn default() -> Self {
        Self {
            release_delay: DEFAULT_RELEASE_DELAY,
            retry: RetryPolicy::no_retry(),
            burst_backoff: None,
            name: "disposal".to_string(),
        }
    }
}

impl DisposalExecutorConfig {
    pub fn from_policy(policy: &RetentionPolicy) -> Self {
        Self {
            release_delay: policy.release_delay(),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_release_delay(mut self, delay: Duration) -> Self {
        self.release_delay = delay;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_burst_backoff(mut self, burst: BurstBackoff) -> Self {
        self.burst_backoff = Some(burst);
        self
    }
}

/// Runs a disposal schedule, one call at a time.
#[derive(Debug, Clone, Default)]
pub struct DisposalExecutor {
    config: DisposalExecutorConfig,
}

impl DisposalExecutor {
    pub fn new(config: DisposalExecutorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DisposalExecutorConfig {
        &self.config
    }

    /// Execute `schedule`, issuing exactly one `release` per entry (plus retries
    /// when the policy allows them).
    ///
    /// After a successful call the configured delay is waited before the next
    /// call. A failed call skips the delay. The loop never aborts on failures;
    /// it stops early only when `pacer` reports cancellation, in which case the
    /// remaining entries are recorded as `NotAttempted`.
    pub fn run<P, F, E>(
        &self,
        schedule: &DisposalSchedule,
        pacer: &mut P,
        mut release: F,
    ) -> DisposalReport
    where
        P: Pacer + ?Sized,
        F: FnMut(&ScheduledDisposal) -> Result<(), E>,
        E: core::fmt::Display,
    {
        let entries = schedule.entries();
        let mut report = DisposalReport::default();
        let mut consecutive_failures: u32 = 0;

        info!(
            executor = %self.config.name,
            scheduled = entries.len(),
            delay_ms = self.config.release_delay.as_millis() as u64,
            "disposal run started"
        );

        for (index, entry) in entries.iter().enumerate() {
            if pacer.is_cancelled() {
                report.cancelled = true;
                break;
            }

            let record = self.execute_entry(entry, pacer, &mut release);
            let released = record.status == DisposalStatus::Released;
            report.records.push(record);

            let has_next = index + 1 < entries.len();
            let pause = if released {
                consecutive_failures = 0;
                Some(self.config.release_delay)
            } else {
                consecutive_failures += 1;
                self.burst_pause(consecutive_failures)
            };

            if let Some(delay) = pause.filter(|_| has_next) {
                if pacer.wait(delay) == Pace::Cancelled {
                    report.cancelled = true;
                    break;
                }
            }
        }

        if report.cancelled {
            let done = report.records.len();
            warn!(
                executor = %self.config.name,
                remaining = entries.len() - done,
                "disposal run cancelled; remaining entries not attempted"
            );
            report
                .records
                .extend(entries[done..].iter().map(DisposalRecord::not_attempted));
        }

        let stats = report.stats();
        info!(
            executor = %self.config.name,
            released = stats.released,
            failed = stats.failed,
            not_attempted = stats.not_attempted,
            retries = stats.retries,
            "disposal run finished"
        );

        report
    }

    fn execute_entry<P, F, E>(
        &self,
        entry: &ScheduledDisposal,
        pacer: &mut P,
        release: &mut F,
    ) -> DisposalRecord
    where
        P: Pacer + ?Sized,
        F: FnMut(&ScheduledDisposal) -> Result<(), E>,
        E: core::fmt::Display,
    {
        let started = Instant::now();
        let mut attempts: u32 = 0;

        let status = loop {
            attempts += 1;
            match release(entry) {
                Ok(()) => {
                    info!(
                        item_id = %entry.item_id,
                        species_id = %entry.species_id,
                        cp = entry.combat_power,
                        reason = %entry.reason,
                        "released"
                    );
                    break DisposalStatus::Released;
                }
                Err(error) if self.config.retry.should_retry(attempts) => {
                    let delay = self.config.retry.delay_for_attempt(attempts);
                    debug!(
                        item_id = %entry.item_id,
                        attempt = attempts,
                        error = %error,
                        delay_ms = delay.as_millis() as u64,
                        "release failed; retrying"
                    );
                    if pacer.wait(delay) == Pace::Cancelled {
                        break DisposalStatus::Failed {
                            error: error.to_string(),
                        };
                    }
                }
                Err(error) => {
                    warn!(
                        item_id = %entry.item_id,
                        attempts,
                        error = %error,
                        "release failed; item stays in inventory"
                    );
                    break DisposalStatus::Failed {
                        error: error.to_string(),
                    };
                }
            }
        };

        DisposalRecord {
            entry: entry.clone(),
            status,
            attempts,
            finished_at: Some(Utc::now()),
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }

    fn burst_pause(&self, consecutive_failures: u32) -> Option<Duration> {
        let burst = self.config.burst_backoff.as_ref()?;
        let pause = burst.pause_after(consecutive_failures)?;
        warn!(
            executor = %self.config.name,
            consecutive_failures,
            pause_ms = pause.as_millis() as u64,
            "repeated release failures; rate limit suspected, backing off"
        );
        Some(pause)
    }
}
