//! Disposal outcome types and retry policies.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pokecull_core::ItemId;
use pokecull_inventory::ScheduledDisposal;

/// Backoff strategy for retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffStrategy {
    /// Fixed delay between retries
    Fixed,
    /// Exponential backoff: base * 2^(attempt-1)
    #[default]
    Exponential,
    /// Linear backoff: base * attempt
    Linear,
}

/// Retry policy for a single failed release call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure (0 = no retries)
    pub max_retries: u32,
    /// Base delay between retries
    pub base_delay: Duration,
    /// Maximum delay cap
    pub max_delay: Duration,
    /// Backoff strategy
    pub strategy: BackoffStrategy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::no_retry()
    }
}

impl RetryPolicy {
    /// Failed items stay in the inventory and are reconsidered on the next run.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::from_secs(3),
            max_delay: Duration::from_secs(3),
            strategy: BackoffStrategy::Fixed,
        }
    }

    /// Create a policy with fixed delays.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: delay,
            max_delay: delay,
            strategy: BackoffStrategy::Fixed,
        }
    }

    /// Create a policy with exponential backoff.
    pub fn exponential(max_retries: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            max_delay,
            strategy: BackoffStrategy::Exponential,
        }
    }

    /// Delay before retry number `attempt` (1-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let delay = match self.strategy {
            BackoffStrategy::Fixed => self.base_delay,
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(attempt - 1);
                self.base_delay.saturating_mul(factor)
            }
            BackoffStrategy::Linear => self.base_delay.saturating_mul(attempt),
        };

        delay.min(self.max_delay)
    }

    /// `attempts` is the number of calls already made for the entry.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts <= self.max_retries
    }
}

/// Pause after a burst of consecutive failures (suspected rate limiting).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurstBackoff {
    /// Consecutive failed entries that trigger the pause.
    pub threshold: u32,
    /// Delay per burst step beyond the threshold.
    pub policy: RetryPolicy,
}

impl BurstBackoff {
    pub fn new(threshold: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            threshold: threshold.max(1),
            policy: RetryPolicy::exponential(0, base_delay, max_delay),
        }
    }

    /// Pause owed after `consecutive` failures in a row, if any.
    pub fn pause_after(&self, consecutive: u32) -> Option<Duration> {
        if consecutive < self.threshold {
            return None;
        }
        Some(self.policy.delay_for_attempt(consecutive - self.threshold + 1))
    }
}

/// What happened to one schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum DisposalStatus {
    Released,
    Failed { error: String },
    /// Never issued (run cancelled first).
    NotAttempted,
}

/// Record of one schedule entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisposalRecord {
    pub entry: ScheduledDisposal,
    #[serde(flatten)]
    pub status: DisposalStatus,
    /// Calls issued for this entry (0 when not attempted).
    pub attempts: u32,
    pub finished_at: Option<DateTime<Utc>>,
    pub duration_ms: u64,
}

impl DisposalRecord {
    pub fn item_id(&self) -> ItemId {
        self.entry.item_id
    }

    pub(crate) fn not_attempted(entry: &ScheduledDisposal) -> Self {
        Self {
            entry: entry.clone(),
            status: DisposalStatus::NotAttempted,
            attempts: 0,
            finished_at: None,
            duration_ms: 0,
        }
    }
}

/// Counters over a disposal run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisposalStats {
    pub scheduled: usize,
    pub released: usize,
    pub failed: usize,
    pub not_attempted: usize,
    pub retries: u64,
}

/// Outcome of executing a schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisposalReport {
    pub records: Vec<DisposalRecord>,
    /// True when the loop stopped early on a cancel signal.
    pub cancelled: bool,
}

impl DisposalReport {
    pub fn released(&self) -> impl Iterator<Item = &DisposalRecord> {
        self.records
            .iter()
            .filter(|r| r.status == DisposalStatus::Released)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DisposalRecord> {
        self.records
            .iter()
            .filter(|r| matches!(r.status, DisposalStatus::Failed { .. }))
    }

    pub fn not_attempted(&self) -> impl Iterator<Item = &DisposalRecord> {
        self.records
            .iter()
            .filter(|r| r.status == DisposalStatus::NotAttempted)
    }

    /// Some release calls failed; the rest of the run went ahead.
    pub fn is_partial_failure(&self) -> bool {
        self.failed().next().is_some()
    }

    pub fn stats(&self) -> DisposalStats {
        DisposalStats {
            scheduled: self.records.len(),
            released: self.released().count(),
            failed: self.failed().count(),
            not_attempted: self.not_attempted().count(),
            retries: self
                .records
                .iter()
                .map(|r| u64::from(r.attempts.saturating_sub(1)))
                .sum(),
        }
    }
}
