//! Snapshot polling
//!
//! Polls are issued on a fixed interval while the dashboard is visible and
//! suspended while it is hidden; becoming visible again issues one poll
//! immediately. In-flight requests are never aborted. Requests may overlap,
//! so every poll carries a sequence number and responses older than the
//! last applied one are discarded.

use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

use crate::api::AgentClient;
use crate::error::{ApiError, ApiResult};
use crate::model::Snapshot;
use crate::task::drain_finished;

/// Smallest accepted poll interval
pub const MIN_INTERVAL: Duration = Duration::from_millis(250);

/// When the next poll is due
#[derive(Debug, Clone)]
pub struct PollSchedule {
    interval: Duration,
    next_due: Option<Instant>,
    suspended: bool,
}

impl PollSchedule {
    /// A schedule whose first poll is due immediately
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(MIN_INTERVAL),
            next_due: None,
            suspended: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_suspended(&self) -> bool {
        self.suspended
    }

    /// Returns true (and schedules the following poll) when a poll is due
    pub fn due(&mut self, now: Instant) -> bool {
        if self.suspended {
            return false;
        }
        match self.next_due {
            Some(next) if now < next => false,
            _ => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }

    /// Track visibility. Returns true when polling resumed.
    pub fn set_visible(&mut self, visible: bool) -> bool {
        match (self.suspended, visible) {
            (false, false) => {
                tracing::debug!("Dashboard hidden, suspending polls");
                self.suspended = true;
                false
            }
            (true, true) => {
                tracing::debug!("Dashboard visible again, polling now");
                self.suspended = false;
                self.next_due = None;
                true
            }
            _ => false,
        }
    }

    /// Force the next `due` check to fire
    pub fn poll_now(&mut self) {
        self.next_due = None;
    }

    /// Time until the next poll, for repaint scheduling
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        if self.suspended {
            return None;
        }
        Some(match self.next_due {
            Some(next) => next.saturating_duration_since(now),
            None => Duration::ZERO,
        })
    }
}

/// Monotonic sequence check for overlapping responses
#[derive(Debug, Clone, Default)]
pub struct SequenceGate {
    issued: u64,
    applied: u64,
}

impl SequenceGate {
    /// Sequence number for a new request
    pub fn issue(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Whether a response may be applied. Accepting advances the gate.
    pub fn admit(&mut self, seq: u64) -> bool {
        if seq <= self.applied {
            return false;
        }
        self.applied = seq;
        true
    }

    pub fn last_applied(&self) -> u64 {
        self.applied
    }
}

/// Result of a finished poll
#[derive(Debug)]
pub enum PollOutcome {
    /// Fresh snapshot to apply
    Snapshot(Snapshot),
    /// The poll failed; the previous view stays as it is
    Failed(ApiError),
    /// A newer response was already applied
    Stale { seq: u64 },
}

/// Issues snapshot polls and collects their results
pub struct SnapshotPoller {
    schedule: PollSchedule,
    gate: SequenceGate,
    in_flight: Vec<(u64, JoinHandle<ApiResult<Snapshot>>)>,
}

impl SnapshotPoller {
    pub fn new(interval: Duration) -> Self {
        Self {
            schedule: PollSchedule::new(interval),
            gate: SequenceGate::default(),
            in_flight: Vec::new(),
        }
    }

    pub fn schedule(&self) -> &PollSchedule {
        &self.schedule
    }

    pub fn schedule_mut(&mut self) -> &mut PollSchedule {
        &mut self.schedule
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Spawn a poll if one is due. Returns true when a request was issued.
    pub fn tick(&mut self, now: Instant, client: &AgentClient) -> bool {
        if !self.schedule.due(now) {
            return false;
        }
        self.spawn(client);
        true
    }

    /// Spawn a poll right away, regardless of the schedule
    pub fn spawn(&mut self, client: &AgentClient) {
        let seq = self.gate.issue();
        let client = client.clone();
        let handle = tokio::spawn(async move { client.fetch_snapshot().await });
        self.in_flight.push((seq, handle));
    }

    /// Collect finished polls in sequence order
    pub fn poll(&mut self) -> Vec<PollOutcome> {
        let mut finished = drain_finished(&mut self.in_flight);
        finished.sort_by_key(|(seq, _)| *seq);

        finished
            .into_iter()
            .map(|(seq, result)| match result {
                Ok(Ok(snapshot)) => {
                    if self.gate.admit(seq) {
                        PollOutcome::Snapshot(snapshot)
                    } else {
                        tracing::debug!(
                            "Discarding stale snapshot #{} (already applied #{})",
                            seq,
                            self.gate.last_applied()
                        );
                        PollOutcome::Stale { seq }
                    }
                }
                Ok(Err(err)) => PollOutcome::Failed(err),
                Err(join_err) => PollOutcome::Failed(ApiError::Network(format!(
                    "poll task failed: {}",
                    join_err
                ))),
            })
            .collect()
    }
}
