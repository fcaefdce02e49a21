//! Uptime clock
//!
//! The agent start time is fixed the first time a snapshot reports it and
//! never replaced afterwards. The display is recomputed on its own
//! one-second cadence, independent of polling.

use chrono::{DateTime, Utc};
use std::time::{Duration, Instant};

/// Default tick period
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Fixed-rate timer driven by the frame loop
#[derive(Debug, Clone)]
pub struct Ticker {
    period: Duration,
    last: Option<Instant>,
}

impl Ticker {
    pub fn new(period: Duration) -> Self {
        Self { period, last: None }
    }

    /// Returns true (and re-arms) when a tick is due
    pub fn due(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.period => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    /// Time until the next tick, for repaint scheduling
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.period.saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        }
    }
}

/// Format elapsed seconds as zero-padded `HH:MM:SS`
pub fn format_elapsed(total_secs: i64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Agent uptime derived from a remembered start timestamp
#[derive(Debug, Clone)]
pub struct UptimeClock {
    started_at: Option<DateTime<Utc>>,
    ticker: Ticker,
    display: Option<String>,
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new(TICK_PERIOD)
    }
}

impl UptimeClock {
    pub fn new(period: Duration) -> Self {
        Self {
            started_at: None,
            ticker: Ticker::new(period),
            display: None,
        }
    }

    /// Remember the start time if none is set yet. Returns true when it was adopted.
    pub fn observe(&mut self, started_at: Option<DateTime<Utc>>) -> bool {
        match (self.started_at, started_at) {
            (None, Some(started_at)) => {
                tracing::debug!("Agent start time observed: {}", started_at);
                self.started_at = Some(started_at);
                true
            }
            _ => false,
        }
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Uptime at `now`, or `None` when unknown or the clock is skewed backwards
    pub fn render(&self, now: DateTime<Utc>) -> Option<String> {
        let elapsed = (now - self.started_at?).num_seconds();
        if elapsed < 0 {
            return None;
        }
        Some(format_elapsed(elapsed))
    }

    /// Advance the clock. A skewed tick keeps the previous display.
    pub fn tick(&mut self, now: Instant, wall: DateTime<Utc>) {
        if !self.ticker.due(now) {
            return;
        }
        if let Some(display) = self.render(wall) {
            self.display = Some(display);
        }
    }

    /// Last rendered uptime; `None` until a start time is known
    pub fn display(&self) -> Option<&str> {
        self.display.as_deref()
    }

    pub fn until_next_tick(&self, now: Instant) -> Duration {
        self.ticker.remaining(now)
    }
}
