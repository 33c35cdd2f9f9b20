//! Time sources.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;

/// Source of the node's network-adjusted wall-clock time.
pub trait Clock: Send + Sync {
    /// Current adjusted time as a unix timestamp in seconds.
    fn adjusted_unix_timestamp(&self) -> i64;
}

/// System clock with an optional peer-derived offset.
#[derive(Debug, Default)]
pub struct SystemClock {
    offset_secs: AtomicI64,
}

impl SystemClock {
    /// Create a clock with no offset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the offset applied on top of the local clock.
    pub fn set_offset(&self, secs: i64) {
        self.offset_secs.store(secs, Ordering::Relaxed);
    }
}

impl Clock for SystemClock {
    fn adjusted_unix_timestamp(&self) -> i64 {
        Utc::now().timestamp() + self.offset_secs.load(Ordering::Relaxed)
    }
}

/// Manually driven clock for tests and simulations.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicI64,
}

impl ManualClock {
    /// Create a clock frozen at `now`.
    pub fn new(now: i64) -> Self {
        Self {
            now: AtomicI64::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::Relaxed);
    }

    /// Advance the clock.
    pub fn advance(&self, secs: i64) {
        self.now.fetch_add(secs, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn adjusted_unix_timestamp(&self) -> i64 {
        self.now.load(Ordering::Relaxed)
    }
}

/// Clamp a unix timestamp into the 32-bit header time range.
pub fn to_header_time(unix: i64) -> u32 {
    unix.clamp(0, u32::MAX as i64) as u32
}
