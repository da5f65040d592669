//! Time-derived lifecycle status.
//!
//! A windowed resource moves `Scheduled → Active → Expired` as wall-clock time
//! passes, with no mutation and no persisted field. The status is recomputed
//! on every view from an injected "now".

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::ConsoleError;

/// Lifecycle label shown next to a resource.
///
/// `Scheduled`/`Active`/`Expired` come from a time window; `Active`/`Inactive`
/// come from a persisted status field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Status {
    Scheduled,
    Active,
    Expired,
    Inactive,
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Scheduled => "Scheduled",
            Self::Active => "Active",
            Self::Expired => "Expired",
            Self::Inactive => "Inactive",
        };
        f.write_str(label)
    }
}

impl FromStr for Status {
    type Err = ConsoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "inactive" => Ok(Self::Inactive),
            other => Err(ConsoleError::Validation(format!(
                "Unknown status '{other}'"
            ))),
        }
    }
}

/// Derive the lifecycle status of a window at `now`.
pub fn derive_status(
    time_start: DateTime<Utc>,
    time_end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Status {
    if now < time_start {
        Status::Scheduled
    } else if now > time_end {
        Status::Expired
    } else {
        Status::Active
    }
}

/// A validated `[start, end]` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Build a window, rejecting `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConsoleError> {
        if start > end {
            return Err(ConsoleError::Validation(format!(
                "Time window starts ({start}) after it ends ({end})"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse an RFC 3339 window as sent by the upstream API.
    pub fn parse(start: &str, end: &str) -> Result<Self, ConsoleError> {
        let parse = |raw: &str| {
            DateTime::parse_from_rfc3339(raw.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| ConsoleError::Validation(format!("Invalid timestamp '{raw}': {e}")))
        };
        Self::new(parse(start)?, parse(end)?)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> Status {
        derive_status(self.start, self.end, now)
    }
}

/// Source of "now" for everything that derives status.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
