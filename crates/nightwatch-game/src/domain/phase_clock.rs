//! The perpetual day/night clock.
//!
//! The clock itself only remembers which phase is running and how it was
//! entered. Scheduling the end of a phase is the session's job: it puts one
//! [`PhaseTimer`] per entered phase into its timer queue and hands the timer
//! back to [`PhaseClock::is_current`] when it fires.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use nightwatch_core::error::DomainError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default length of both phases, in seconds.
pub const DEFAULT_PHASE_SECONDS: u64 = 60;

/// Longest accepted phase length, in seconds (one week).
pub const MAX_PHASE_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Coarse game state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Before the game has started.
    Waiting,
    /// Day phase.
    Day,
    /// Night phase.
    Night,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Waiting => "waiting",
            Self::Day => "day",
            Self::Night => "night",
        })
    }
}

/// A phase the clock can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseKind {
    /// Day phase.
    Day,
    /// Night phase.
    Night,
}

impl PhaseKind {
    /// The phase that follows this one.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Day => Self::Night,
            Self::Night => Self::Day,
        }
    }
}

impl From<PhaseKind> for Phase {
    fn from(kind: PhaseKind) -> Self {
        match kind {
            PhaseKind::Day => Self::Day,
            PhaseKind::Night => Self::Night,
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Phase::from(*self).fmt(f)
    }
}

impl FromStr for PhaseKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "night" => Ok(Self::Night),
            other => Err(DomainError::InvalidArgument(format!(
                "phase must be `day` or `night`, got `{other}`"
            ))),
        }
    }
}

/// Configured length of each phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PhaseDurations {
    /// Day length in seconds.
    pub day_seconds: u64,
    /// Night length in seconds.
    pub night_seconds: u64,
}

impl Default for PhaseDurations {
    fn default() -> Self {
        Self {
            day_seconds: DEFAULT_PHASE_SECONDS,
            night_seconds: DEFAULT_PHASE_SECONDS,
        }
    }
}

impl PhaseDurations {
    /// Seconds configured for `kind`.
    #[must_use]
    pub fn get(&self, kind: PhaseKind) -> u64 {
        match kind {
            PhaseKind::Day => self.day_seconds,
            PhaseKind::Night => self.night_seconds,
        }
    }

    pub(crate) fn set(&mut self, kind: PhaseKind, seconds: u64) {
        match kind {
            PhaseKind::Day => self.day_seconds = seconds,
            PhaseKind::Night => self.night_seconds = seconds,
        }
    }

    /// Validates a requested phase length.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidArgument` unless `seconds` is positive
    /// and at most [`MAX_PHASE_SECONDS`].
    pub fn validate(seconds: i64) -> Result<u64, DomainError> {
        let seconds = u64::try_from(seconds)
            .ok()
            .filter(|&s| s > 0)
            .ok_or_else(|| {
                DomainError::InvalidArgument(format!(
                    "phase length must be a positive number of seconds, got {seconds}"
                ))
            })?;
        if seconds > MAX_PHASE_SECONDS {
            return Err(DomainError::InvalidArgument(format!(
                "phase length must be at most {MAX_PHASE_SECONDS} seconds, got {seconds}"
            )));
        }
        Ok(seconds)
    }
}

/// The phase currently running, captured when it was entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunningPhase {
    /// Which phase.
    pub kind: PhaseKind,
    /// Length fixed at entry; later `settime` calls do not change it.
    pub seconds: u64,
    /// Entry instant.
    pub started_at: DateTime<Utc>,
    /// 1 for the first day, incremented on every transition.
    pub cycle: u32,
}

impl RunningPhase {
    /// Instant at which this phase ends, clamped to the latest
    /// representable instant.
    #[must_use]
    pub fn ends_at(&self) -> DateTime<Utc> {
        i64::try_from(self.seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|length| self.started_at.checked_add_signed(length))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}

/// Identifies the end of one specific phase of one specific session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimer {
    /// Session the timer was scheduled by.
    pub session_id: Uuid,
    /// Cycle of the phase the timer ends.
    pub cycle: u32,
}

/// Alternating day/night state machine. There is no terminal state.
#[derive(Debug, Clone, Default)]
pub struct PhaseClock {
    running: Option<RunningPhase>,
}

impl PhaseClock {
    /// Creates a clock that has not started.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the clock has been started.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// The phase currently in effect.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.running.map_or(Phase::Waiting, |r| r.kind.into())
    }

    /// Details of the running phase.
    #[must_use]
    pub fn running(&self) -> Option<&RunningPhase> {
        self.running.as_ref()
    }

    /// The phase to enter next and its cycle number.
    #[must_use]
    pub fn next(&self) -> (PhaseKind, u32) {
        match self.running {
            Some(r) => (r.kind.opposite(), r.cycle + 1),
            None => (PhaseKind::Day, 1),
        }
    }

    /// Records entry into a phase.
    pub fn enter(&mut self, kind: PhaseKind, seconds: u64, started_at: DateTime<Utc>, cycle: u32) {
        self.running = Some(RunningPhase {
            kind,
            seconds,
            started_at,
            cycle,
        });
    }

    /// Whether `timer` ends the phase that is running now.
    #[must_use]
    pub fn is_current(&self, session_id: Uuid, timer: &PhaseTimer) -> bool {
        timer.session_id == session_id && self.running.is_some_and(|r| r.cycle == timer.cycle)
    }
}
