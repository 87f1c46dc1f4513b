//! Market phase: which execution style (if any) is active, and what
//! submit/cancel/match operations it permits.
//!
//! The venue asks a `PhaseSource` for the current phase before acting on any
//! order; the source is the single place wall-clock time enters the system.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseType {
    Closed,
    PreOpen,
    /// The instant the market transitions from pre-open to continuous.
    /// Reported only at `open_time` itself, never as a sustained window.
    OpeningAuction,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStyle {
    None,
    Batch,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseState {
    pub phase_type: PhaseType,
    pub allow_submit: bool,
    pub allow_cancel: bool,
    pub allow_match: bool,
    pub execution_style: ExecutionStyle,
}

impl PhaseState {
    pub fn closed() -> Self {
        PhaseState {
            phase_type: PhaseType::Closed,
            allow_submit: false,
            allow_cancel: false,
            allow_match: false,
            execution_style: ExecutionStyle::None,
        }
    }

    pub fn pre_open() -> Self {
        PhaseState {
            phase_type: PhaseType::PreOpen,
            allow_submit: true,
            allow_cancel: true,
            allow_match: false,
            execution_style: ExecutionStyle::Batch,
        }
    }

    pub fn continuous() -> Self {
        PhaseState {
            phase_type: PhaseType::Continuous,
            allow_submit: true,
            allow_cancel: true,
            allow_match: true,
            execution_style: ExecutionStyle::Continuous,
        }
    }

    /// The opening-auction instant: new submissions and cancels are held
    /// back while the batch clears, matching is on.
    pub fn opening_auction() -> Self {
        PhaseState {
            phase_type: PhaseType::OpeningAuction,
            allow_submit: false,
            allow_cancel: false,
            allow_match: true,
            execution_style: ExecutionStyle::Batch,
        }
    }
}

/// A single daily trading calendar: pre-open accumulates orders without
/// matching; at `open_time` the venue should run the opening auction and
/// switch to continuous matching; at `close_time` the market closes.
pub trait PhaseSource: Send + Sync {
    fn phase_at(&self, at: DateTime<Utc>) -> PhaseState;

    /// True exactly once per day, the instant the market transitions from
    /// pre-open to continuous. Callers poll this to know when to fire the
    /// opening auction; it is not re-derivable from `phase_at` alone since
    /// that only reports a point-in-time state.
    fn is_open_instant(&self, at: DateTime<Utc>) -> bool;

    /// True exactly once per day, the instant the market closes. Callers
    /// poll this to know when to cancel every resting order.
    fn is_close_instant(&self, at: DateTime<Utc>) -> bool;
}

/// A schedule driven by wall-clock time: closed outside trading days and
/// the pre-open/continuous window, pre-open from `pre_open_time` to
/// `open_time`, continuous from `open_time` to `close_time`.
pub struct ScheduledPhaseSource {
    pub trading_days: Vec<Weekday>,
    pub pre_open_time: NaiveTime,
    pub open_time: NaiveTime,
    pub close_time: NaiveTime,
}

impl ScheduledPhaseSource {
    pub fn new(
        trading_days: Vec<Weekday>,
        pre_open_time: NaiveTime,
        open_time: NaiveTime,
        close_time: NaiveTime,
    ) -> Self {
        Self {
            trading_days,
            pre_open_time,
            open_time,
            close_time,
        }
    }
}

impl PhaseSource for ScheduledPhaseSource {
    fn phase_at(&self, at: DateTime<Utc>) -> PhaseState {
        let time = at.time();
        if !self.trading_days.contains(&at.weekday()) {
            return PhaseState::closed();
        }
        if time < self.pre_open_time || time >= self.close_time {
            PhaseState::closed()
        } else if time < self.open_time {
            PhaseState::pre_open()
        } else if time == self.open_time {
            PhaseState::opening_auction()
        } else {
            PhaseState::continuous()
        }
    }

    fn is_open_instant(&self, at: DateTime<Utc>) -> bool {
        self.trading_days.contains(&at.weekday()) && at.time() == self.open_time
    }

    fn is_close_instant(&self, at: DateTime<Utc>) -> bool {
        self.trading_days.contains(&at.weekday()) && at.time() == self.close_time
    }
}

/// Test double: always continuous, regardless of wall-clock time. Lets
/// pipeline and venue tests exercise matching without depending on a real
/// schedule.
pub struct AlwaysContinuous;

impl PhaseSource for AlwaysContinuous {
    fn phase_at(&self, _at: DateTime<Utc>) -> PhaseState {
        PhaseState::continuous()
    }

    fn is_open_instant(&self, _at: DateTime<Utc>) -> bool {
        false
    }

    fn is_close_instant(&self, _at: DateTime<Utc>) -> bool {
        false
    }
}
