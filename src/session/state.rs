//! Session timer state types

use serde::Serialize;
use std::f64::consts::PI;

/// Length of a session, in one-second ticks
pub const SESSION_UNITS: u32 = 60;

/// Radius of the progress ring, in view units
pub const RING_RADIUS: f64 = 80.0;

/// Lifecycle phase of the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Running,
    Paused,
    /// The minute finished; counter and ring are already back to full
    Completed,
}

/// Countdown state owned by the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionState {
    pub remaining_units: u32,
    pub phase: SessionPhase,
    /// Bumped on every start so ticks from a cancelled ticker can be told apart
    pub run_id: u64,
}

impl SessionState {
    #[must_use]
    pub fn new(context: &SessionContext) -> Self {
        Self {
            remaining_units: context.duration_units,
            phase: SessionPhase::Idle,
            run_id: 0,
        }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Seconds elapsed in the current run
    #[must_use]
    pub fn elapsed_units(&self, context: &SessionContext) -> u32 {
        context.duration_units.saturating_sub(self.remaining_units)
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(&SessionContext::default())
    }
}

/// Circular progress geometry, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingGeometry {
    circumference: f64,
}

impl RingGeometry {
    #[must_use]
    pub fn new(radius: f64) -> Self {
        Self {
            circumference: 2.0 * PI * radius,
        }
    }

    #[must_use]
    pub fn circumference(&self) -> f64 {
        self.circumference
    }

    /// Stroke offset for `remaining` of `total` units.
    ///
    /// Zero is a full ring; `circumference` is an empty one.
    #[must_use]
    pub fn offset(&self, remaining: u32, total: u32) -> f64 {
        if total == 0 {
            return self.circumference;
        }
        let fraction = f64::from(remaining.min(total)) / f64::from(total);
        self.circumference * (1.0 - fraction)
    }
}

impl Default for RingGeometry {
    fn default() -> Self {
        Self::new(RING_RADIUS)
    }
}

/// Which session controls the view should offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ControlVisibility {
    pub start: bool,
    pub pause: bool,
    pub end: bool,
}

impl ControlVisibility {
    pub const INITIAL: Self = Self {
        start: true,
        pause: false,
        end: false,
    };

    pub const RUNNING: Self = Self {
        start: false,
        pause: true,
        end: true,
    };

    pub const PAUSED: Self = Self {
        start: true,
        pause: false,
        end: true,
    };
}

/// Fixed parameters shared by every transition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionContext {
    pub duration_units: u32,
    pub ring: RingGeometry,
}

impl SessionContext {
    #[must_use]
    pub fn ring_offset(&self, remaining: u32) -> f64 {
        self.ring.offset(remaining, self.duration_units)
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self {
            duration_units: SESSION_UNITS,
            ring: RingGeometry::default(),
        }
    }
}
