//! Effects produced by state transitions

use super::state::ControlVisibility;

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    /// Begin emitting one `Tick { run_id }` per second
    StartTicker { run_id: u64 },

    /// Stop the active ticker before anything else happens
    CancelTicker,

    /// Update the remaining-time text and the ring
    Render { remaining: u32, ring_offset: f64 },

    /// Toggle which controls are offered
    ShowControls(ControlVisibility),

    /// The minute ran out
    Completed,
}

impl Effect {
    #[must_use]
    pub fn render(remaining: u32, ring_offset: f64) -> Self {
        Effect::Render {
            remaining,
            ring_offset,
        }
    }
}
