//! One-minute session timer
//!
//! Pure state transitions in the Elm style: `transition(state, event)`
//! returns the next state plus effects, and `runtime` turns the effects into
//! a ticking scheduler and view updates.

mod effect;
pub mod event;
pub mod runtime;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use runtime::{ControlError, SessionHandle, SessionRuntime, SessionView};
pub use state::{ControlVisibility, RingGeometry, SessionContext, SessionPhase, SessionState};
pub use transition::{transition, TransitionError, TransitionResult};
