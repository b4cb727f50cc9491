//! Pure state transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O. Any transition that leaves `Running` lists
//! `CancelTicker` as its first effect.

use super::state::{ControlVisibility, SessionContext, SessionPhase, SessionState};
use super::{Effect, Event};
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: SessionState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    #[must_use]
    pub fn new(state: SessionState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    #[must_use]
    pub fn with_effects(mut self, effects: impl IntoIterator<Item = Effect>) -> Self {
        self.effects.extend(effects);
        self
    }
}

/// Control pressed in a phase that does not accept it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("Session is already running")]
    AlreadyRunning,
    #[error("Session is not running")]
    NotRunning,
    #[error("Session has not started")]
    AlreadyIdle,
    #[error("Tick from a cancelled ticker")]
    StaleTick,
}

/// Apply one event to the session.
///
/// # Errors
///
/// Returns a [`TransitionError`] when the event is not valid in the
/// current phase; the state is then left unchanged.
pub fn transition(
    state: &SessionState,
    context: &SessionContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (state.phase, event) {
        // ============================================================
        // Start / resume
        // ============================================================

        // One ticker at a time
        (SessionPhase::Running, Event::Start) => Err(TransitionError::AlreadyRunning),

        // Paused keeps its remaining count; Idle and Completed are already at full
        (SessionPhase::Idle | SessionPhase::Paused | SessionPhase::Completed, Event::Start) => {
            let run_id = state.run_id.wrapping_add(1);
            Ok(TransitionResult::new(SessionState {
                remaining_units: state.remaining_units,
                phase: SessionPhase::Running,
                run_id,
            })
            .with_effect(Effect::StartTicker { run_id })
            .with_effect(Effect::ShowControls(ControlVisibility::RUNNING)))
        }

        // ============================================================
        // Ticks
        // ============================================================
        (SessionPhase::Running, Event::Tick { run_id }) if run_id == state.run_id => {
            let remaining = state.remaining_units.saturating_sub(1);
            if remaining > 0 {
                return Ok(TransitionResult::new(SessionState {
                    remaining_units: remaining,
                    ..*state
                })
                .with_effect(Effect::render(remaining, context.ring_offset(remaining))));
            }

            // Minute is up: show the empty ring, then the same cleanup as End
            Ok(TransitionResult::new(SessionState {
                remaining_units: context.duration_units,
                phase: SessionPhase::Completed,
                run_id: state.run_id,
            })
            .with_effect(Effect::CancelTicker)
            .with_effect(Effect::render(0, context.ring_offset(0)))
            .with_effect(Effect::Completed)
            .with_effects(reset_effects(context)))
        }

        (_, Event::Tick { .. }) => Err(TransitionError::StaleTick),

        // ============================================================
        // Pause
        // ============================================================
        (SessionPhase::Running, Event::Pause) => Ok(TransitionResult::new(SessionState {
            phase: SessionPhase::Paused,
            ..*state
        })
        .with_effect(Effect::CancelTicker)
        .with_effect(Effect::ShowControls(ControlVisibility::PAUSED))),

        (_, Event::Pause) => Err(TransitionError::NotRunning),

        // ============================================================
        // End
        // ============================================================
        (SessionPhase::Idle, Event::End) => Err(TransitionError::AlreadyIdle),

        (SessionPhase::Running, Event::End) => Ok(TransitionResult::new(idle(state, context))
            .with_effect(Effect::CancelTicker)
            .with_effects(reset_effects(context))),

        (SessionPhase::Paused | SessionPhase::Completed, Event::End) => {
            Ok(TransitionResult::new(idle(state, context)).with_effects(reset_effects(context)))
        }
    }
}

fn idle(state: &SessionState, context: &SessionContext) -> SessionState {
    SessionState {
        remaining_units: context.duration_units,
        phase: SessionPhase::Idle,
        run_id: state.run_id,
    }
}

/// Full counter, full ring, initial controls
fn reset_effects(context: &SessionContext) -> [Effect; 2] {
    [
        Effect::render(context.duration_units, context.ring_offset(context.duration_units)),
        Effect::ShowControls(ControlVisibility::INITIAL),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> SessionContext {
        SessionContext::default()
    }

    fn apply(state: &SessionState, event: Event) -> TransitionResult {
        transition(state, &ctx(), event).expect("transition should succeed")
    }

    fn tick(state: &SessionState) -> Event {
        Event::Tick {
            run_id: state.run_id,
        }
    }

    #[test]
    fn test_start_from_idle() {
        let state = SessionState::default();
        let result = apply(&state, Event::Start);
        assert_eq!(result.new_state.phase, SessionPhase::Running);
        assert_eq!(result.new_state.remaining_units, 60);
        assert_eq!(
            result.effects,
            vec![
                Effect::StartTicker {
                    run_id: result.new_state.run_id
                },
                Effect::ShowControls(ControlVisibility::RUNNING),
            ]
        );
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let running = apply(&SessionState::default(), Event::Start).new_state;
        assert_eq!(
            transition(&running, &ctx(), Event::Start).unwrap_err(),
            TransitionError::AlreadyRunning
        );
    }

    #[test]
    fn test_tick_counts_down() {
        let running = apply(&SessionState::default(), Event::Start).new_state;
        let result = apply(&running, tick(&running));
        assert_eq!(result.new_state.remaining_units, 59);
        assert_eq!(result.new_state.phase, SessionPhase::Running);
        assert_eq!(result.effects.len(), 1);
        match result.effects[0] {
            Effect::Render {
                remaining,
                ring_offset,
            } => {
                assert_eq!(remaining, 59);
                let expected = ctx().ring.circumference() / 60.0;
                assert!((ring_offset - expected).abs() < 1e-9);
            }
            other => panic!("Expected Render, got {other:?}"),
        }
    }

    #[test]
    fn test_sixty_ticks_complete() {
        let mut state = apply(&SessionState::default(), Event::Start).new_state;
        for i in 1..60 {
            state = apply(&state, tick(&state)).new_state;
            assert_eq!(state.remaining_units, 60 - i);
            assert!(state.is_running());
        }

        let result = apply(&state, tick(&state));
        assert_eq!(result.new_state.phase, SessionPhase::Completed);
        assert_eq!(result.new_state.remaining_units, 60);
        assert_eq!(result.effects[0], Effect::CancelTicker);
        assert!(result.effects.contains(&Effect::Completed));
        assert!(result.effects.contains(&Effect::render(0, ctx().ring.circumference())));
        assert_eq!(
            result.effects.last(),
            Some(&Effect::ShowControls(ControlVisibility::INITIAL))
        );
    }

    #[test]
    fn test_pause_keeps_remaining_and_resume_continues() {
        let mut state = apply(&SessionState::default(), Event::Start).new_state;
        for _ in 0..15 {
            state = apply(&state, tick(&state)).new_state;
        }

        let paused = apply(&state, Event::Pause);
        assert_eq!(paused.new_state.phase, SessionPhase::Paused);
        assert_eq!(paused.new_state.remaining_units, 45);
        assert_eq!(paused.effects[0], Effect::CancelTicker);
        assert_eq!(
            paused.effects[1],
            Effect::ShowControls(ControlVisibility::PAUSED)
        );

        let resumed = apply(&paused.new_state, Event::Start).new_state;
        assert_eq!(resumed.remaining_units, 45);
        let next = apply(&resumed, tick(&resumed)).new_state;
        assert_eq!(next.remaining_units, 44);
    }

    #[test]
    fn test_stale_tick_after_pause_and_resume() {
        let first_run = apply(&SessionState::default(), Event::Start).new_state;
        let stale = tick(&first_run);
        let paused = apply(&first_run, Event::Pause).new_state;
        assert_eq!(
            transition(&paused, &ctx(), stale).unwrap_err(),
            TransitionError::StaleTick
        );

        let second_run = apply(&paused, Event::Start).new_state;
        assert_ne!(second_run.run_id, first_run.run_id);
        assert_eq!(
            transition(&second_run, &ctx(), stale).unwrap_err(),
            TransitionError::StaleTick
        );
    }

    #[test]
    fn test_end_from_running_resets() {
        let mut state = apply(&SessionState::default(), Event::Start).new_state;
        state = apply(&state, tick(&state)).new_state;

        let result = apply(&state, Event::End);
        assert_eq!(result.new_state.phase, SessionPhase::Idle);
        assert_eq!(result.new_state.remaining_units, 60);
        assert_eq!(
            result.effects,
            vec![
                Effect::CancelTicker,
                Effect::render(60, 0.0),
                Effect::ShowControls(ControlVisibility::INITIAL),
            ]
        );
    }

    #[test]
    fn test_end_from_paused_has_no_ticker_to_cancel() {
        let running = apply(&SessionState::default(), Event::Start).new_state;
        let paused = apply(&running, Event::Pause).new_state;
        let result = apply(&paused, Event::End);
        assert_eq!(result.new_state.phase, SessionPhase::Idle);
        assert!(!result.effects.contains(&Effect::CancelTicker));
    }

    #[test]
    fn test_end_from_completed_returns_to_idle() {
        let completed = SessionState {
            phase: SessionPhase::Completed,
            ..SessionState::default()
        };
        let result = apply(&completed, Event::End);
        assert_eq!(result.new_state.phase, SessionPhase::Idle);
        assert_eq!(result.new_state.remaining_units, 60);
    }

    #[test]
    fn test_invalid_controls() {
        let idle = SessionState::default();
        assert_eq!(
            transition(&idle, &ctx(), Event::Pause).unwrap_err(),
            TransitionError::NotRunning
        );
        assert_eq!(
            transition(&idle, &ctx(), Event::End).unwrap_err(),
            TransitionError::AlreadyIdle
        );
        assert_eq!(
            transition(&idle, &ctx(), Event::Tick { run_id: 0 }).unwrap_err(),
            TransitionError::StaleTick
        );
    }
}
