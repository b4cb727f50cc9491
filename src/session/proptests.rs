//! Property-based tests for the session timer
//!
//! Event sequences are replayed through `transition` while a model of the
//! scheduler tracks how many tickers the effects would leave running.

use super::state::*;
use super::transition::*;
use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_control() -> impl Strategy<Value = Event> {
    prop_oneof![Just(Event::Start), Just(Event::Pause), Just(Event::End)]
}

/// Ticks are mostly current; `StaleTick(n)` comes from a ticker `n` runs old
#[derive(Debug, Clone, Copy)]
enum Step {
    Control(Event),
    CurrentTick,
    StaleTick(u64),
}

fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => arb_control().prop_map(Step::Control),
        4 => Just(Step::CurrentTick),
        1 => (1u64..3).prop_map(Step::StaleTick),
    ]
}

fn to_event(step: Step, state: &SessionState) -> Event {
    match step {
        Step::Control(event) => event,
        Step::CurrentTick => Event::Tick {
            run_id: state.run_id,
        },
        Step::StaleTick(age) => Event::Tick {
            run_id: state.run_id.wrapping_sub(age),
        },
    }
}

// ============================================================================
// Scheduler Model
// ============================================================================

/// Mirrors what the runtime does with ticker effects
#[derive(Debug, Default)]
struct TickerModel {
    active: Option<u64>,
}

impl TickerModel {
    fn apply(&mut self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::StartTicker { run_id } => self.active = Some(*run_id),
                Effect::CancelTicker => self.active = None,
                _ => {}
            }
        }
    }
}

fn is_valid_state(state: &SessionState, ctx: &SessionContext) -> bool {
    let in_range = state.remaining_units <= ctx.duration_units;
    let zero_only_completed =
        state.remaining_units != 0 || state.phase == SessionPhase::Completed;
    let settled_full = match state.phase {
        SessionPhase::Idle | SessionPhase::Completed => {
            state.remaining_units == ctx.duration_units
        }
        SessionPhase::Running | SessionPhase::Paused => state.remaining_units > 0,
    };
    in_range && zero_only_completed && settled_full
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    // Invariant 1: every reachable state is valid
    #[test]
    fn prop_transitions_preserve_validity(steps in proptest::collection::vec(arb_step(), 0..200)) {
        let ctx = SessionContext::default();
        let mut state = SessionState::new(&ctx);

        for step in steps {
            if let Ok(result) = transition(&state, &ctx, to_event(step, &state)) {
                state = result.new_state;
                prop_assert!(is_valid_state(&state, &ctx), "Invalid state: {:?}", state);
            }
        }
    }

    // Invariant 2: exactly one ticker while running, none otherwise
    #[test]
    fn prop_single_ticker_iff_running(steps in proptest::collection::vec(arb_step(), 0..200)) {
        let ctx = SessionContext::default();
        let mut state = SessionState::new(&ctx);
        let mut ticker = TickerModel::default();

        for step in steps {
            if let Ok(result) = transition(&state, &ctx, to_event(step, &state)) {
                ticker.apply(&result.effects);
                state = result.new_state;
            }
            if state.is_running() {
                prop_assert_eq!(ticker.active, Some(state.run_id));
            } else {
                prop_assert_eq!(ticker.active, None);
            }
        }
    }

    // Invariant 3: leaving Running always cancels the ticker first
    #[test]
    fn prop_cancel_precedes_other_effects(steps in proptest::collection::vec(arb_step(), 0..200)) {
        let ctx = SessionContext::default();
        let mut state = SessionState::new(&ctx);

        for step in steps {
            let was_running = state.is_running();
            if let Ok(result) = transition(&state, &ctx, to_event(step, &state)) {
                if was_running && !result.new_state.is_running() {
                    prop_assert_eq!(result.effects.first(), Some(&Effect::CancelTicker));
                }
                if !was_running {
                    prop_assert!(!result.effects.contains(&Effect::CancelTicker));
                }
                state = result.new_state;
            }
        }
    }

    // Invariant 4: a stale tick never changes anything
    #[test]
    fn prop_stale_ticks_rejected(
        steps in proptest::collection::vec(arb_step(), 0..100),
        age in 1u64..5,
    ) {
        let ctx = SessionContext::default();
        let mut state = SessionState::new(&ctx);
        for step in steps {
            if let Ok(result) = transition(&state, &ctx, to_event(step, &state)) {
                state = result.new_state;
            }
        }

        let stale = Event::Tick { run_id: state.run_id.wrapping_sub(age) };
        prop_assert_eq!(transition(&state, &ctx, stale).unwrap_err(), TransitionError::StaleTick);
    }

    // Invariant 5: Start while running is always rejected
    #[test]
    fn prop_double_start_rejected(ticks in 0u32..59) {
        let ctx = SessionContext::default();
        let mut state = transition(&SessionState::new(&ctx), &ctx, Event::Start).unwrap().new_state;
        for _ in 0..ticks {
            state = transition(&state, &ctx, Event::Tick { run_id: state.run_id }).unwrap().new_state;
        }
        prop_assert_eq!(
            transition(&state, &ctx, Event::Start).unwrap_err(),
            TransitionError::AlreadyRunning
        );
    }

    // Invariant 6: pause/resume at any point never restarts the count
    #[test]
    fn prop_pause_resume_preserves_remaining(
        pause_points in proptest::collection::vec(1u32..59, 1..5)
    ) {
        let ctx = SessionContext::default();
        let mut state = transition(&SessionState::new(&ctx), &ctx, Event::Start).unwrap().new_state;
        let mut elapsed = 0u32;

        for point in pause_points {
            for _ in 0..point.min(59 - elapsed) {
                state = transition(&state, &ctx, Event::Tick { run_id: state.run_id }).unwrap().new_state;
                elapsed += 1;
            }
            let before = state.remaining_units;
            state = transition(&state, &ctx, Event::Pause).unwrap().new_state;
            state = transition(&state, &ctx, Event::Start).unwrap().new_state;
            prop_assert_eq!(state.remaining_units, before);
            prop_assert_eq!(state.elapsed_units(&ctx), elapsed);
        }
    }

    // Invariant 7: End from any started phase lands on Idle with a full ring
    #[test]
    fn prop_end_resets(steps in proptest::collection::vec(arb_step(), 0..150)) {
        let ctx = SessionContext::default();
        let mut state = SessionState::new(&ctx);
        for step in steps {
            if let Ok(result) = transition(&state, &ctx, to_event(step, &state)) {
                state = result.new_state;
            }
        }

        match transition(&state, &ctx, Event::End) {
            Ok(result) => {
                prop_assert_eq!(result.new_state.phase, SessionPhase::Idle);
                prop_assert_eq!(result.new_state.remaining_units, ctx.duration_units);
                prop_assert!(result.effects.contains(&Effect::render(ctx.duration_units, 0.0)));
            }
            Err(e) => {
                prop_assert_eq!(e, TransitionError::AlreadyIdle);
                prop_assert_eq!(state.phase, SessionPhase::Idle);
            }
        }
    }
}

// Full countdown: exactly 60 ticks, ring offset never shrinks, empty at zero
#[test]
fn test_countdown_ring_is_monotonic() {
    let ctx = SessionContext::default();
    let mut state = transition(&SessionState::new(&ctx), &ctx, Event::Start)
        .unwrap()
        .new_state;
    let mut last_offset = 0.0_f64;
    let mut ticks = 0;

    loop {
        let result = transition(&state, &ctx, Event::Tick { run_id: state.run_id }).unwrap();
        ticks += 1;
        let (remaining, offset) = result
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::Render {
                    remaining,
                    ring_offset,
                } => Some((*remaining, *ring_offset)),
                _ => None,
            })
            .expect("every tick renders");

        assert_eq!(remaining, 60 - ticks);
        assert!(offset >= last_offset, "ring offset went backwards");
        last_offset = offset;
        state = result.new_state;

        if remaining == 0 {
            break;
        }
        assert!(offset < ctx.ring.circumference());
    }

    assert_eq!(ticks, 60);
    assert!((last_offset - ctx.ring.circumference()).abs() < 1e-9);
    assert_eq!(state.phase, SessionPhase::Completed);
}
