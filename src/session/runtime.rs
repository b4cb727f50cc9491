//! Session runtime: drives the pure state machine with a real ticker
//!
//! Controls arrive on one channel, ticks on another. Controls are polled
//! first, and ticker cancellation happens inline while applying effects, so
//! no tick is processed between a pause/end and the cancellation it causes.
//! Ticks that were already queued carry an old `run_id` and are rejected by
//! the state machine.

use super::state::{ControlVisibility, SessionContext, SessionState};
use super::{transition, Effect, Event, TransitionError};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Presentation layer for a session
pub trait SessionView: Send + 'static {
    /// Remaining-time text and ring offset changed
    fn render(&mut self, remaining: u32, ring_offset: f64);

    /// Available controls changed
    fn show_controls(&mut self, controls: ControlVisibility);

    /// The minute ran out
    fn completed(&mut self);
}

/// Why a control was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ControlError {
    #[error(transparent)]
    Rejected(#[from] TransitionError),
    #[error("Session runtime has stopped")]
    Stopped,
}

/// User control paired with the channel that reports its outcome
struct Control {
    event: Event,
    reply: oneshot::Sender<Result<SessionState, TransitionError>>,
}

/// Handle to interact with a running session
///
/// Each control resolves once the runtime has applied it (or refused it),
/// so `state()` already reflects the change when the call returns.
#[derive(Clone)]
pub struct SessionHandle {
    control_tx: mpsc::Sender<Control>,
    state_rx: watch::Receiver<SessionState>,
}

impl SessionHandle {
    /// Start or resume the countdown.
    ///
    /// # Errors
    ///
    /// `Rejected(AlreadyRunning)` while running, `Stopped` once the runtime
    /// has exited.
    pub async fn start(&self) -> Result<SessionState, ControlError> {
        self.send(Event::Start).await
    }

    /// Freeze the countdown.
    ///
    /// # Errors
    ///
    /// `Rejected(NotRunning)` unless running, `Stopped` once the runtime has
    /// exited.
    pub async fn pause(&self) -> Result<SessionState, ControlError> {
        self.send(Event::Pause).await
    }

    /// Reset to a full, idle minute.
    ///
    /// # Errors
    ///
    /// `Rejected(AlreadyIdle)` when idle, `Stopped` once the runtime has
    /// exited.
    pub async fn end(&self) -> Result<SessionState, ControlError> {
        self.send(Event::End).await
    }

    /// Latest state published by the runtime
    #[must_use]
    pub fn state(&self) -> SessionState {
        *self.state_rx.borrow()
    }

    async fn send(&self, event: Event) -> Result<SessionState, ControlError> {
        let (reply, outcome) = oneshot::channel();
        self.control_tx
            .send(Control { event, reply })
            .await
            .map_err(|_| ControlError::Stopped)?;
        let applied = outcome.await.map_err(|_| ControlError::Stopped)?;
        applied.map_err(ControlError::from)
    }
}

pub struct SessionRuntime<V: SessionView> {
    context: SessionContext,
    state: SessionState,
    view: V,
    control_rx: mpsc::Receiver<Control>,
    tick_rx: mpsc::Receiver<Event>,
    tick_tx: mpsc::Sender<Event>,
    state_tx: watch::Sender<SessionState>,
    /// Token for the one active ticker, if any
    ticker_cancel: Option<CancellationToken>,
}

impl<V: SessionView> SessionRuntime<V> {
    #[must_use]
    pub fn new(context: SessionContext, view: V) -> (Self, SessionHandle) {
        let state = SessionState::new(&context);
        let (control_tx, control_rx) = mpsc::channel(16);
        let (tick_tx, tick_rx) = mpsc::channel(16);
        let (state_tx, state_rx) = watch::channel(state);

        let runtime = Self {
            context,
            state,
            view,
            control_rx,
            tick_rx,
            tick_tx,
            state_tx,
            ticker_cancel: None,
        };
        let handle = SessionHandle {
            control_tx,
            state_rx,
        };
        (runtime, handle)
    }

    /// Spawn the runtime; the task ends once every handle is dropped.
    #[must_use]
    pub fn spawn(context: SessionContext, view: V) -> (SessionHandle, JoinHandle<V>) {
        let (runtime, handle) = Self::new(context, view);
        (handle, tokio::spawn(runtime.run()))
    }

    pub async fn run(mut self) -> V {
        tracing::debug!(units = self.context.duration_units, "Session runtime started");

        loop {
            tokio::select! {
                biased;

                control = self.control_rx.recv() => match control {
                    Some(Control { event, reply }) => {
                        // The caller may have stopped waiting; the event still counts
                        let _ = reply.send(self.process_event(event));
                    }
                    None => break,
                },
                Some(tick) = self.tick_rx.recv() => {
                    let _ = self.process_event(tick);
                }
            }
        }

        self.cancel_ticker();
        tracing::debug!("Session runtime stopped");
        self.view
    }

    fn process_event(&mut self, event: Event) -> Result<SessionState, TransitionError> {
        let result = transition(&self.state, &self.context, event).inspect_err(|e| {
            tracing::debug!(?event, phase = ?self.state.phase, error = %e, "Ignoring session event");
        })?;

        self.state = result.new_state;
        for effect in result.effects {
            self.execute_effect(effect);
        }
        self.state_tx.send_replace(self.state);
        Ok(self.state)
    }

    fn execute_effect(&mut self, effect: Effect) {
        match effect {
            Effect::StartTicker { run_id } => self.start_ticker(run_id),
            Effect::CancelTicker => self.cancel_ticker(),
            Effect::Render {
                remaining,
                ring_offset,
            } => self.view.render(remaining, ring_offset),
            Effect::ShowControls(controls) => self.view.show_controls(controls),
            Effect::Completed => {
                tracing::info!("Session minute completed");
                self.view.completed();
            }
        }
    }

    fn start_ticker(&mut self, run_id: u64) {
        // The state machine only starts from a non-running phase, so this
        // should already be empty
        self.cancel_ticker();

        let token = CancellationToken::new();
        self.ticker_cancel = Some(token.clone());
        let tick_tx = self.tick_tx.clone();

        tokio::spawn(async move {
            let mut ticks = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            loop {
                tokio::select! {
                    biased;

                    () = token.cancelled() => break,
                    _ = ticks.tick() => {
                        if tick_tx.send(Event::Tick { run_id }).await.is_err() {
                            break;
                        }
                    }
                }
            }
        });
    }

    fn cancel_ticker(&mut self) {
        if let Some(token) = self.ticker_cancel.take() {
            token.cancel();
        }
    }
}
