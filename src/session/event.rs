//! Events that drive the session timer

/// Events that trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // User controls
    Start,
    Pause,
    End,

    // Scheduler
    /// One elapsed second from the ticker started for `run_id`
    Tick { run_id: u64 },
}
