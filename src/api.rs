//! HTTP API for the reset service

mod handlers;
mod types;

pub use handlers::create_router;
pub use types::*;

use crate::config::MAX_REQUEST_BYTES;
use crate::mediator::ResetMediator;
use std::sync::Arc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub mediator: Arc<ResetMediator>,
    /// Largest accepted request body, in bytes
    pub max_request_bytes: usize,
}

impl AppState {
    #[must_use]
    pub fn new(mediator: ResetMediator) -> Self {
        Self {
            mediator: Arc::new(mediator),
            max_request_bytes: MAX_REQUEST_BYTES,
        }
    }

    #[must_use]
    pub fn with_max_request_bytes(mut self, max_request_bytes: usize) -> Self {
        self.max_request_bytes = max_request_bytes;
        self
    }
}
