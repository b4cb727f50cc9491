//! `MindMinute` - one-minute guided reset sessions
//!
//! A countdown session timer for the front end and a rate-limited reset
//! service that turns a short utterance into four reflective bullets.

pub mod api;
pub mod client;
pub mod config;
pub mod llm;
pub mod mediator;
pub mod rate_limit;
pub mod session;
pub mod system_prompt;
