//! Application orchestration: state, event loop plumbing, input handling
//! and the background runtimes.

pub mod event;
pub mod handler;
pub mod state;
pub mod submit;
pub mod telemetry;
