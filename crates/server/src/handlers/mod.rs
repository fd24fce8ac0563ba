//! # API Route Handlers
//!
//! This module organizes the Axum route handlers for `prodspec-server`.

pub mod events;
pub mod general;

// Re-export all handlers so the router can reach them under `handlers::`.
pub use events::*;
pub use general::*;

use super::state::AppState;
