//! App layer - central state management and command processing
//!
//! The App actor receives app events and network responses,
//! updates state, and emits network commands and notifications.

pub mod actor;
pub mod commands;
pub mod state;

pub use actor::AppActor;
pub use state::AppState;
