//! App events - commands from the editing layer to the App layer

use crate::models::{Environment, RequestDefinition};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Fire a request against the active environment
    Send(RequestDefinition),
    Cancel(String),
    CancelAll,
    /// Select the active environment by id; `None` clears it
    SelectEnvironment(Option<String>),
    UpsertEnvironment(Environment),
    Quit,
}
