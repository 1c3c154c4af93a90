//! Network messages - communication between App and Network layers

use crate::models::ApiResponse;
use crate::network::builder::BuiltRequest;

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone)]
pub enum NetworkCommand {
    /// Execute a built request with its own timeout
    Execute {
        request: BuiltRequest,
        timeout_ms: u64,
    },
    /// Cancel a pending request
    Cancel(String),
    /// Cancel every pending request
    CancelAll,
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    /// A send settled; failures arrive here too, as status-0 responses
    Completed { id: String, response: ApiResponse },
    /// A cancel command found the request in flight
    Cancelled { id: String },
}

impl NetworkResponse {
    /// Get the request ID from the response
    pub fn id(&self) -> &str {
        match self {
            NetworkResponse::Completed { id, .. } => id,
            NetworkResponse::Cancelled { id } => id,
        }
    }

    /// Check if this is a terminal response (no more messages expected for this id)
    pub fn is_terminal(&self) -> bool {
        matches!(self, NetworkResponse::Completed { .. })
    }
}
