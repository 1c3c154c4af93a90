//! Notifications - what the App layer reports back to the presentation layer

use crate::errors::ErrorKind;
use crate::models::ApiResponse;

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    /// The request passed building and is on the wire
    Dispatched { id: String, url: String },
    /// Building failed; nothing was sent
    Rejected {
        id: String,
        kind: ErrorKind,
        message: String,
    },
    ResponseReady { id: String, response: ApiResponse },
    /// Blocked cross-origin call or unreachable host; gets a dedicated banner
    CorsBlocked { id: String, response: ApiResponse },
    /// Any other failure; shown as a generic notice with `message`
    RequestFailed {
        id: String,
        kind: ErrorKind,
        message: String,
        response: ApiResponse,
    },
    Cancelled { id: String },
}

impl Notification {
    pub fn id(&self) -> &str {
        match self {
            Notification::Dispatched { id, .. }
            | Notification::Rejected { id, .. }
            | Notification::ResponseReady { id, .. }
            | Notification::CorsBlocked { id, .. }
            | Notification::RequestFailed { id, .. }
            | Notification::Cancelled { id } => id,
        }
    }

    /// True once no further notification will follow for this id
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Notification::Dispatched { .. } | Notification::Cancelled { .. }
        )
    }
}
