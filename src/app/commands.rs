//! Command handlers - business logic for processing app events

use crate::app::AppState;
use crate::errors::{BuildError, TransportErrorKind};
use crate::messages::{NetworkCommand, NetworkResponse, Notification};
use crate::models::{ApiResponse, Environment, RequestDefinition, RequestHistoryItem};
use crate::network::builder::build_request;

impl AppState {
    // ========================
    // Environments
    // ========================

    pub fn select_environment(&mut self, id: Option<String>) -> bool {
        let selected = self.storage.set_active_environment(id.as_deref());
        if !selected {
            tracing::warn!(id = ?id, "Unknown environment");
        }
        selected
    }

    pub fn upsert_environment(&mut self, environment: Environment) {
        self.storage.upsert_environment(environment);
    }

    // ========================
    // Request sending
    // ========================

    /// Build the request against the active environment. A build failure
    /// comes back here and nothing is dispatched.
    pub fn prepare_request(
        &mut self,
        request: RequestDefinition,
    ) -> Result<NetworkCommand, BuildError> {
        let built = build_request(&request, self.storage.current_environment()).map_err(|e| {
            tracing::warn!(id = %request.id, kind = e.kind().as_str(), "Request rejected: {}", e);
            e
        })?;

        if self.is_pending(&request.id) {
            tracing::warn!(id = %request.id, "Request id already in flight");
        }
        self.push_pending(request);

        Ok(NetworkCommand::Execute {
            request: built,
            timeout_ms: self.settings.request_timeout_ms,
        })
    }

    /// Cancel a pending request
    pub fn cancel_request(&self, id: &str) -> Option<NetworkCommand> {
        self.is_pending(id)
            .then(|| NetworkCommand::Cancel(id.to_string()))
    }

    pub fn cancel_all(&self) -> Option<NetworkCommand> {
        (!self.pending.is_empty()).then_some(NetworkCommand::CancelAll)
    }

    // ========================
    // Response handling
    // ========================

    /// Record a settled send in history and describe it for the presentation layer
    pub fn handle_response(&mut self, response: NetworkResponse) -> Option<Notification> {
        match response {
            NetworkResponse::Completed { id, response } => {
                let Some(request) = self.pop_pending(&id) else {
                    tracing::debug!(id = %id, "Ignoring response for unknown request");
                    return None;
                };
                self.storage
                    .history
                    .record(RequestHistoryItem::new(request, response.clone()));
                self.last_response = Some(response.clone());
                Some(notification_for(id, response))
            }
            NetworkResponse::Cancelled { id } => {
                self.is_pending(&id).then_some(Notification::Cancelled { id })
            }
        }
    }
}

fn notification_for(id: String, response: ApiResponse) -> Notification {
    match response.error {
        None => Notification::ResponseReady { id, response },
        Some(TransportErrorKind::CorsOrNetwork) => Notification::CorsBlocked { id, response },
        Some(kind) => {
            let message = response
                .data
                .get("error")
                .and_then(|v| v.as_str())
                .unwrap_or("Request failed")
                .to_string();
            Notification::RequestFailed {
                id,
                kind: kind.kind(),
                message,
                response,
            }
        }
    }
}
