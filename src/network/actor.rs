//! Network actor - runs HTTP requests in the Tokio async runtime

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::config::Settings;
use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::client::{create_client, execute_request};
use crate::network::registry::RequestRegistry;

/// Network actor that processes HTTP request commands
pub struct NetworkActor {
    client: reqwest::Client,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
    registry: RequestRegistry,
}

impl NetworkActor {
    pub fn new(settings: &Settings, response_tx: mpsc::UnboundedSender<NetworkResponse>) -> Self {
        Self::with_client(create_client(settings), response_tx)
    }

    pub fn with_client(
        client: reqwest::Client,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            client,
            response_tx,
            active_requests: JoinSet::new(),
            registry: RequestRegistry::new(),
        }
    }

    /// Shared view of the in-flight table, for status queries
    pub fn registry(&self) -> RequestRegistry {
        self.registry.clone()
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                // Handle incoming commands
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Execute { request, timeout_ms }) => {
                            let response_tx = self.response_tx.clone();
                            let client = self.client.clone();
                            let registry = self.registry.clone();

                            // One task per send; each owns its timer and cancel token
                            self.active_requests.spawn(async move {
                                let id = request.id.clone();
                                let timeout = Duration::from_millis(timeout_ms);
                                let response = execute_request(&client, request, timeout, &registry).await;
                                let _ = response_tx.send(NetworkResponse::Completed { id, response });
                            });
                        }

                        Some(NetworkCommand::Cancel(id)) => {
                            if self.registry.cancel(&id) {
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::CancelAll) => {
                            let cancelled = self.registry.cancel_all();
                            tracing::info!(count = cancelled.len(), "Cancelled all requests");
                            for id in cancelled {
                                let _ = self.response_tx.send(NetworkResponse::Cancelled { id });
                            }
                        }

                        Some(NetworkCommand::Shutdown) => {
                            self.registry.cancel_all();
                            break;
                        }

                        None => break,
                    }
                }

                // Clean up completed tasks
                Some(result) = self.active_requests.join_next() => {
                    if let Err(e) = result {
                        tracing::error!("Request task failed: {}", e);
                    }
                }
            }
        }

        // Let cancelled sends report their final response
        while self.active_requests.join_next().await.is_some() {}
    }
}
