//! App actor - message loop processing app events and network responses

use tokio::sync::mpsc;

use crate::app::state::AppState;
use crate::messages::{AppEvent, NetworkCommand, NetworkResponse, Notification};

/// App actor that processes app events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    notify_tx: mpsc::UnboundedSender<Notification>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        notify_tx: mpsc::UnboundedSender<Notification>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            notify_tx,
        }
    }

    /// Run the actor message loop. Returns the final state once the loop ends.
    pub async fn run(
        mut self,
        mut event_rx: mpsc::UnboundedReceiver<AppEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) -> AppState {
        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    if self.handle_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                }
                Some(response) = net_rx.recv() => {
                    if let Some(note) = self.state.handle_response(response) {
                        let _ = self.notify_tx.send(note);
                    }
                }
                else => break,
            }
        }
        self.state
    }

    /// Handle an app event, returns true if quit was requested
    fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Send(request) => {
                let id = request.id.clone();
                match self.state.prepare_request(request) {
                    Ok(cmd) => {
                        let url = match &cmd {
                            NetworkCommand::Execute { request, .. } => request.url.to_string(),
                            _ => String::new(),
                        };
                        let _ = self.network_tx.send(cmd);
                        let _ = self.notify_tx.send(Notification::Dispatched { id, url });
                    }
                    Err(e) => {
                        let _ = self.notify_tx.send(Notification::Rejected {
                            id,
                            kind: e.kind(),
                            message: e.to_string(),
                        });
                    }
                }
            }
            AppEvent::Cancel(id) => {
                if let Some(cmd) = self.state.cancel_request(&id) {
                    let _ = self.network_tx.send(cmd);
                }
            }
            AppEvent::CancelAll => {
                if let Some(cmd) = self.state.cancel_all() {
                    let _ = self.network_tx.send(cmd);
                }
            }
            AppEvent::SelectEnvironment(id) => {
                self.state.select_environment(id);
            }
            AppEvent::UpsertEnvironment(environment) => self.state.upsert_environment(environment),
            AppEvent::Quit => return true,
        }

        false
    }
}
