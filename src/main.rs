//! reqsmith - headless runner
//!
//! Replays the requests of an exported workspace through the App and
//! Network actors and prints one line per settled request.
//!
//! Usage: `reqsmith <export.json> [request-name]`

use std::collections::{HashMap, HashSet};
use std::path::Path;

use anyhow::{bail, Context};
use tokio::sync::mpsc;

use reqsmith::constants::DEFAULT_LOG_FILE;
use reqsmith::{
    AppActor, AppEvent, AppState, ExportDocument, NetworkActor, NetworkCommand, NetworkResponse,
    Notification, RequestDefinition, Settings, Storage,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(export_path) = args.next() else {
        bail!("usage: reqsmith <export.json> [request-name]");
    };
    let only = args.next();

    let settings = Settings::load()?;

    // Initialize logging to file
    let log_dir = settings
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let log_name = settings
        .log_file
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.into());
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .init();

    let document = ExportDocument::load_from(Path::new(&export_path))
        .with_context(|| format!("Cannot load {}", export_path))?;
    let mut storage = Storage::new();
    storage.import(document);
    if let Some(first) = storage.environments.first().map(|env| env.id.clone()) {
        storage.set_active_environment(Some(&first));
    }

    let requests = select_requests(&storage, only.as_deref());
    if requests.is_empty() {
        bail!("No matching requests in {}", export_path);
    }
    let names: HashMap<String, String> = requests
        .iter()
        .map(|r| (r.id.clone(), r.name.clone()))
        .collect();

    // Create channels
    let (event_tx, event_rx) = mpsc::unbounded_channel::<AppEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (notify_tx, mut notify_rx) = mpsc::unbounded_channel::<Notification>();

    // Spawn network actor
    let network_actor = NetworkActor::new(&settings, net_resp_tx);
    let network = tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(AppState::with_storage(settings, storage), net_cmd_tx, notify_tx);
    let app = tokio::spawn(app_actor.run(event_rx, net_resp_rx));

    let mut remaining = requests.len();
    for request in requests {
        let _ = event_tx.send(AppEvent::Send(request));
    }

    while remaining > 0 {
        let Some(note) = notify_rx.recv().await else {
            break;
        };
        let name = names.get(note.id()).map(String::as_str).unwrap_or("?");
        print_notification(name, &note);
        if note.is_terminal() {
            remaining -= 1;
        }
    }

    let _ = event_tx.send(AppEvent::Quit);
    let state = app.await?;
    network.await?;
    tracing::info!(history = state.storage.history.len(), "Run finished");

    Ok(())
}

/// Every request of every collection, or only those named `only`.
/// Duplicate ids are sent once.
fn select_requests(storage: &Storage, only: Option<&str>) -> Vec<RequestDefinition> {
    let mut seen = HashSet::new();
    storage
        .collections
        .iter()
        .flat_map(|c| c.requests.iter())
        .filter(|r| only.map_or(true, |name| r.name == name))
        .filter(|r| seen.insert(r.id.clone()))
        .cloned()
        .collect()
}

fn print_notification(name: &str, note: &Notification) {
    match note {
        Notification::Dispatched { url, .. } => println!("SENT     {} {}", name, url),
        Notification::Rejected { kind, message, .. } => {
            println!("REJECTED {} [{}] {}", name, kind.as_str(), message)
        }
        Notification::ResponseReady { response, .. } => println!(
            "{:<8} {} {} ({} ms, {} bytes)",
            response.status, name, response.status_text, response.time_ms, response.size
        ),
        Notification::CorsBlocked { .. } => println!(
            "BLOCKED  {} - the request was blocked (CORS) or the server is unreachable",
            name
        ),
        Notification::RequestFailed { kind, message, .. } => {
            println!("FAILED   {} [{}] {}", name, kind.as_str(), message)
        }
        Notification::Cancelled { .. } => println!("CANCEL   {}", name),
    }
}
