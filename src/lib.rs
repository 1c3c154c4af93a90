//! # reqsmith
//!
//! HTTP request composer and executor, in the spirit of Postman/Insomnia.
//!
//! ## Features
//! - HTTP methods: GET, POST, PUT, PATCH, DELETE, HEAD, OPTIONS
//! - `{{variable}}` substitution from the active environment
//! - Auth injection (Bearer, Basic, API key, pasted OAuth2 token)
//! - URL validation with correction hints
//! - Per-request timeouts and cancellation by id
//! - Bounded request history
//! - JSON export/import, cURL import/export
//!
//! ## Architecture
//! Actor-based with channels:
//! - App Layer (state machine, history)
//! - Network Layer (Tokio runtime, in-flight registry)

pub mod app;
pub mod auth;
pub mod config;
pub mod constants;
pub mod curl;
pub mod errors;
pub mod export;
pub mod messages;
pub mod models;
pub mod network;
pub mod storage;
pub mod validation;
pub mod variables;

// Re-export commonly used types
pub use app::{AppActor, AppState};
pub use config::Settings;
pub use curl::{parse_curl, to_curl};
pub use errors::{BuildError, ErrorKind, TransportErrorKind};
pub use export::ExportDocument;
pub use messages::{AppEvent, NetworkCommand, NetworkResponse, Notification};
pub use models::{
    ApiResponse, AuthConfig, AuthKind, BodyType, Collection, Environment, HttpMethod,
    KeyValuePair, RequestDefinition, RequestHistoryItem,
};
pub use network::{build_request, BuiltRequest, NetworkActor, RequestRegistry};
pub use storage::{History, Storage};
pub use validation::{sanitize_url, validate_url_advanced, UrlState, UrlValidation};
pub use variables::substitute;
