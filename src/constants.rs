//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Application name
pub const APP_NAME: &str = "reqsmith";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Per-request timeout used when no setting overrides it
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Maximum number of entries kept in the request history
pub const MAX_HISTORY: usize = 50;

/// Version stamped into exported documents
pub const EXPORT_FORMAT_VERSION: &str = "1.0.0";

/// Default log file for the headless runner
pub const DEFAULT_LOG_FILE: &str = "reqsmith.log";
