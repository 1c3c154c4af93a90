//! App state - pure data structure with no I/O logic

use std::collections::{HashMap, VecDeque};

use crate::config::Settings;
use crate::models::{ApiResponse, RequestDefinition};
use crate::storage::Storage;

/// Main application state - pure data, no I/O
pub struct AppState {
    pub settings: Settings,

    // Storage (collections, environments, history)
    pub storage: Storage,

    // Definition snapshots of dispatched sends, oldest first per request id
    pub pending: HashMap<String, VecDeque<RequestDefinition>>,

    // Latest settled response
    pub last_response: Option<ApiResponse>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_storage(settings, Storage::new())
    }

    pub fn with_storage(settings: Settings, storage: Storage) -> Self {
        AppState {
            settings,
            storage,
            pending: HashMap::new(),
            last_response: None,
        }
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.pending.contains_key(id)
    }

    /// Dispatched sends not yet settled, counting repeats of one id
    pub fn pending_count(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }

    pub(crate) fn push_pending(&mut self, request: RequestDefinition) {
        self.pending
            .entry(request.id.clone())
            .or_default()
            .push_back(request);
    }

    pub(crate) fn pop_pending(&mut self, id: &str) -> Option<RequestDefinition> {
        let queue = self.pending.get_mut(id)?;
        let request = queue.pop_front();
        if queue.is_empty() {
            self.pending.remove(id);
        }
        request
    }
}
