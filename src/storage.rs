use crate::constants::MAX_HISTORY;
use crate::export::ExportDocument;
use crate::models::{Collection, Environment, RequestHistoryItem};
use std::collections::VecDeque;

/// Bounded, most-recent-first request log
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: VecDeque<RequestHistoryItem>,
}

impl History {
    pub fn new() -> Self {
        History {
            entries: VecDeque::with_capacity(MAX_HISTORY),
        }
    }

    /// Add entry to history, silently dropping the oldest past the cap
    pub fn record(&mut self, item: RequestHistoryItem) {
        self.entries.push_front(item);
        self.entries.truncate(MAX_HISTORY);
    }

    /// Get history item by index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&RequestHistoryItem> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestHistoryItem> {
        self.entries.iter()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Merge imported entries, keeping newest-first order and the cap
    fn merge(&mut self, items: Vec<RequestHistoryItem>) {
        let mut all: Vec<RequestHistoryItem> = self
            .entries
            .drain(..)
            .filter(|existing| !items.iter().any(|i| i.id == existing.id))
            .collect();
        all.extend(items);
        all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        all.truncate(MAX_HISTORY);
        self.entries = all.into();
    }
}

/// In-memory collections, environments and history
#[derive(Clone, Debug, Default)]
pub struct Storage {
    pub history: History,
    pub collections: Vec<Collection>,
    pub environments: Vec<Environment>,
    active_environment: Option<String>,
}

impl Storage {
    pub fn new() -> Self {
        Storage {
            history: History::new(),
            ..Default::default()
        }
    }

    /// Get current environment
    pub fn current_environment(&self) -> Option<&Environment> {
        let id = self.active_environment.as_deref()?;
        self.environments.iter().find(|env| env.id == id)
    }

    /// Select the active environment by id; `None` deactivates.
    /// Returns false, leaving the selection untouched, for an unknown id.
    pub fn set_active_environment(&mut self, id: Option<&str>) -> bool {
        match id {
            None => {
                self.active_environment = None;
                true
            }
            Some(id) if self.environments.iter().any(|env| env.id == id) => {
                self.active_environment = Some(id.to_string());
                true
            }
            Some(_) => false,
        }
    }

    pub fn upsert_environment(&mut self, environment: Environment) {
        upsert(&mut self.environments, environment, |e| e.id.clone());
    }

    pub fn upsert_collection(&mut self, collection: Collection) {
        upsert(&mut self.collections, collection, |c| c.id.clone());
    }

    /// Substitute variables in text using current environment
    pub fn substitute(&self, text: &str) -> String {
        match self.current_environment() {
            Some(env) => env.substitute(text),
            None => text.to_string(),
        }
    }

    /// Snapshot everything into an interchange document
    pub fn export(&self) -> ExportDocument {
        ExportDocument::new(
            Some(self.collections.clone()),
            Some(self.environments.clone()),
            Some(self.history.iter().cloned().collect()),
        )
    }

    /// Merge a document: entries with a known id replace the stored ones
    pub fn import(&mut self, document: ExportDocument) {
        let collections = document.collections.unwrap_or_default();
        let environments = document.environments.unwrap_or_default();
        let history = document.history.unwrap_or_default();
        tracing::info!(
            collections = collections.len(),
            environments = environments.len(),
            history = history.len(),
            "Importing document"
        );

        for collection in collections {
            self.upsert_collection(collection);
        }
        for environment in environments {
            self.upsert_environment(environment);
        }
        self.history.merge(history);
    }
}

fn upsert<T, F>(items: &mut Vec<T>, item: T, id_of: F)
where
    F: Fn(&T) -> String,
{
    let id = id_of(&item);
    match items.iter_mut().find(|existing| id_of(existing) == id) {
        Some(existing) => *existing = item,
        None => items.push(item),
    }
}
