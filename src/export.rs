//! Interchange document for collections, environments and history

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::EXPORT_FORMAT_VERSION;
use crate::models::{Collection, Environment, RequestHistoryItem};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub version: String,
    /// RFC 3339 timestamp
    pub export_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collections: Option<Vec<Collection>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environments: Option<Vec<Environment>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<RequestHistoryItem>>,
}

impl ExportDocument {
    pub fn new(
        collections: Option<Vec<Collection>>,
        environments: Option<Vec<Environment>>,
        history: Option<Vec<RequestHistoryItem>>,
    ) -> Self {
        ExportDocument {
            version: EXPORT_FORMAT_VERSION.to_string(),
            export_date: chrono::Utc::now().to_rfc3339(),
            collections,
            environments,
            history,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Not a valid export document")
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)
            .with_context(|| format!("Failed to write export to {}", path.display()))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read export from {}", path.display()))?;
        Self::from_json(&content)
    }
}
