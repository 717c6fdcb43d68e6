use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::document::{load_json_document, write_json_document};
use crate::Clock;

pub const IGNORED_PACKAGES_KEY: &str = "ignored_packages";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bootstrapped: Option<bool>,
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub installed_packages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_orphaned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remove_orphaned_backup: Option<bool>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ManagerSettings {
    pub fn load(path: &Path, clock: &dyn Clock) -> Result<Self> {
        load_json_document(path, clock)
    }

    pub fn store(&mut self, path: &Path) -> Result<()> {
        self.installed_packages.sort();
        write_json_document(path, self)
    }

    pub fn add_installed(&mut self, name: &str) {
        chanpack_core::add_unique(&mut self.installed_packages, name);
    }

    pub fn remove_installed(&mut self, name: &str) {
        chanpack_core::remove_existing(&mut self.installed_packages, name);
    }

    pub fn remove_channel(&mut self, url: &str) {
        self.channels.retain(|channel| channel != url);
    }

    pub fn clean_for_handover(&self) -> Self {
        let backup = self
            .remove_orphaned_backup
            .or(self.remove_orphaned)
            .unwrap_or(true);
        Self {
            bootstrapped: Some(false),
            remove_orphaned: Some(false),
            remove_orphaned_backup: Some(backup),
            ..Self::default()
        }
    }
}

pub trait EditorSettings: Send {
    fn string_list(&self, key: &str) -> Vec<String>;
    fn set_string_list(&mut self, key: &str, values: &[String]);
    fn persist(&mut self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct JsonFileSettings {
    path: PathBuf,
    pending: BTreeMap<String, Value>,
}

impl JsonFileSettings {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pending: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> BTreeMap<String, Value> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&raw).unwrap_or_default()
    }
}

impl EditorSettings for JsonFileSettings {
    fn string_list(&self, key: &str) -> Vec<String> {
        let document = self.read_document();
        let Some(Value::Array(entries)) = document.get(key) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter_map(|entry| entry.as_str().map(str::to_string))
            .collect()
    }

    fn set_string_list(&mut self, key: &str, values: &[String]) {
        let entries = values.iter().map(|value| Value::from(value.as_str())).collect();
        self.pending.insert(key.to_string(), Value::Array(entries));
    }

    fn persist(&mut self) -> Result<()> {
        let mut document = self.read_document();
        for (key, value) in std::mem::take(&mut self.pending) {
            document.insert(key, value);
        }
        debug!(path = %self.path.display(), "persisting editor settings");
        write_json_document(&self.path, &document)
    }
}
