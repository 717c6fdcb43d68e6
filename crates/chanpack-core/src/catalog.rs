use std::collections::BTreeMap;

use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub dependency: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RepositoryCatalog {
    #[serde(default)]
    pub packages: BTreeMap<String, CatalogEntry>,
}

impl RepositoryCatalog {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        toml::from_str(input).context("failed to parse repository catalog")
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.packages.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn is_dependency(&self, name: &str) -> bool {
        self.packages
            .get(name)
            .map(|entry| entry.dependency)
            .unwrap_or(false)
    }
}
