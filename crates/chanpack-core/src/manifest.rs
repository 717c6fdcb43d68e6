use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManagerSwap {
    pub legacy: String,
    pub legacy_loader: String,
    pub replacement: String,
    pub replacement_loader: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelManifest {
    pub channel_name: String,
    pub channel_url: String,
    #[serde(default)]
    pub root_url: String,
    pub managers: ManagerSwap,
    #[serde(default)]
    pub install_first: Vec<String>,
    #[serde(default)]
    pub install_last: Vec<String>,
    #[serde(default)]
    pub skip_on_stable: Vec<String>,
    #[serde(default)]
    pub skip_on_development: Vec<String>,
    #[serde(default)]
    pub ignore_on_development: Vec<String>,
    #[serde(default)]
    pub exclusive_install: Vec<String>,
    #[serde(default)]
    pub forbidden: Vec<String>,
    #[serde(default)]
    pub default_package_files: Vec<String>,
}

impl ChannelManifest {
    pub fn from_toml_str(input: &str) -> anyhow::Result<Self> {
        let manifest: Self = toml::from_str(input).context("failed to parse channel manifest")?;
        if manifest.channel_name.trim().is_empty() {
            return Err(anyhow!("channel manifest is missing a channel name"));
        }
        if manifest.install_first.contains(&manifest.channel_name)
            || manifest.install_last.contains(&manifest.channel_name)
        {
            return Err(anyhow!(
                "channel '{}' must not list itself in a priority bucket",
                manifest.channel_name
            ));
        }
        for (field, value) in [
            ("managers.legacy", &manifest.managers.legacy),
            ("managers.legacy_loader", &manifest.managers.legacy_loader),
            ("managers.replacement", &manifest.managers.replacement),
            (
                "managers.replacement_loader",
                &manifest.managers.replacement_loader,
            ),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("manifest field '{field}' must not be empty"));
            }
        }
        if manifest.managers.legacy == manifest.managers.replacement {
            return Err(anyhow!(
                "legacy and replacement manager are both '{}'",
                manifest.managers.legacy
            ));
        }
        Ok(manifest)
    }

    pub fn late_phase_packages(&self) -> Vec<String> {
        vec![
            self.managers.replacement.clone(),
            self.channel_name.clone(),
        ]
    }
}
