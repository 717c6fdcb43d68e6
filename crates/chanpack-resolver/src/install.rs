use std::collections::BTreeSet;

use chanpack_core::{ChannelManifest, RepositoryCatalog, StopSignal};
use tracing::debug;

use crate::order::apply_install_priority;
use crate::types::{DevPackage, InstallPlan, InstalledView};

const PACKAGES_DIR_PREFIX: &str = "Packages/";

pub fn resolve_install_set(
    catalog: &RepositoryCatalog,
    manifest: &ChannelManifest,
    view: &InstalledView,
    is_upgrade: bool,
) -> Result<InstallPlan, StopSignal> {
    let mut excluded: BTreeSet<&str> = BTreeSet::new();
    excluded.insert(manifest.managers.legacy.as_str());
    excluded.insert(manifest.channel_name.as_str());
    excluded.extend(view.installed.iter().map(String::as_str));
    excluded.extend(view.tracked_for_uninstall.iter().map(String::as_str));
    if is_upgrade {
        excluded.extend(view.not_installed.iter().map(String::as_str));
    }
    excluded.extend(manifest.skip_on_stable.iter().map(String::as_str));
    excluded.extend(manifest.ignore_on_development.iter().map(String::as_str));

    let candidates: Vec<&str> = if manifest.exclusive_install.is_empty() {
        catalog.names().collect()
    } else {
        catalog
            .names()
            .filter(|name| manifest.exclusive_install.iter().any(|allowed| allowed == name))
            .collect()
    };

    let mut filtered = Vec::new();
    let mut already_installed = Vec::new();
    for name in candidates {
        if !excluded.contains(name) && !catalog.is_dependency(name) {
            filtered.push(name.to_string());
        }
        if !is_upgrade && view.installed.contains(name) {
            already_installed.push(name.to_string());
        }
    }

    if filtered.is_empty() {
        return Err(StopSignal::NoPackagesAvailable("install".to_string()));
    }

    debug!(count = filtered.len(), "resolved stable install set");
    Ok(InstallPlan {
        packages: apply_install_priority(filtered, manifest),
        already_installed,
    })
}

pub fn resolve_development_set(
    submodules: &[(String, String)],
    manifest: &ChannelManifest,
    installed: &BTreeSet<String>,
) -> Vec<DevPackage> {
    let mut packages = Vec::new();
    for (path, url) in submodules {
        if !path.starts_with(PACKAGES_DIR_PREFIX) {
            continue;
        }
        let Some(name) = path.rsplit('/').next() else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        if manifest
            .skip_on_development
            .iter()
            .any(|skipped| skipped == name)
            || installed.contains(name)
        {
            continue;
        }
        packages.push(DevPackage {
            name: name.to_string(),
            url: url.clone(),
            path: path.clone(),
        });
    }

    let names: Vec<String> = packages.iter().map(|package| package.name.clone()).collect();
    let ordered = apply_install_priority(names, manifest);
    let mut by_order = Vec::with_capacity(packages.len());
    for name in &ordered {
        if let Some(position) = packages.iter().position(|package| &package.name == name) {
            by_order.push(packages.remove(position));
        }
    }
    by_order
}
