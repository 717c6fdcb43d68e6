use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use chanpack_core::RepositoryCatalog;
use chanpack_host::{DisableReason, PackageHost};
use tracing::{debug, warn};

pub struct LocalPackageHost {
    packages_dir: PathBuf,
    catalog: RepositoryCatalog,
}

impl LocalPackageHost {
    pub fn new(packages_dir: PathBuf, catalog: RepositoryCatalog) -> Self {
        Self {
            packages_dir,
            catalog,
        }
    }

    fn package_dir(&self, name: &str) -> PathBuf {
        self.packages_dir.join(name)
    }

    fn clone_package(&self, name: &str) -> bool {
        let Some(entry) = self.catalog.packages.get(name) else {
            warn!(package = %name, "package is not in the repository catalog");
            return false;
        };
        let Some(url) = entry.url.as_deref() else {
            warn!(package = %name, "catalog entry has no source url");
            return false;
        };

        let destination = self.package_dir(name);
        if destination.exists() {
            debug!(package = %name, "package directory already present");
            return true;
        }

        let output = Command::new("git")
            .arg("-c")
            .arg("core.autocrlf=false")
            .arg("clone")
            .arg("--")
            .arg(url)
            .arg(&destination)
            .output();
        match output {
            Ok(output) if output.status.success() => true,
            Ok(output) => {
                warn!(
                    package = %name,
                    "git clone failed: {}",
                    String::from_utf8_lossy(&output.stderr).trim()
                );
                false
            }
            Err(err) => {
                warn!(package = %name, "failed launching git clone: {err}");
                false
            }
        }
    }
}

impl PackageHost for LocalPackageHost {
    fn install_package(&mut self, name: &str) -> bool {
        self.clone_package(name)
    }

    fn remove_package(&mut self, name: &str, _is_dependency: Option<bool>) -> bool {
        let dir = self.package_dir(name);
        if !dir.exists() {
            return true;
        }
        match fs::remove_dir_all(&dir) {
            Ok(()) => true,
            Err(err) => {
                warn!(package = %name, "failed to remove package directory: {err}");
                false
            }
        }
    }

    fn list_packages(&self) -> BTreeSet<String> {
        let Ok(entries) = fs::read_dir(&self.packages_dir) else {
            return BTreeSet::new();
        };
        entries
            .flatten()
            .filter(|entry| entry.path().is_dir())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect()
    }

    fn list_dependencies(&self) -> BTreeSet<String> {
        self.list_packages()
            .into_iter()
            .filter(|name| self.catalog.is_dependency(name))
            .collect()
    }

    fn disable_packages(&mut self, names: &[String], reason: DisableReason) {
        debug!(count = names.len(), reason = reason.as_str(), "disabling packages");
    }

    fn reenable_packages(&mut self, names: &[String], reason: DisableReason) {
        debug!(count = names.len(), reason = reason.as_str(), "reenabling packages");
    }

    fn backup_package_dir(&mut self, name: &str) -> bool {
        let source = self.package_dir(name);
        let backup_root = self.packages_dir.join("Backup");
        if let Err(err) = fs::create_dir_all(&backup_root) {
            warn!(package = %name, "failed to create backup folder: {err}");
            return false;
        }
        let destination = backup_root.join(format!("{name}-{}", std::process::id()));
        match fs::rename(&source, &destination) {
            Ok(()) => true,
            Err(err) => {
                warn!(package = %name, "failed to back up package directory: {err}");
                false
            }
        }
    }

    fn manager_runtime_loaded(&self, manager: &str) -> bool {
        self.package_dir(manager).exists()
    }

    fn satisfy_dependencies(&mut self) {
        let missing: Vec<String> = self
            .catalog
            .packages
            .iter()
            .filter(|(name, entry)| entry.dependency && !self.package_dir(name).exists())
            .map(|(name, _)| name.clone())
            .collect();
        for name in missing {
            if !self.clone_package(&name) {
                warn!(package = %name, "failed to satisfy dependency");
            }
        }
    }
}
