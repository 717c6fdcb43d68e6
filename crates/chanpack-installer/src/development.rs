use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chanpack_resolver::{resolve_development_set, DevPackage};
use tracing::{info, warn};

use crate::fsops::{
    collect_tree_for_removal, copy_overrides, is_directory_empty,
    recursively_delete_empty_folders,
};
use crate::session::{MigrationSession, StepResult};
use crate::vcs::{
    parse_submodule_descriptor, run_git_checkout, run_git_clone, run_git_clone_recursive,
    submodule_pairs, SubmoduleEntry,
};

const DEVELOPMENT_BRANCH: &str = "master";
const PACKAGES_DIR_PREFIX: &str = "Packages/";

impl MigrationSession {
    pub(crate) fn preinstall_channel_submodules(&mut self) -> StepResult<Vec<SubmoduleEntry>> {
        self.clone_channel_repository()?;

        let root = self.paths.channel_root.clone();
        let descriptor_path = root.join(".gitmodules");
        let raw = fs::read_to_string(&descriptor_path).with_context(|| {
            format!(
                "failed to read submodule descriptor: {}",
                descriptor_path.display()
            )
        })?;
        let submodules = parse_submodule_descriptor(&raw);

        for entry in &submodules {
            if entry.path.starts_with(PACKAGES_DIR_PREFIX) {
                continue;
            }

            let submodule_absolute = root.join(&entry.path);
            if submodule_absolute.exists() && !is_directory_empty(&submodule_absolute) {
                continue;
            }

            info!(url = %entry.url, "installing channel submodule");
            if let Err(err) = run_git_clone(&entry.url, &entry.path, &root) {
                warn!(path = %entry.path, "failed to install channel submodule: {err:#}");
                continue;
            }

            let mut files = std::mem::take(&mut self.progress.files_to_uninstall);
            let mut folders = std::mem::take(&mut self.progress.folders_to_uninstall);
            collect_tree_for_removal(&submodule_absolute, &root, &mut files, &mut folders)?;
            self.progress.files_to_uninstall = files;
            self.progress.folders_to_uninstall = folders;
            self.save_progress()?;
        }

        Ok(submodules)
    }

    pub(crate) fn resolve_development_plan(
        &mut self,
        submodules: &[SubmoduleEntry],
    ) -> Vec<DevPackage> {
        let installed = self.installed_package_view().unwrap_or_default();
        resolve_development_set(&submodule_pairs(submodules), &self.manifest, &installed)
    }

    fn clone_channel_repository(&mut self) -> StepResult<()> {
        let root = self.paths.channel_root.clone();
        if root.join(".git").exists() {
            warn!(
                "the folder '{}' already holds a channel checkout; skipping the main clone",
                root.join(".git").display()
            );
            return Ok(());
        }

        let temp_dir = self.download_main_repository()?;

        let copied = copy_overrides(&temp_dir, &root, &root, false, true)?;
        for file in &copied.files {
            self.progress.track_file(file);
        }
        for folder in &copied.folders {
            self.progress.track_folder(folder);
        }

        remove_tree_best_effort(&temp_dir);
        self.save_progress()?;
        Ok(())
    }

    fn download_main_repository(&mut self) -> Result<PathBuf> {
        let url = self.manifest.root_url.clone();
        info!(url = %url, "installing the channel's main repository");

        let temp_dir = self.download_repository_to_temp(&url)?;

        let mut not_empty = Vec::new();
        recursively_delete_empty_folders(&temp_dir, &mut not_empty);
        if !temp_dir.exists() {
            fs::create_dir_all(&temp_dir)
                .with_context(|| format!("failed to recreate {}", temp_dir.display()))?;
        }
        Ok(temp_dir)
    }

    pub(crate) fn download_repository_to_temp(&mut self, url: &str) -> Result<PathBuf> {
        let root = self.paths.channel_root.clone();
        let temp_dir = root.join(&self.paths.clone_temp_name);
        if temp_dir.is_dir() {
            remove_tree_best_effort(&temp_dir);
        }

        run_git_clone(url, &self.paths.clone_temp_name, &root)?;
        Ok(temp_dir)
    }

    pub(crate) fn install_development_packages(
        &mut self,
        mut packages: Vec<DevPackage>,
    ) -> StepResult<()> {
        let mut names: Vec<String> = packages.iter().map(|package| package.name.clone()).collect();
        self.select_packages(&mut names, Some(&mut packages))?;
        self.prepare_manager_documents(&names)?;

        let root = self.paths.channel_root.clone();
        let total = packages.len();

        for (index, package) in packages.clone().iter().enumerate() {
            info!(
                package = %package.name,
                "installing {} of {total}",
                index + 1
            );
            self.ignore_ahead(&package.name, &names)?;

            let submodule_absolute = root.join(&package.path);
            if submodule_absolute.exists() {
                if self.host.backup_package_dir(&package.name) {
                    let temp_dir = self.download_repository_to_temp(&package.url)?;
                    copy_overrides(&temp_dir, &submodule_absolute, &root, true, false)?;
                } else {
                    warn!(package = %package.name, "failed to back up and install the repository");
                    self.failed.push(package.name.clone());
                    continue;
                }
            } else if let Err(err) = run_git_clone_recursive(&package.url, &package.path, &root) {
                warn!(package = %package.name, "failed to download the repository: {err:#}");
                self.failed.push(package.name.clone());
                continue;
            }

            if let Err(err) = run_git_checkout(&root.join(&package.path), DEVELOPMENT_BRANCH) {
                warn!(package = %package.name, "failed to check out {DEVELOPMENT_BRANCH}: {err:#}");
            }

            self.add_package_to_installed(&package.name)?;
            self.mark_package_done(&package.name)?;
        }

        self.flush_ignored()?;

        let temp_dir = root.join(&self.paths.clone_temp_name);
        if temp_dir.exists() {
            remove_tree_best_effort(&temp_dir);
        }
        Ok(())
    }
}

fn remove_tree_best_effort(path: &std::path::Path) {
    if let Err(err) = fs::remove_dir_all(path) {
        warn!(path = %path.display(), "failed to remove scratch folder: {err}");
    }
}
