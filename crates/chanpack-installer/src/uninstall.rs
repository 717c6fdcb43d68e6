use std::collections::BTreeSet;

use anyhow::Result;
use chanpack_core::CORE_PACKAGE_NAME;
use chanpack_resolver::resolve_uninstall_set;
use tracing::{info, warn};

use crate::fsops::{
    add_git_folder_by_file, recursively_delete_empty_folders, remove_git_folder, safe_remove,
};
use crate::session::{MigrationSession, StepResult};

impl MigrationSession {
    pub(crate) fn run_uninstall(&mut self) -> StepResult<()> {
        let packages = resolve_uninstall_set(
            &self.progress,
            &self.manifest,
            &self.catalog,
            self.is_update(),
        )?;
        info!(count = packages.len(), "packages to {}", self.words.verb);

        self.uninstall_packages(packages.clone())?;

        if !self.is_update() {
            self.remove_channel_registration()?;
            self.uninstall_files()?;
            self.uninstall_folders()?;
        }

        self.finalize_replacement_retirement(&packages)?;

        if !self.is_update() {
            let channel_name = self.manifest.channel_name.clone();
            self.uninstall_named(&[(channel_name, Some(false))])?;
        }
        Ok(())
    }

    fn uninstall_packages(&mut self, mut packages: Vec<String>) -> StepResult<()> {
        self.select_packages(&mut packages, None)?;

        let dependencies = self.host.list_dependencies();
        let late_phase: BTreeSet<String> = self.manifest.late_phase_packages().into_iter().collect();

        let total = packages.len();
        for (index, package_name) in packages.clone().iter().enumerate() {
            let is_dependency = dependencies.contains(package_name);
            info!(
                package = %package_name,
                dependency = is_dependency,
                "{} {} of {total}",
                self.process_label(),
                index + 1
            );
            self.ignore_ahead(package_name, &packages)?;

            if package_name.as_str() == CORE_PACKAGE_NAME {
                self.uninstall_core_package_files()?;
                continue;
            }

            if late_phase.contains(package_name) {
                info!(package = %package_name, "skipped for now; this package is handled later");
                continue;
            }

            if is_dependency {
                info!("skipping the dependency; orphans are removed automatically");
                continue;
            }

            if self.host.remove_package(package_name, Some(false)) {
                self.remove_package_from_records(package_name)?;
            } else {
                warn!(package = %package_name, "failed to uninstall the repository");
                self.failed.push(package_name.clone());
            }

            self.mark_package_done(package_name)?;
        }

        self.flush_ignored()?;
        Ok(())
    }

    fn uninstall_core_package_files(&mut self) -> Result<()> {
        info!("removing the core package files");
        let core_dir = self
            .paths
            .packages_dir
            .join(CORE_PACKAGE_NAME);

        let files = self.progress.default_package_files.clone();
        for file in &files {
            safe_remove(&core_dir.join(file));
        }

        remove_git_folder(&core_dir.join(".git"), Some(&core_dir));
        Ok(())
    }

    fn remove_channel_registration(&mut self) -> Result<()> {
        let channel_url = self.manifest.channel_url.clone();
        if let Some(settings) = self.manager_settings.as_mut() {
            info!(url = %channel_url, "removing the channel registration");
            settings.remove_channel(&channel_url);
        }
        self.persist_manager_settings()
    }

    fn uninstall_files(&mut self) -> Result<()> {
        let files = std::mem::take(&mut self.progress.files_to_uninstall);
        info!(count = files.len(), "removing channel-added files");

        let mut git_folders = Vec::new();
        for file in &files {
            let absolute = self.paths.channel_root.join(file);
            safe_remove(&absolute);
            add_git_folder_by_file(file, &mut git_folders);
        }

        for folder in &git_folders {
            remove_git_folder(&self.paths.channel_root.join(folder), None);
        }

        self.save_progress()
    }

    fn uninstall_folders(&mut self) -> Result<()> {
        let folders = std::mem::take(&mut self.progress.folders_to_uninstall);
        info!(count = folders.len(), "removing channel-added folders");

        for folder in folders.iter().rev() {
            let absolute = self.paths.channel_root.join(folder);
            let mut not_empty = Vec::new();
            recursively_delete_empty_folders(&absolute, &mut not_empty);
        }

        for folder in &folders {
            let absolute = self.paths.channel_root.join(folder);
            if absolute.is_dir() {
                let listing: Vec<String> = std::fs::read_dir(&absolute)
                    .map(|entries| {
                        entries
                            .flatten()
                            .map(|entry| entry.file_name().to_string_lossy().into_owned())
                            .collect()
                    })
                    .unwrap_or_default();
                warn!(
                    folder = %absolute.display(),
                    "the installed folder could not be removed because it is not empty: {listing:?}"
                );
            }
        }

        self.save_progress()
    }

    pub(crate) fn uninstall_named(
        &mut self,
        packages: &[(String, Option<bool>)],
    ) -> Result<()> {
        let names: Vec<String> = packages.iter().map(|(name, _)| name.clone()).collect();
        info!(packages = ?names, "{} of the remaining packages", self.process_label());

        for (package_name, is_dependency) in packages {
            self.ignore_ahead(package_name, &names)?;

            if self.host.remove_package(package_name, *is_dependency) {
                self.remove_package_from_records(package_name)?;
            } else {
                warn!(package = %package_name, "failed to uninstall the repository");
                self.failed.push(package_name.clone());
            }

            self.mark_package_done(package_name)?;
        }

        self.flush_ignored()
    }

    pub(crate) fn remove_loader_artifacts(&mut self, loader_name: &str) {
        let dir = &self.paths.installed_packages_dir;
        safe_remove(&dir.join(format!("{loader_name}.package")));
        safe_remove(&dir.join(format!("{loader_name}.package-new")));
    }
}
