use std::collections::BTreeSet;

use anyhow::Result;
use chanpack_host::ManagerSettings;
use chanpack_resolver::{resolve_install_set, InstalledView};
use tracing::{info, warn};

use crate::session::{MigrationSession, StepResult};

impl MigrationSession {
    pub(crate) fn run_install(&mut self) -> StepResult<()> {
        if self.development {
            let submodules = self.preinstall_channel_submodules()?;
            let packages = self.resolve_development_plan(&submodules);
            self.install_development_packages(packages)?;
        } else {
            let packages = self.resolve_stable_plan()?;
            self.install_stable_packages(packages)?;
        }

        if !self.is_update() {
            self.finalize_legacy_retirement()?;
        }
        Ok(())
    }

    fn resolve_stable_plan(&mut self) -> StepResult<Vec<String>> {
        let view = InstalledView {
            installed: self.installed_package_view()?,
            tracked_for_uninstall: self.progress.packages_to_uninstall.iter().cloned().collect(),
            not_installed: self.progress.packages_not_installed.iter().cloned().collect(),
        };

        let plan = resolve_install_set(&self.catalog, &self.manifest, &view, self.is_update())?;

        for name in &plan.already_installed {
            self.progress.note_not_installed(name);
        }
        self.save_progress()?;

        if self.is_update() {
            info!(count = plan.packages.len(), "new packages to install found");
        }
        Ok(plan.packages)
    }

    pub(crate) fn installed_package_view(&self) -> Result<BTreeSet<String>> {
        let path = self.active_manager_settings_path();
        let settings = ManagerSettings::load(&path, &*self.clock)?;
        Ok(settings
            .installed_packages
            .into_iter()
            .filter(|name| name != &self.manifest.channel_name)
            .collect())
    }

    fn install_stable_packages(&mut self, mut packages: Vec<String>) -> StepResult<()> {
        self.select_packages(&mut packages, None)?;
        self.prepare_manager_documents(&packages)?;

        let total = packages.len();
        for (index, package_name) in packages.clone().iter().enumerate() {
            info!(
                package = %package_name,
                "installing {} of {total}",
                index + 1
            );
            self.ignore_ahead(package_name, &packages)?;

            if self.host.install_package(package_name) {
                self.add_package_to_installed(package_name)?;
            } else {
                warn!(package = %package_name, "failed to install the repository");
                self.failed.push(package_name.clone());
            }

            self.mark_package_done(package_name)?;
        }

        self.flush_ignored()?;
        Ok(())
    }

    pub(crate) fn prepare_manager_documents(&mut self, packages: &[String]) -> StepResult<()> {
        if packages
            .iter()
            .any(|name| name == &self.manifest.managers.replacement)
        {
            self.sync_manager_documents()?;
        } else {
            self.manager_settings = None;
        }

        if self.development {
            self.apply_development_ignores(packages)?;
        }
        Ok(())
    }

    fn sync_manager_documents(&mut self) -> Result<()> {
        info!("syncing the legacy and replacement manager documents");
        let mut settings =
            ManagerSettings::load(&self.paths.legacy_settings_path, &*self.clock)?;

        settings.remove_installed(&self.manifest.managers.legacy);
        settings.add_installed(&self.manifest.managers.replacement);
        settings.add_installed(&self.manifest.channel_name);

        if let Some(backup) = settings.remove_orphaned_backup.take() {
            settings.remove_orphaned = Some(backup);
        }

        settings.store(&self.paths.replacement_settings_path)?;
        self.manager_settings = Some(settings);
        Ok(())
    }

    fn apply_development_ignores(&mut self, packages: &[String]) -> Result<()> {
        let mut added = Vec::new();
        let development_disabled = self.manifest.ignore_on_development.clone();
        for name in &development_disabled {
            if packages.iter().any(|candidate| candidate == name)
                && !self.original_ignored.contains(name)
            {
                self.original_ignored.push(name.clone());
                chanpack_core::add_unique(&mut self.progress.packages_to_unignore, name);
                added.push(name.clone());
            }
        }

        if !added.is_empty() {
            info!(count = added.len(), "disabling development-only packages");
            self.write_ignored_list(&added, &[])?;
        }
        Ok(())
    }

    pub(crate) fn add_package_to_installed(&mut self, package_name: &str) -> Result<()> {
        if !self.development {
            if let Some(settings) = self.manager_settings.as_mut() {
                settings.add_installed(package_name);
                settings.store(&self.paths.replacement_settings_path)?;
            }
        }

        self.progress.track_for_uninstall(package_name);
        self.save_progress()
    }

    pub(crate) fn remove_package_from_records(&mut self, package_name: &str) -> Result<()> {
        if let Some(settings) = self.manager_settings.as_mut() {
            settings.remove_installed(package_name);
        }
        self.progress.untrack_package(package_name);
        self.save_progress()?;
        self.persist_manager_settings()
    }
}
