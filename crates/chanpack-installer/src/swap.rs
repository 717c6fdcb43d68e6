use std::time::Duration;

use anyhow::{Context, Result};
use chanpack_host::{write_json_document, ManagerSettings};
use tracing::{error, info, warn};

use crate::gate;
use crate::gate::{CLEAN_REPLACEMENT_FLAG, RESTORE_ORPHANED_FLAG};
use crate::session::{MigrationSession, StepResult};

const MANAGER_LOAD_ATTEMPTS: usize = 3;
const SWAP_RETRY_DELAY: Duration = Duration::from_secs(2);
const SETTINGS_WIPE_ATTEMPTS: usize = 3;

impl MigrationSession {
    pub(crate) fn finalize_legacy_retirement(&mut self) -> StepResult<()> {
        let replacement = self.manifest.managers.replacement.clone();
        if self
            .progress
            .packages_to_uninstall
            .iter()
            .any(|name| name == &replacement)
        {
            self.complete_legacy_retirement()?;
        } else {
            warn!("the replacement manager was not installed by this run");
            self.host.satisfy_dependencies();
            gate::finish_run();
        }
        Ok(())
    }

    fn complete_legacy_retirement(&mut self) -> StepResult<()> {
        let replacement = self.manifest.managers.replacement.clone();
        info!("finishing the legacy manager retirement");

        let mut loaded = false;
        for attempt in 1..=MANAGER_LOAD_ATTEMPTS {
            self.clock.sleep(SWAP_RETRY_DELAY);
            if self.host.manager_runtime_loaded(&replacement) {
                loaded = true;
                break;
            }
            warn!(attempt, "the replacement manager runtime is not loaded yet");
        }
        if !loaded {
            error!("could not observe the replacement manager runtime; finishing anyway");
        }

        self.wipe_legacy_settings()?;

        let legacy = self.manifest.managers.legacy.clone();
        let loader = self.manifest.managers.legacy_loader.clone();
        self.uninstall_named(&[(legacy, Some(false)), (loader.clone(), None)])?;
        self.remove_loader_artifacts(&loader);
        Ok(())
    }

    fn wipe_legacy_settings(&mut self) -> Result<()> {
        let clean = self
            .manager_settings
            .as_ref()
            .map(ManagerSettings::clean_for_handover)
            .unwrap_or_else(|| ManagerSettings::default().clean_for_handover());

        for attempt in (1..=SETTINGS_WIPE_ATTEMPTS).rev() {
            write_json_document(&self.paths.legacy_settings_path, &clean)?;
            if attempt > 1 {
                self.clock.sleep(SWAP_RETRY_DELAY);
            }
        }

        self.host.satisfy_dependencies();
        gate::finish_run();
        Ok(())
    }

    pub(crate) fn finalize_replacement_retirement(
        &mut self,
        packages: &[String],
    ) -> StepResult<()> {
        let replacement = self.manifest.managers.replacement.clone();
        if packages.iter().any(|name| name == &replacement) {
            let installed = self.host.list_packages();
            if !installed.contains(&self.manifest.managers.legacy) {
                self.install_legacy_manager()?;
            }
            if installed.contains(&replacement) {
                self.retire_replacement_manager()?;
            } else {
                gate::clear_flag(CLEAN_REPLACEMENT_FLAG);
            }
            self.restore_orphan_preference()?;
        } else {
            gate::clear_flag(CLEAN_REPLACEMENT_FLAG);
            self.restore_orphan_preference()?;
        }
        Ok(())
    }

    fn install_legacy_manager(&mut self) -> Result<()> {
        let legacy = self.manifest.managers.legacy.clone();
        info!(package = %legacy, "installing the legacy manager back");

        self.ignore_ahead(&legacy, std::slice::from_ref(&legacy))?;
        if !self.host.install_package(&legacy) {
            warn!(package = %legacy, "failed to install the legacy manager");
        }
        self.flush_ignored()
    }

    fn retire_replacement_manager(&mut self) -> Result<()> {
        let replacement = self.manifest.managers.replacement.clone();
        let loader = self.manifest.managers.replacement_loader.clone();
        info!("finishing the replacement manager {}", self.process_label());

        self.uninstall_named(&[(replacement, Some(false)), (loader.clone(), None)])?;
        self.remove_loader_artifacts(&loader);
        self.clean_replacement_settings()
    }

    fn clean_replacement_settings(&mut self) -> Result<()> {
        let path = self.paths.replacement_settings_path.clone();

        for attempt in (1..=SETTINGS_WIPE_ATTEMPTS).rev() {
            if attempt == SETTINGS_WIPE_ATTEMPTS {
                write_json_document(&path, &serde_json::json!({}))?;
            }
            if path.exists() {
                std::fs::remove_file(&path).with_context(|| {
                    format!("failed to remove settings file: {}", path.display())
                })?;
            }
            if attempt > 1 {
                self.clock.sleep(SWAP_RETRY_DELAY);
            }
        }

        gate::clear_flag(CLEAN_REPLACEMENT_FLAG);
        Ok(())
    }

    fn restore_orphan_preference(&mut self) -> Result<()> {
        if let Some(settings) = self.manager_settings.as_mut() {
            if self.orphan_backup {
                settings.remove_orphaned = None;
            } else {
                settings.remove_orphaned = Some(false);
            }
        }
        self.persist_manager_settings()?;
        gate::clear_flag(RESTORE_ORPHANED_FLAG);
        Ok(())
    }
}
