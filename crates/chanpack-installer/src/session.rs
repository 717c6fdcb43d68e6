use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chanpack_core::{
    ChannelManifest, Direction, DirectionWords, InstallationType, ProgressRecord,
    RepositoryCatalog, RunOutcome, StopSignal, CORE_PACKAGE_NAME,
};
use chanpack_host::{
    load_json_document, write_json_document, Clock, DisableReason, EditorSettings, ManagerSettings,
    PackageHost, PromptItem, SelectionOutcome, SelectionPrompt, IGNORED_PACKAGES_KEY,
};
use chanpack_resolver::DevPackage;
use tracing::{debug, info, warn};

use crate::batcher::{IgnoreBatcher, SETTLE_DELAY, SETTLE_POLL_ATTEMPTS};

pub struct MigrationConfig {
    pub manifest: ChannelManifest,
    pub catalog: RepositoryCatalog,
    pub paths: SessionPaths,
    pub installation_type: InstallationType,
    pub development: bool,
    pub host: Box<dyn PackageHost>,
    pub editor_settings: Box<dyn EditorSettings>,
    pub prompt: Box<dyn SelectionPrompt>,
    pub clock: Arc<dyn Clock>,
}

#[derive(Debug, Clone)]
pub struct SessionPaths {
    pub channel_root: PathBuf,
    pub packages_dir: PathBuf,
    pub installed_packages_dir: PathBuf,
    pub progress_path: PathBuf,
    pub legacy_settings_path: PathBuf,
    pub replacement_settings_path: PathBuf,
    pub clone_temp_name: String,
}

impl SessionPaths {
    pub fn for_data_dir(data_dir: &Path, manifest: &ChannelManifest) -> Self {
        let packages_dir = data_dir.join("Packages");
        let user_dir = packages_dir.join("User");
        Self {
            channel_root: data_dir.to_path_buf(),
            installed_packages_dir: data_dir.join("Installed Packages"),
            progress_path: user_dir.join(format!("{}.json", manifest.channel_name)),
            legacy_settings_path: user_dir
                .join(format!("{}.settings.json", manifest.managers.legacy)),
            replacement_settings_path: user_dir
                .join(format!("{}.settings.json", manifest.managers.replacement)),
            clone_temp_name: "__channel_clone_tmp".to_string(),
            packages_dir,
        }
    }
}

pub(crate) enum SessionError {
    Stop(StopSignal),
    Fatal(anyhow::Error),
}

impl From<anyhow::Error> for SessionError {
    fn from(err: anyhow::Error) -> Self {
        Self::Fatal(err)
    }
}

impl From<StopSignal> for SessionError {
    fn from(signal: StopSignal) -> Self {
        Self::Stop(signal)
    }
}

pub(crate) type StepResult<T> = Result<T, SessionError>;

pub struct MigrationSession {
    pub(crate) manifest: ChannelManifest,
    pub(crate) catalog: RepositoryCatalog,
    pub(crate) paths: SessionPaths,
    pub(crate) installation_type: InstallationType,
    pub(crate) direction: Direction,
    pub(crate) words: &'static DirectionWords,
    pub(crate) development: bool,
    pub(crate) progress: ProgressRecord,
    pub(crate) manager_settings: Option<ManagerSettings>,
    pub(crate) orphan_backup: bool,
    pub(crate) original_ignored: Vec<String>,
    pub(crate) batcher: IgnoreBatcher,
    pub(crate) failed: Vec<String>,
    pub(crate) host: Box<dyn PackageHost>,
    pub(crate) editor_settings: Box<dyn EditorSettings>,
    pub(crate) prompt: Box<dyn SelectionPrompt>,
    pub(crate) clock: Arc<dyn Clock>,
}

impl MigrationSession {
    pub fn new(config: MigrationConfig) -> Result<Self> {
        let direction = config.installation_type.direction();
        let progress: ProgressRecord =
            load_json_document(&config.paths.progress_path, &*config.clock)?;
        let original_ignored = config.editor_settings.string_list(IGNORED_PACKAGES_KEY);

        let mut session = Self {
            direction,
            words: direction.words(),
            manifest: config.manifest,
            catalog: config.catalog,
            paths: config.paths,
            installation_type: config.installation_type,
            development: config.development,
            progress,
            manager_settings: None,
            orphan_backup: true,
            original_ignored,
            batcher: IgnoreBatcher::default(),
            failed: Vec::new(),
            host: config.host,
            editor_settings: config.editor_settings,
            prompt: config.prompt,
            clock: config.clock,
        };

        let pending = std::mem::take(&mut session.progress.next_packages_to_ignore);
        if !pending.is_empty() {
            info!(count = pending.len(), "restoring packages ignored by an interrupted run");
            session.unignore_packages(&pending)?;
            session.save_progress()?;
        }

        if direction == Direction::Uninstall {
            session.load_manager_settings_for_uninstall()?;
        }

        info!(
            installation_type = session.installation_type.as_str(),
            development = session.development,
            "migration session ready"
        );
        Ok(session)
    }

    pub fn run(&mut self) -> Result<RunOutcome> {
        let result = match self.direction {
            Direction::Install => self.run_install(),
            Direction::Uninstall => self.run_uninstall(),
        };

        match result {
            Ok(()) => Ok(RunOutcome::Completed {
                failed: self.failed.clone(),
            }),
            Err(SessionError::Stop(signal)) => {
                info!("{signal}");
                if let Err(err) = self.flush_ignored() {
                    warn!("failed to flush the ignore window while stopping: {err:#}");
                }
                Ok(RunOutcome::from_stop(&signal))
            }
            Err(SessionError::Fatal(err)) => {
                if let Err(flush_err) = self.flush_ignored() {
                    warn!("failed to flush the ignore window while aborting: {flush_err:#}");
                }
                Err(err)
            }
        }
    }

    pub fn failed_packages(&self) -> &[String] {
        &self.failed
    }

    pub(crate) fn is_update(&self) -> bool {
        self.installation_type.is_update()
    }

    pub(crate) fn process_label(&self) -> &'static str {
        self.installation_type.process_label()
    }

    pub(crate) fn disable_reason(&self) -> DisableReason {
        match self.direction {
            Direction::Install => DisableReason::Install,
            Direction::Uninstall => DisableReason::Remove,
        }
    }

    fn load_manager_settings_for_uninstall(&mut self) -> Result<()> {
        let path = self.active_manager_settings_path();
        let mut settings = ManagerSettings::load(&path, &*self.clock)?;
        self.orphan_backup = settings.remove_orphaned.unwrap_or(true);

        if !self.is_update() {
            settings.remove_orphaned = Some(false);
            self.manager_settings = Some(settings);
            self.persist_manager_settings()?;
        } else {
            self.manager_settings = Some(settings);
        }
        Ok(())
    }

    pub(crate) fn active_manager_settings_path(&self) -> PathBuf {
        if self.paths.replacement_settings_path.exists() {
            self.paths.replacement_settings_path.clone()
        } else {
            self.paths.legacy_settings_path.clone()
        }
    }

    pub(crate) fn save_progress(&mut self) -> Result<()> {
        if self
            .progress
            .packages_to_uninstall
            .iter()
            .any(|name| name == CORE_PACKAGE_NAME)
        {
            self.progress.default_package_files = self.manifest.default_package_files.clone();
        }
        self.progress.installation_type = self.installation_type.as_str().to_string();
        self.progress.normalize();
        write_json_document(&self.paths.progress_path, &self.progress)
    }

    pub(crate) fn persist_manager_settings(&mut self) -> Result<()> {
        let path = match self.direction {
            Direction::Install => self.paths.replacement_settings_path.clone(),
            Direction::Uninstall => self.paths.legacy_settings_path.clone(),
        };
        if let Some(settings) = self.manager_settings.as_mut() {
            settings.store(&path)?;
        }
        Ok(())
    }

    pub(crate) fn ignore_ahead(&mut self, current: &str, worklist: &[String]) -> Result<()> {
        if self.batcher.is_open() {
            return Ok(());
        }

        let window = IgnoreBatcher::compute_window(current, worklist, &self.original_ignored);
        info!(
            count = window.len(),
            "adding the next packages to the ignore list"
        );
        let reason = self.disable_reason();
        self.progress.next_packages_to_ignore = window.clone();
        self.host.disable_packages(&window, reason);
        self.clock.sleep(SETTLE_DELAY);
        self.write_ignored_list(&window, &[])?;
        self.batcher.open(window);
        Ok(())
    }

    pub(crate) fn mark_package_done(&mut self, package_name: &str) -> Result<()> {
        debug!(package = %package_name, "package step complete");
        if self.batcher.record_done() {
            self.flush_ignored()?;
        }
        Ok(())
    }

    pub(crate) fn flush_ignored(&mut self) -> Result<()> {
        let window = self.batcher.take_window();
        self.unignore_packages(&window)?;
        self.progress.next_packages_to_ignore.clear();
        self.save_progress()
    }

    pub(crate) fn unignore_packages(&mut self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        info!(count = packages.len(), "restoring ignored packages");
        let reason = self.disable_reason();
        self.host.reenable_packages(packages, reason);
        self.clock.sleep(SETTLE_DELAY);
        self.write_ignored_list(&[], packages)
    }

    pub(crate) fn write_ignored_list(&mut self, add: &[String], remove: &[String]) -> Result<()> {
        let mut intended = self.editor_settings.string_list(IGNORED_PACKAGES_KEY);
        intended.retain(|name| !remove.contains(name));
        for name in add {
            chanpack_core::add_unique(&mut intended, name);
        }
        intended.sort();

        for attempt in 0..SETTLE_POLL_ATTEMPTS {
            self.editor_settings
                .set_string_list(IGNORED_PACKAGES_KEY, &intended);
            self.editor_settings.persist()?;
            self.clock.sleep(SETTLE_DELAY);

            let read_back = self.editor_settings.string_list(IGNORED_PACKAGES_KEY);
            if !read_back.is_empty() && read_back == intended {
                debug!(attempt, "ignore list settled");
                break;
            }
        }

        self.save_progress()
    }

    pub(crate) fn select_packages(
        &mut self,
        names: &mut Vec<String>,
        mut infos: Option<&mut Vec<DevPackage>>,
    ) -> StepResult<()> {
        let mut items: Vec<PromptItem> = names
            .iter()
            .map(|name| PromptItem {
                name: name.clone(),
                detail: if self.manifest.forbidden.contains(name) {
                    format!(
                        "You must {} it or cancel the {}.",
                        self.words.verb,
                        self.process_label()
                    )
                } else {
                    self.words.keep_message.to_string()
                },
            })
            .collect();

        let mut declined: Vec<String> = Vec::new();
        loop {
            match self.prompt.prompt(&items) {
                SelectionOutcome::Cancelled => {
                    return Err(StopSignal::Cancelled(self.words.noun.to_string()).into());
                }
                SelectionOutcome::Continue => break,
                SelectionOutcome::Toggled(index) => {
                    let Some(item) = items.get_mut(index) else {
                        continue;
                    };
                    if self.manifest.forbidden.contains(&item.name) {
                        info!(
                            package = %item.name,
                            "this package is mandatory and cannot be deselected"
                        );
                        continue;
                    }
                    if declined.iter().any(|name| name == &item.name) {
                        chanpack_core::remove_existing(&mut declined, &item.name);
                        item.detail = self.words.keep_message.to_string();
                    } else {
                        declined.push(item.name.clone());
                        item.detail = self.words.toggle_message.to_string();
                    }
                }
            }
        }

        for name in &declined {
            info!(package = %name, "user declined this package");
            self.progress.note_not_installed(name);
            if let Some(position) = names.iter().position(|candidate| candidate == name) {
                names.remove(position);
                if let Some(infos) = infos.as_deref_mut() {
                    infos.remove(position);
                }
            }
        }
        self.save_progress()?;
        Ok(())
    }
}
