use serde::{Deserialize, Serialize};

pub const PROGRESS_RECORD_VERSION: u32 = 1;

fn current_version() -> u32 {
    PROGRESS_RECORD_VERSION
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProgressRecord {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub packages_to_uninstall: Vec<String>,
    #[serde(default)]
    pub packages_to_unignore: Vec<String>,
    #[serde(default)]
    pub files_to_uninstall: Vec<String>,
    #[serde(default)]
    pub folders_to_uninstall: Vec<String>,
    #[serde(default)]
    pub next_packages_to_ignore: Vec<String>,
    #[serde(default)]
    pub packages_not_installed: Vec<String>,
    #[serde(default)]
    pub installation_type: String,
    #[serde(default)]
    pub default_package_files: Vec<String>,
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            version: PROGRESS_RECORD_VERSION,
            packages_to_uninstall: Vec::new(),
            packages_to_unignore: Vec::new(),
            files_to_uninstall: Vec::new(),
            folders_to_uninstall: Vec::new(),
            next_packages_to_ignore: Vec::new(),
            packages_not_installed: Vec::new(),
            installation_type: String::new(),
            default_package_files: Vec::new(),
        }
    }
}

impl ProgressRecord {
    pub fn track_for_uninstall(&mut self, name: &str) {
        add_unique(&mut self.packages_to_uninstall, name);
    }

    pub fn untrack_package(&mut self, name: &str) {
        remove_existing(&mut self.packages_to_uninstall, name);
    }

    pub fn note_not_installed(&mut self, name: &str) {
        add_unique(&mut self.packages_not_installed, name);
    }

    pub fn track_file(&mut self, path: &str) {
        add_unique(&mut self.files_to_uninstall, path);
    }

    pub fn track_folder(&mut self, path: &str) {
        add_unique(&mut self.folders_to_uninstall, path);
    }

    pub fn normalize(&mut self) {
        self.packages_to_uninstall.sort();
        self.packages_to_unignore.sort();
        self.files_to_uninstall.sort();
        self.folders_to_uninstall.sort();
        self.next_packages_to_ignore.sort();
        self.packages_not_installed.sort();
    }
}

pub fn add_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

pub fn remove_existing(list: &mut Vec<String>, item: &str) {
    list.retain(|existing| existing != item);
}
