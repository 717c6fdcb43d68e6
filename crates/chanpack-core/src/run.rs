use anyhow::{anyhow, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Install,
    Uninstall,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionWords {
    pub verb: &'static str,
    pub verb_title: &'static str,
    pub past: &'static str,
    pub noun: &'static str,
    pub keep_message: &'static str,
    pub toggle_message: &'static str,
}

const INSTALL_WORDS: DirectionWords = DirectionWords {
    verb: "install",
    verb_title: "Install",
    past: "installed",
    noun: "installation",
    keep_message: "Select this to not install it.",
    toggle_message: "Select this to install it.",
};

const UNINSTALL_WORDS: DirectionWords = DirectionWords {
    verb: "uninstall",
    verb_title: "Uninstall",
    past: "uninstalled",
    noun: "uninstallation",
    keep_message: "Select this to not uninstall it.",
    toggle_message: "Select this to uninstall it.",
};

impl Direction {
    pub fn words(self) -> &'static DirectionWords {
        match self {
            Self::Install => &INSTALL_WORDS,
            Self::Uninstall => &UNINSTALL_WORDS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallationType {
    Install,
    Upgrade,
    Uninstall,
    Downgrade,
}

impl InstallationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Uninstall => "uninstall",
            Self::Downgrade => "downgrade",
        }
    }

    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "install" => Ok(Self::Install),
            "upgrade" => Ok(Self::Upgrade),
            "uninstall" => Ok(Self::Uninstall),
            "downgrade" => Ok(Self::Downgrade),
            _ => Err(anyhow!("invalid installation_type: {value}")),
        }
    }

    pub fn direction(self) -> Direction {
        match self {
            Self::Install | Self::Upgrade => Direction::Install,
            Self::Uninstall | Self::Downgrade => Direction::Uninstall,
        }
    }

    pub fn is_update(self) -> bool {
        matches!(self, Self::Upgrade | Self::Downgrade)
    }

    pub fn process_label(self) -> &'static str {
        match self {
            Self::Install => "Installation",
            Self::Upgrade => "Upgrade",
            Self::Uninstall => "Uninstallation",
            Self::Downgrade => "Downgrade",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StopSignal {
    #[error("the user cancelled the {0}")]
    Cancelled(String),
    #[error("there are 0 packages available to {0}")]
    NoPackagesAvailable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    Completed { failed: Vec<String> },
    Cancelled,
    Empty,
}

impl RunOutcome {
    pub fn from_stop(signal: &StopSignal) -> Self {
        match signal {
            StopSignal::Cancelled(_) => Self::Cancelled,
            StopSignal::NoPackagesAvailable(_) => Self::Empty,
        }
    }
}
