mod clock;
mod document;
mod host;
mod prompt;
mod settings;

pub use clock::{Clock, SystemClock};
pub use document::{load_json_document, write_json_document};
pub use host::{DisableReason, PackageHost};
pub use prompt::{AcceptAllPrompt, PromptItem, SelectionOutcome, SelectionPrompt};
pub use settings::{EditorSettings, JsonFileSettings, ManagerSettings, IGNORED_PACKAGES_KEY};

#[cfg(test)]
mod tests;
