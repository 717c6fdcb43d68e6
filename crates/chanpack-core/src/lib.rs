mod catalog;
mod manifest;
mod progress;
mod run;

pub use catalog::{CatalogEntry, RepositoryCatalog};
pub use manifest::{ChannelManifest, ManagerSwap};
pub use progress::{add_unique, remove_existing, ProgressRecord, PROGRESS_RECORD_VERSION};
pub use run::{Direction, DirectionWords, InstallationType, RunOutcome, StopSignal};

pub const CORE_PACKAGE_NAME: &str = "Default";

#[cfg(test)]
mod tests;
