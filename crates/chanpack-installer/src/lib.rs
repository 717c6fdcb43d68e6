mod batcher;
mod development;
mod fsops;
mod gate;
mod install;
mod run;
mod session;
mod swap;
mod uninstall;
mod vcs;
mod watchdog;

pub use batcher::{IgnoreBatcher, IGNORE_AHEAD_COUNT, SETTLE_DELAY, SETTLE_POLL_ATTEMPTS};
pub use gate::{is_running, CLEAN_REPLACEMENT_FLAG, RESTORE_ORPHANED_FLAG};
pub use run::{run_migration_blocking, spawn_migration};
pub use session::{MigrationConfig, MigrationSession, SessionPaths};
pub use vcs::{parse_submodule_descriptor, SubmoduleEntry};
pub use watchdog::{wait_for_completion, WATCHDOG_ATTEMPTS, WATCHDOG_DELAY};
