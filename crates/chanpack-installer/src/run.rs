use std::thread::JoinHandle;

use anyhow::Result;
use chanpack_core::RunOutcome;
use tracing::{info, warn};

use crate::gate;
use crate::session::{MigrationConfig, MigrationSession};

pub fn run_migration_blocking(config: MigrationConfig) -> Result<Option<RunOutcome>> {
    if !gate::try_begin_run() {
        warn!("a migration is already running; wait until it finishes");
        return Ok(None);
    }

    let _guard = RunGuard;
    let mut session = MigrationSession::new(config)?;
    let outcome = session.run()?;

    match &outcome {
        RunOutcome::Completed { failed } if failed.is_empty() => {
            info!("the migration completed successfully");
        }
        RunOutcome::Completed { failed } => {
            warn!(count = failed.len(), "the migration completed with failures: {failed:?}");
        }
        RunOutcome::Cancelled => info!("the migration was cancelled"),
        RunOutcome::Empty => info!("the migration had nothing to do"),
    }
    Ok(Some(outcome))
}

pub fn spawn_migration(config: MigrationConfig) -> Option<JoinHandle<Result<RunOutcome>>> {
    if gate::is_running() {
        warn!("a migration is already running; wait until it finishes");
        return None;
    }

    Some(std::thread::spawn(move || {
        match run_migration_blocking(config)? {
            Some(outcome) => Ok(outcome),
            None => Ok(RunOutcome::Empty),
        }
    }))
}

struct RunGuard;

impl Drop for RunGuard {
    fn drop(&mut self) {
        gate::finish_run();
    }
}
