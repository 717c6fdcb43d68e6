use std::fs;
use std::io;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use crate::Clock;

const LOAD_ATTEMPTS: usize = 10;
const LOAD_RETRY_DELAY: Duration = Duration::from_millis(100);

pub fn load_json_document<T>(path: &Path, clock: &dyn Clock) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let mut last_error = None;
    for attempt in 1..=LOAD_ATTEMPTS {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(T::default()),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("failed to read document: {}", path.display()));
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(
                    attempt,
                    path = %path.display(),
                    "transient document parse failure: {err}"
                );
                last_error = Some(err);
                if attempt < LOAD_ATTEMPTS {
                    clock.sleep(LOAD_RETRY_DELAY);
                }
            }
        }
    }

    let detail = last_error
        .map(|err| err.to_string())
        .unwrap_or_else(|| "unknown parse error".to_string());
    Err(anyhow!(
        "failed to parse document after {LOAD_ATTEMPTS} attempts: {}: {detail}",
        path.display()
    ))
}

pub fn write_json_document<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("failed to serialize document: {}", path.display()))?;
    fs::write(path, content)
        .with_context(|| format!("failed to write document: {}", path.display()))
}
