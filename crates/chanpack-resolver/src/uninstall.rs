use std::collections::BTreeSet;

use chanpack_core::{ChannelManifest, ProgressRecord, RepositoryCatalog, StopSignal};
use tracing::debug;

use crate::order::apply_uninstall_priority;

pub fn resolve_uninstall_set(
    progress: &ProgressRecord,
    manifest: &ChannelManifest,
    catalog: &RepositoryCatalog,
    is_downgrade: bool,
) -> Result<Vec<String>, StopSignal> {
    let mut base: BTreeSet<String> = progress.packages_to_uninstall.iter().cloned().collect();

    if is_downgrade {
        base.extend(progress.packages_not_installed.iter().cloned());

        if !manifest.exclusive_install.is_empty() {
            for name in catalog.names() {
                if manifest
                    .exclusive_install
                    .iter()
                    .any(|allowed| allowed == name)
                {
                    base.remove(name);
                }
            }
        }
    }

    if base.is_empty() {
        return Err(StopSignal::NoPackagesAvailable("uninstall".to_string()));
    }

    debug!(count = base.len(), "resolved uninstall set");
    Ok(apply_uninstall_priority(base.into_iter().collect(), manifest))
}
