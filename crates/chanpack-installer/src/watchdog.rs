use std::time::Duration;

use chanpack_host::Clock;
use tracing::{error, info};

use crate::gate;

pub const WATCHDOG_ATTEMPTS: usize = 10;
pub const WATCHDOG_DELAY: Duration = Duration::from_secs(2);

pub fn wait_for_completion(clock: &dyn Clock) -> bool {
    for remaining in (1..=WATCHDOG_ATTEMPTS).rev() {
        if !gate::is_running() {
            info!("finished looking for new tasks; the run is complete");
            return true;
        }
        info!(remaining, "looking for new tasks...");
        clock.sleep(WATCHDOG_DELAY);
    }

    if gate::is_running() {
        error!("the run did not finish within the expected time");
        return false;
    }
    true
}
