use std::time::Duration;

use chanpack_core::CORE_PACKAGE_NAME;

pub const IGNORE_AHEAD_COUNT: usize = 8;

pub const SETTLE_DELAY: Duration = Duration::from_millis(1700);
pub const SETTLE_POLL_ATTEMPTS: usize = 27;

#[derive(Debug, Default)]
pub struct IgnoreBatcher {
    window: Vec<String>,
    open: bool,
    completed: usize,
}

impl IgnoreBatcher {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn open(&mut self, window: Vec<String>) {
        self.window = window;
        self.open = true;
        self.completed = 0;
    }

    pub fn record_done(&mut self) -> bool {
        if !self.open {
            return false;
        }
        self.completed += 1;
        self.completed >= self.window.len()
    }

    pub fn take_window(&mut self) -> Vec<String> {
        self.open = false;
        self.completed = 0;
        std::mem::take(&mut self.window)
    }

    pub fn window(&self) -> &[String] {
        &self.window
    }

    pub fn compute_window(
        current: &str,
        worklist: &[String],
        user_ignored: &[String],
    ) -> Vec<String> {
        let start = worklist
            .iter()
            .position(|name| name == current)
            .unwrap_or(0);
        let end = worklist.len().min(start + IGNORE_AHEAD_COUNT + 1);

        let mut window: Vec<String> = worklist[start..end]
            .iter()
            .filter(|name| name.as_str() != CORE_PACKAGE_NAME)
            .filter(|name| !user_ignored.contains(name))
            .cloned()
            .collect();
        window.sort();
        window
    }
}
