use std::sync::atomic::{AtomicU8, Ordering};

pub const CLEAN_REPLACEMENT_FLAG: u8 = 1;
pub const RESTORE_ORPHANED_FLAG: u8 = 2;
const ALL_RUN_FLAGS: u8 = CLEAN_REPLACEMENT_FLAG | RESTORE_ORPHANED_FLAG;

static RUN_FLAGS: AtomicU8 = AtomicU8::new(0);

pub fn is_running() -> bool {
    RUN_FLAGS.load(Ordering::SeqCst) != 0
}

pub(crate) fn try_begin_run() -> bool {
    RUN_FLAGS
        .compare_exchange(0, ALL_RUN_FLAGS, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
}

pub(crate) fn clear_flag(flag: u8) {
    RUN_FLAGS.fetch_and(!flag, Ordering::SeqCst);
}

pub(crate) fn finish_run() {
    RUN_FLAGS.store(0, Ordering::SeqCst);
}
