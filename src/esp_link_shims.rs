//! `critical-section` 1.x provider for the device build.
//!
//! The buzzer and console channels (`embassy-sync`) lock through
//! `critical-section`, which expects the application to export the
//! acquire/release pair.  The lock is a thread-owned flag guarded by a
//! std mutex; nested acquires on the owning thread only bump a counter.
//! Host builds get the pair from the crate's `std` feature instead.

use std::cell::Cell;
use std::sync::{Condvar, Mutex, PoisonError};
use std::thread::{self, ThreadId};

static OWNER: Mutex<Option<ThreadId>> = Mutex::new(None);
static RELEASED: Condvar = Condvar::new();

thread_local! {
    static DEPTH: Cell<u8> = const { Cell::new(0) };
}

#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_acquire() -> u8 {
    let depth = DEPTH.get();
    if depth == 0 {
        let me = thread::current().id();
        let mut owner = OWNER.lock().unwrap_or_else(PoisonError::into_inner);
        while owner.is_some() {
            owner = RELEASED
                .wait(owner)
                .unwrap_or_else(PoisonError::into_inner);
        }
        *owner = Some(me);
    }
    DEPTH.set(depth.saturating_add(1));
    depth
}

#[unsafe(no_mangle)]
pub extern "C" fn _critical_section_1_0_release(_token: u8) {
    match DEPTH.get() {
        0 => {}
        1 => {
            DEPTH.set(0);
            *OWNER.lock().unwrap_or_else(PoisonError::into_inner) = None;
            RELEASED.notify_one();
        }
        depth => DEPTH.set(depth - 1),
    }
}
