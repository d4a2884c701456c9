//! Diagnostic warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the tree builder and the selector compiler to report recovered
//! markup and unsupported syntax without failing.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Whether warnings are printed at all.
static ENABLED: AtomicBool = AtomicBool::new(true);

/// Warn about a recovered or unsupported construct (prints once per unique message)
///
/// # Example
/// ```
/// loupe_common::warning::warn_once("Selector", "unsupported pseudo-class ':hover'");
/// ```
pub fn warn_once(component: &str, message: &str) {
    if !ENABLED.load(Ordering::Relaxed) {
        return;
    }

    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[loupe {component}] ⚠ {message}").yellow());
    }
}

/// Clear all recorded warnings (call before processing a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

/// Turn warning output on or off for the whole process.
pub fn set_warnings_enabled(enabled: bool) {
    ENABLED.store(enabled, Ordering::Relaxed);
}

/// Returns `true` when warnings are currently printed.
#[must_use]
pub fn warnings_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}
