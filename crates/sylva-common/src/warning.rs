//! Engine warnings with colored terminal output.
//!
//! Provides deduplication to avoid spamming the same warning multiple times.
//! Used by the markup parser, the CSS engine and the XSLT transformer to
//! report input they skip or only partially understand.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about unsupported input (prints once per unique message).
///
/// Returns `true` when the message was printed, `false` when it was a
/// duplicate.
///
/// # Example
/// ```ignore
/// warn_once("CSS", "unsupported pseudo-class ':hover'");
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[sylva {component}] {message}").yellow());
    }
    should_print
}

/// Clear all recorded warnings (call before processing a new document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_warning_is_suppressed() {
        let component = "warning-test-dedup";
        assert!(warn_once(component, "first"));
        assert!(!warn_once(component, "first"));
        assert!(warn_once(component, "second"));
    }
}
