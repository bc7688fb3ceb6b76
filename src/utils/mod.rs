//! Utility functions and helpers.

pub mod http;

use std::sync::{Mutex, MutexGuard, OnceLock};

use regex::Regex;

/// Lock a mutex, recovering the data if a previous holder panicked.
///
/// Every critical section in this crate is a short, non-awaiting update,
/// so the data is consistent even after a poisoning panic.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Whether a query is made only of Hangul initial consonants (e.g. "ㅅㅅㅈㅈ").
pub fn is_chosung_query(query: &str) -> bool {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

    PATTERN
        .get_or_init(|| Regex::new(r"^[ㄱ-ㅎ]+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(query.trim()))
}
