//! compression/classify.rs
//! Allocation-failure detection.
//!
//! Structured first: codecs that can tell report `CodecError::Allocation`.
//! Everything else falls back to matching the error text, since runtimes that
//! trap on a full arena only give us a message.

use crate::compression::types::CodecError;

/// Substrings (lower-case) that mark a memory-exhaustion message.
const ALLOCATION_NEEDLES: &[&str] = &[
    "out of memory",
    "cannot enlarge memory",
    "allocation error",
    "not enough memory",
    // abort signal from a trapped runtime, e.g. `abort()` or `Aborted(OOM)`
    "abort(",
    "aborted(",
];

/// Matched as a whole word only, so "room" or "bloom" do not count.
const OOM_TOKEN: &str = "oom";

pub fn is_allocation_error(err: &CodecError) -> bool {
    match err {
        CodecError::Allocation { .. } => true,
        other => is_allocation_message(other.message()),
    }
}

/// Text-only half of the classifier.
pub fn is_allocation_message(msg: &str) -> bool {
    let lower = msg.to_ascii_lowercase();
    if ALLOCATION_NEEDLES.iter().any(|n| lower.contains(n)) {
        return true;
    }
    lower
        .split(|c: char| !c.is_ascii_alphanumeric())
        .any(|word| word == OOM_TOKEN)
}
