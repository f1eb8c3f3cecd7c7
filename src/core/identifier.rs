//! Store-native identifier helpers
//!
//! Records are keyed by 24-hex-character object identifiers, the format
//! document stores use for their primary key.

use chrono::Utc;
use regex::Regex;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU32, Ordering};
use uuid::Uuid;

/// Name under which the canonical identifier is exposed to clients
pub const CLIENT_ID_FIELD: &str = "id";

/// Default canonical identifier field of the backing store
pub const DEFAULT_IDENTIFIER_FIELD: &str = "_id";

/// Check whether a string is a valid store-native object identifier
///
/// Only the 24-hex-character textual form is accepted.
pub fn is_object_id(value: &str) -> bool {
    static OBJECT_ID_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = OBJECT_ID_REGEX.get_or_init(|| Regex::new(r"^[0-9a-fA-F]{24}$").unwrap());
    regex.is_match(value)
}

/// Generate a fresh object identifier
///
/// Layout follows the usual object-id scheme: 4 bytes of seconds since the
/// epoch, 5 random bytes, then a 3-byte wrapping counter.
pub fn generate_object_id() -> String {
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();
    let counter = COUNTER.get_or_init(|| {
        let seed = *Uuid::new_v4().as_bytes();
        AtomicU32::new(u32::from_be_bytes([0, seed[0], seed[1], seed[2]]))
    });

    let seconds = Utc::now().timestamp() as u32;
    let random = Uuid::new_v4();
    let count = counter.fetch_add(1, Ordering::Relaxed) & 0x00ff_ffff;

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..9].copy_from_slice(&random.as_bytes()[..5]);
    bytes[9..].copy_from_slice(&count.to_be_bytes()[1..]);

    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
