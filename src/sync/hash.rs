// src/sync/hash.rs
// Content digest used to decide whether the stylesheet changed.
// MD5 is only a change detector here, not a security check.

use md5::{Digest, Md5};

/// Lowercase hex MD5 of the given text
pub fn content_hash(content: &str) -> String {
    hex::encode(Md5::digest(content.as_bytes()))
}
