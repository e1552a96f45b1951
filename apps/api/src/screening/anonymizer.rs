//! One-way anonymization of identifying form fields.

use sha2::{Digest, Sha256};

/// SHA-256 of the raw UTF-8 input as 64 lowercase hex chars. Any input is valid, including "".
pub fn anonymize(raw: &str) -> String {
    hex::encode(Sha256::digest(raw.as_bytes()))
}
