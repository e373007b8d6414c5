//! Utility modules supporting feed fetching.
//!
//! - [`HttpClient`]: shared reqwest client with the crate's user agent
//! - [`sha256_hex`]: content digest recorded for every stored document

mod http;

pub use http::{HttpClient, USER_AGENT};

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `bytes`
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
