use crate::constants::DEFAULT_NONCE_LENGTH;
use base64::{
    engine::general_purpose::{STANDARD as BASE64_STANDARD, URL_SAFE_NO_PAD as BASE64},
    Engine,
};
use getrandom::getrandom;
use ring::digest::{digest, SHA256};
use std::ops::{Deref, DerefMut};

/// Produces one fresh random nonce per request. The nonce is never shared
/// across requests; the middleware threads it explicitly through request
/// extensions into rendering and the response header.
#[derive(Debug, Clone)]
pub struct NonceGenerator {
    length: usize,
}

impl NonceGenerator {
    #[inline]
    pub fn new(length: usize) -> Self {
        Self { length }
    }

    #[inline]
    pub fn generate(&self) -> String {
        let mut buffer = vec![0u8; self.length];
        getrandom(&mut buffer).expect("Failed to generate random bytes");
        BASE64.encode(&buffer)
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Default for NonceGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_NONCE_LENGTH)
    }
}

/// The nonce issued for the current request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct RequestNonce(pub String);

impl Deref for RequestNonce {
    type Target = String;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for RequestNonce {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Interleaves two strings character by character; trailing characters of
/// the longer string are appended in order. `merge_strings("2024",
/// "LICENSE")` is `"2L0I2C4ENSE"`. Byte-compatible nonce derivation depends
/// on this exact algorithm.
pub fn merge_strings(s1: &str, s2: &str) -> String {
    let mut result = String::with_capacity(s1.len() + s2.len());
    let mut left = s1.chars();
    let mut right = s2.chars();

    loop {
        let a = left.next();
        let b = right.next();
        if a.is_none() && b.is_none() {
            break;
        }
        if let Some(c) = a {
            result.push(c);
        }
        if let Some(c) = b {
            result.push(c);
        }
    }

    result
}

/// The legacy portal's process-wide nonce: SHA-256 over the interleaved
/// merge of a timestamp string and the public license value, standard
/// base64. Kept only for compatibility with nonces minted by the legacy
/// deployment; new code should use [`NonceGenerator`] per request.
pub fn derive_legacy_nonce(timestamp: &str, public_value: &str) -> String {
    let merged = merge_strings(timestamp, public_value);
    let hash = digest(&SHA256, merged.as_bytes());
    BASE64_STANDARD.encode(hash.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_strings_interleaves() {
        assert_eq!(merge_strings("2024", "LICENSE"), "2L0I2C4ENSE");
    }

    #[test]
    fn merge_strings_handles_empty_inputs() {
        assert_eq!(merge_strings("", "abc"), "abc");
        assert_eq!(merge_strings("abc", ""), "abc");
        assert_eq!(merge_strings("", ""), "");
    }

    #[test]
    fn merge_strings_appends_longer_tail() {
        assert_eq!(merge_strings("ab", "wxyz"), "awbxyz");
        assert_eq!(merge_strings("wxyz", "ab"), "waxbyz");
    }

    #[test]
    fn legacy_nonce_is_deterministic() {
        let a = derive_legacy_nonce("1700000000000", "license-key-123");
        let b = derive_legacy_nonce("1700000000000", "license-key-123");
        assert_eq!(a, b);
    }

    #[test]
    fn legacy_nonce_changes_with_either_input() {
        let base = derive_legacy_nonce("1700000000000", "license-key-123");
        assert_ne!(base, derive_legacy_nonce("1700000000001", "license-key-123"));
        assert_ne!(base, derive_legacy_nonce("1700000000000", "license-key-124"));
    }

    #[test]
    fn legacy_nonce_is_base64_of_sha256() {
        let nonce = derive_legacy_nonce("1700000000000", "license-key-123");
        // 32 digest bytes -> 44 base64 chars including padding.
        assert_eq!(nonce.len(), 44);
        assert!(nonce.ends_with('='));
    }

    #[test]
    fn generated_nonces_are_unique() {
        let generator = NonceGenerator::default();
        let a = generator.generate();
        let b = generator.generate();

        assert!(!a.is_empty());
        assert_ne!(a, b);
    }

    #[test]
    fn generated_nonce_length_tracks_byte_length() {
        let short = NonceGenerator::new(8).generate();
        let long = NonceGenerator::new(32).generate();
        assert!(short.len() < long.len());
    }

    #[test]
    fn request_nonce_derefs_to_string() {
        let nonce = RequestNonce("abc123".to_string());
        assert_eq!(&*nonce, "abc123");
        assert_eq!(nonce.len(), 6);
    }
}
