//! Challenge-response for authenticated writes.
//!
//! The firmware authorizes a POST when the `X-HS-PIN` header equals
//! `md5(nonce ++ md5(pin))`, where the inner digest is hex-encoded before
//! concatenation and both inputs are UTF-8. The construction must match the
//! vendor app bit for bit; there is no transport encryption on top.

use md5::{Digest, Md5};

/// Compute the `X-HS-PIN` header value for one nonce. Lowercase hex.
///
/// Nonces are single-use: callers fetch a fresh status immediately before
/// hashing rather than reusing the one cached by the poll loop.
pub fn pin_hash(nonce: &str, pin: &str) -> String {
    let inner = hex::encode(Md5::digest(pin.as_bytes()));
    let mut outer = Md5::new();
    outer.update(nonce.as_bytes());
    outer.update(inner.as_bytes());
    hex::encode(outer.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Reference vectors computed independently with coreutils md5sum:
    //   md5("4242")            = fe7ecc4de28b2c83c016b5c6c2acd826
    //   md5("abc123" ++ inner) = 7225cbada830dbb30ff8cc2bc3c1ae91
    #[test]
    fn matches_reference_construction() {
        assert_eq!(pin_hash("abc123", "4242"), "7225cbada830dbb30ff8cc2bc3c1ae91");
        assert_eq!(pin_hash("deadbeef", "1234"), "205d3339242937d3ed4cc1e4e87e9b6d");
    }

    #[test]
    fn deterministic_lowercase_hex() {
        let a = pin_hash("0003c76eb9", "0000");
        let b = pin_hash("0003c76eb9", "0000");
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn nonce_changes_the_digest() {
        assert_ne!(pin_hash("aaaa", "4242"), pin_hash("bbbb", "4242"));
    }
}
