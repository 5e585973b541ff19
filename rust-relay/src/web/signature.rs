//! Notification signature verification.
//!
//! The platform signs each notification with HMAC-SHA1 over the raw request
//! body and sends it as `x-hub-signature: sha1=<hex digest>`. Verification
//! must run on the bytes as received, before any JSON parsing.

use hmac::{Hmac, Mac};
use sha1::Sha1;
use tracing::warn;

use crate::error::RelayError;

type HmacSha1 = Hmac<Sha1>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature";

/// Compute the `sha1=<hex>` signature of `body` under `secret`.
pub fn compute_signature(secret: &str, body: &[u8]) -> Option<String> {
    let mut mac = match HmacSha1::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            warn!("signature_invalid_key");
            return None;
        }
    };

    mac.update(body);

    Some(format!("sha1={}", hex::encode(mac.finalize().into_bytes())))
}

/// Verify `signature` (the full header value) against the raw `body`.
pub fn verify_signature(secret: &str, body: &[u8], signature: &str) -> Result<(), RelayError> {
    let expected = compute_signature(secret, body).ok_or(RelayError::InvalidSignature)?;

    if constant_time_compare(&expected, signature) {
        Ok(())
    } else {
        warn!(
            expected_length = expected.len(),
            actual_length = signature.len(),
            body_length = body.len(),
            "signature_mismatch"
        );
        Err(RelayError::InvalidSignature)
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check if signature verification is enabled.
pub fn is_signature_verification_enabled(secret: &Option<String>) -> bool {
    secret
        .as_ref()
        .map(|k| !k.trim().is_empty())
        .unwrap_or(false)
}
