/// Webhook signature utilities
///
/// The speech provider signs every callback body with HMAC-SHA256 using a
/// shared secret and puts the hex-encoded MAC in the `X-Webhook-Signature`
/// header. The receiver recomputes the MAC over the raw body bytes and
/// compares in constant time before touching any task row.
///
/// # Example
///
/// ```
/// use voxgate_shared::webhook::{sign_payload, verify_signature};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "webhook-secret";
/// let body = br#"{"id":"ext-1","result":"https://cdn/audio.mp3"}"#;
///
/// let signature = sign_payload(secret, body)?;
/// assert!(verify_signature(secret, body, &signature));
/// assert!(!verify_signature(secret, b"tampered", &signature));
/// # Ok(())
/// # }
/// ```

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the hex-encoded HMAC of the request body
pub const SIGNATURE_HEADER: &str = "X-Webhook-Signature";

/// Error type for signature operations
#[derive(Debug, thiserror::Error)]
pub enum SignatureError {
    /// The shared secret could not be used as an HMAC key
    #[error("Invalid signing key: {0}")]
    InvalidKey(String),
}

/// Computes the hex-encoded HMAC-SHA256 of a payload
///
/// Used by tests and by any outbound signing; the provider performs the
/// same computation on its side.
///
/// # Errors
///
/// Returns `SignatureError::InvalidKey` if the HMAC key setup fails
pub fn sign_payload(secret: &str, payload: &[u8]) -> Result<String, SignatureError> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| SignatureError::InvalidKey(e.to_string()))?;
    mac.update(payload);

    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Verifies a hex-encoded HMAC-SHA256 signature over a payload
///
/// Comparison happens inside the hmac crate's `verify_slice`, which is
/// constant-time. Any malformed input (bad hex, bad key) verifies false
/// rather than erroring, so callers can treat the result as a plain gate.
pub fn verify_signature(secret: &str, payload: &[u8], signature_hex: &str) -> bool {
    let expected = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => return false,
    };
    mac.update(payload);

    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let secret = "test-webhook-secret";
        let body = br#"{"id":"ext-123","result":"https://cdn/a.mp3","subtitle":null}"#;

        let signature = sign_payload(secret, body).expect("Signing should succeed");
        assert_eq!(signature.len(), 64); // SHA-256 hex

        assert!(verify_signature(secret, body, &signature));
    }

    #[test]
    fn test_signature_is_deterministic() {
        let secret = "secret";
        let body = b"payload";

        let s1 = sign_payload(secret, body).unwrap();
        let s2 = sign_payload(secret, body).unwrap();
        assert_eq!(s1, s2);
    }

    #[test]
    fn test_verify_rejects_tampered_body() {
        let secret = "secret";
        let signature = sign_payload(secret, b"original").unwrap();

        assert!(!verify_signature(secret, b"modified", &signature));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let body = b"payload";
        let signature = sign_payload("secret-a", body).unwrap();

        assert!(!verify_signature("secret-b", body, &signature));
    }

    #[test]
    fn test_verify_rejects_malformed_hex() {
        let secret = "secret";

        assert!(!verify_signature(secret, b"payload", "not-hex-at-all"));
        assert!(!verify_signature(secret, b"payload", ""));
        assert!(!verify_signature(secret, b"payload", "abc")); // odd length
    }

    #[test]
    fn test_verify_rejects_truncated_signature() {
        let secret = "secret";
        let signature = sign_payload(secret, b"payload").unwrap();

        assert!(!verify_signature(secret, b"payload", &signature[..32]));
    }
}
