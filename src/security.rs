use hmac::{Hmac, Mac};
use md5::Md5;
use sha2::{Digest, Sha256};

type HmacSha256 = Hmac<Sha256>;

/// Verify HMAC-SHA256 signature on a signed client request
///
/// This proves that the request came from the official storefront app
/// and not from an arbitrary HTTP client trying to move wallet funds.
///
/// # Arguments
/// * `data` - The data that was signed
/// * `signature` - The hex-encoded HMAC signature
/// * `secret` - The shared secret key (from environment)
pub fn verify_hmac(data: &str, signature: &str, secret: &str) -> bool {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(m) => m,
        Err(_) => {
            tracing::error!("Failed to create HMAC instance");
            return false;
        }
    };

    mac.update(data.as_bytes());

    let sig_bytes = match hex::decode(signature) {
        Ok(bytes) => bytes,
        Err(_) => {
            tracing::warn!("Invalid hex signature format");
            return false;
        }
    };

    mac.verify_slice(&sig_bytes).is_ok()
}

/// Compute the gateway webhook signature: hex MD5 of `"<data>:<api_key>"`
///
/// This is the scheme the QR aggregator uses to sign its payment
/// notifications. `data` is the raw JSON string exactly as received in the
/// form body; re-serializing it would break the digest.
pub fn gateway_signature(data: &str, api_key: &str) -> String {
    let mut hasher = Md5::new();
    hasher.update(data.as_bytes());
    hasher.update(b":");
    hasher.update(api_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a gateway webhook signature
///
/// Compares SHA-256 digests of both hex strings rather than the strings
/// themselves so the comparison is not length/content short-circuiting.
pub fn verify_gateway_signature(data: &str, signature: &str, api_key: &str) -> bool {
    let expected = gateway_signature(data, api_key);
    Sha256::digest(expected.as_bytes()) == Sha256::digest(signature.as_bytes())
}

/// Validate timestamp is within acceptable range
///
/// Prevents replay attacks by ensuring the request is recent.
///
/// # Arguments
/// * `timestamp` - Unix timestamp in seconds from the client
/// * `max_age_secs` - Maximum age allowed in seconds
pub fn validate_timestamp(timestamp: i64, max_age_secs: i64) -> bool {
    let now = chrono::Utc::now().timestamp();
    let age_seconds = (now - timestamp).abs();

    if age_seconds > max_age_secs {
        tracing::warn!(
            "Timestamp too old: {} seconds (max: {})",
            age_seconds,
            max_age_secs
        );
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sign(data: &str, secret: &str) -> String {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).unwrap();
        mac.update(data.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    #[test]
    fn test_verify_hmac_valid() {
        let data = r#"{"amount":1900}"#;
        let secret = "test-secret";
        let signature = sign(data, secret);
        assert!(verify_hmac(data, &signature, secret));
    }

    #[test]
    fn test_verify_hmac_wrong_secret() {
        let data = r#"{"amount":1900}"#;
        let signature = sign(data, "secret-a");
        assert!(!verify_hmac(data, &signature, "secret-b"));
    }

    #[test]
    fn test_verify_hmac_bad_hex() {
        assert!(!verify_hmac("data", "not-hex!", "secret"));
    }

    #[test]
    fn test_gateway_signature_known_value() {
        // md5("hello:key") = 7e2baff19091d47e1d60713b128b297b
        assert_eq!(
            gateway_signature("hello", "key"),
            "7e2baff19091d47e1d60713b128b297b"
        );
    }

    #[test]
    fn test_verify_gateway_signature() {
        let data = r#"{"id_pay":"754349","ref1":"user-1","amount":"19.00"}"#;
        let key = "tmw-api-key";
        let sig = gateway_signature(data, key);
        assert!(verify_gateway_signature(data, &sig, key));
        assert!(!verify_gateway_signature(data, &sig, "other-key"));
        assert!(!verify_gateway_signature(data, "deadbeef", key));
    }

    #[test]
    fn test_validate_timestamp() {
        let now = chrono::Utc::now().timestamp();
        assert!(validate_timestamp(now, 300));
        assert!(validate_timestamp(now - 299, 300));
        assert!(!validate_timestamp(now - 301, 300));
        assert!(!validate_timestamp(now + 301, 300));
    }
}
