//! Best-effort access token inspection
//!
//! Access tokens are opaque to the session core. When they happen to be JWTs
//! the `exp` claim is decoded for display and diagnostics only; refresh is
//! always driven by the server's 401, never by this clock.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD as B64_URL_SAFE, Engine};
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

/// JWT claims (only includes fields we care about)
#[derive(Debug, Deserialize)]
struct JwtClaims {
    /// Expiration time (seconds since Unix epoch)
    #[serde(default)]
    exp: Option<i64>,
}

/// Parse the expiry claim from a token (gracefully handles non-JWT tokens)
///
/// Returns the expiration timestamp in seconds since Unix epoch, or `None` if
/// the token is not a JWT or carries no `exp` claim.
pub fn expiry(token: &str) -> Option<i64> {
    let mut parts = token.split('.');
    let (Some(_header), Some(payload), Some(_signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return None;
    };

    // Tolerate padded and unpadded base64url
    let decoded = B64_URL_SAFE.decode(payload.trim_end_matches('=')).ok()?;
    serde_json::from_slice::<JwtClaims>(&decoded).ok()?.exp
}

/// Seconds until `token` expires; negative once it has expired
#[allow(clippy::cast_possible_wrap)] // System time in seconds won't overflow i64 for centuries
pub fn seconds_remaining(token: &str) -> Option<i64> {
    let exp = expiry(token)?;
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64;
    Some(exp - now)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::cast_possible_wrap)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::URL_SAFE as B64_URL_SAFE_PADDED;

    fn jwt(payload: &str) -> String {
        let header = B64_URL_SAFE.encode(r#"{"typ":"JWT","alg":"HS256"}"#);
        let payload = B64_URL_SAFE.encode(payload);
        let signature = B64_URL_SAFE.encode("dummy_signature");
        format!("{header}.{payload}.{signature}")
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as i64
    }

    #[test]
    fn test_expiry_valid_token() {
        let exp = now() + 3600;
        assert_eq!(expiry(&jwt(&format!(r#"{{"exp":{exp}}}"#))), Some(exp));
    }

    #[test]
    fn test_expiry_padded_payload() {
        let header = B64_URL_SAFE_PADDED.encode(r#"{"alg":"HS256"}"#);
        let payload = B64_URL_SAFE_PADDED.encode(r#"{"exp":1700000000}"#);
        let token = format!("{header}.{payload}.sig");
        assert_eq!(expiry(&token), Some(1_700_000_000));
    }

    #[test]
    fn test_expiry_no_exp_claim() {
        assert_eq!(expiry(&jwt(r#"{"sub":"user123"}"#)), None);
    }

    #[test]
    fn test_expiry_not_a_jwt() {
        assert_eq!(expiry("opaque_access_token"), None);
        assert_eq!(expiry("not.jwt"), None);
        assert_eq!(expiry("not.a.jwt.with.four.parts"), None);
        assert_eq!(expiry("header.!!!invalid_base64!!!.signature"), None);
    }

    #[test]
    fn test_seconds_remaining() {
        let remaining = seconds_remaining(&jwt(&format!(r#"{{"exp":{}}}"#, now() + 600))).unwrap();
        assert!((590..=600).contains(&remaining));

        let expired = seconds_remaining(&jwt(&format!(r#"{{"exp":{}}}"#, now() - 60))).unwrap();
        assert!(expired < 0);
    }
}
