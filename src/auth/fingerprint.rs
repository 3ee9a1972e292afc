//! Device fingerprinting for refresh-session binding.

use axum::http::HeaderMap;
use sha2::{Digest, Sha256};

/// Headers folded into the fingerprint, in order.
const FINGERPRINT_HEADERS: [&str; 3] = ["accept", "accept-language", "accept-encoding"];

/// Derives a stable device fingerprint from the content-negotiation
/// headers of a request. Refresh sessions are bound to this value: a
/// refresh call from a device with different headers is rejected.
///
/// An absent header contributes an empty segment, so the function is
/// total and two requests agree iff their header values agree.
#[must_use]
pub fn device_fingerprint(headers: &HeaderMap) -> String {
    let mut hasher = Sha256::new();
    for name in FINGERPRINT_HEADERS {
        let value = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        hasher.update(value.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(accept: &str, lang: &str, enc: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(accept) {
            map.insert("accept", v);
        }
        if let Ok(v) = HeaderValue::from_str(lang) {
            map.insert("accept-language", v);
        }
        if let Ok(v) = HeaderValue::from_str(enc) {
            map.insert("accept-encoding", v);
        }
        map
    }

    #[test]
    fn same_headers_same_fingerprint() {
        let a = device_fingerprint(&headers("*/*", "en", "gzip"));
        let b = device_fingerprint(&headers("*/*", "en", "gzip"));
        assert_eq!(a, b);
    }

    #[test]
    fn different_headers_different_fingerprint() {
        let a = device_fingerprint(&headers("*/*", "en", "gzip"));
        let b = device_fingerprint(&headers("*/*", "ru", "gzip"));
        assert_ne!(a, b);
    }

    #[test]
    fn missing_headers_still_hash() {
        let fp = device_fingerprint(&HeaderMap::new());
        // Hex SHA-256 output.
        assert_eq!(fp.len(), 64);
    }
}
