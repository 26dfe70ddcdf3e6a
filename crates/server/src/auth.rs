//! API key authentication.
//!
//! Keys are held as SHA-256 digests. A presented key is hashed once and
//! compared against every configured digest, so the time taken does not
//! depend on which key matched or where two digests first differ.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

type KeyDigest = [u8; 32];

/// The set of keys accepted by the service.
#[derive(Debug, Clone, Default)]
pub struct ApiKeys {
    digests: Vec<KeyDigest>,
    enabled: bool,
}

impl ApiKeys {
    /// Builds an enabled key set. Blank entries are ignored.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let digests = keys
            .into_iter()
            .filter_map(|key| {
                let key = key.as_ref().trim();
                (!key.is_empty()).then(|| digest(key))
            })
            .collect();

        Self { digests, enabled: true }
    }

    /// A key set that lets every request through.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }

    /// Checks `presented` against all configured keys without stopping at
    /// the first match.
    pub fn verify(&self, presented: &str) -> bool {
        let presented = digest(presented);
        let matched = self
            .digests
            .iter()
            .fold(0u8, |acc, known| acc | u8::from(digests_equal(&presented, known)));
        matched == 1
    }
}

fn digest(key: &str) -> KeyDigest {
    Sha256::digest(key.as_bytes()).into()
}

fn digests_equal(a: &KeyDigest, b: &KeyDigest) -> bool {
    a.iter().zip(b.iter()).fold(0u8, |diff, (x, y)| diff | (x ^ y)) == 0
}

/// Rejects requests without a valid `x-api-key` header.
pub async fn require_api_key(State(state): State<AppState>, request: Request, next: Next) -> Result<Response, ApiError> {
    if !state.api_keys.is_enabled() {
        return Ok(next.run(request).await);
    }

    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    if !state.api_keys.verify(presented) {
        tracing::debug!(has_key = !presented.is_empty(), "rejected request");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verify_accepts_any_configured_key() {
        let keys = ApiKeys::new(["alpha", "beta"]);
        assert!(keys.verify("alpha"));
        assert!(keys.verify("beta"));
        assert!(!keys.verify("gamma"));
        assert!(!keys.verify(""));
    }

    #[test]
    fn test_blank_keys_are_ignored() {
        let keys = ApiKeys::new(["", "  ", "secret"]);
        assert_eq!(keys.len(), 1);
        assert!(!keys.verify(""));
    }

    #[test]
    fn test_empty_key_set_rejects_everything() {
        let keys = ApiKeys::new(Vec::<String>::new());
        assert!(keys.is_enabled());
        assert!(keys.is_empty());
        assert!(!keys.verify("anything"));
    }

    #[test]
    fn test_disabled_key_set() {
        assert!(!ApiKeys::disabled().is_enabled());
    }

    #[test]
    fn test_digest_comparison() {
        let a = digest("same");
        let b = digest("same");
        let c = digest("other");
        assert!(digests_equal(&a, &b));
        assert!(!digests_equal(&a, &c));
    }
}
