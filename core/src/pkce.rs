//! PKCE verifier/challenge generation for the authorization code flow.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

pub const MIN_VERIFIER_LEN: usize = 43;
pub const MAX_VERIFIER_LEN: usize = 128;
pub const DEFAULT_VERIFIER_LEN: usize = 56;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Generate a verifier of `length` URL-safe characters (clamped to the
/// RFC 7636 range) and its S256 challenge.
pub fn generate_pkce_pair(length: usize) -> PkcePair {
    let length = length.clamp(MIN_VERIFIER_LEN, MAX_VERIFIER_LEN);
    // Four base64 characters per three random bytes.
    let mut random = vec![0u8; length.div_ceil(4) * 3];
    rand::thread_rng().fill_bytes(&mut random);

    let mut code_verifier = URL_SAFE_NO_PAD.encode(random);
    code_verifier.truncate(length);
    let code_challenge = code_challenge_s256(&code_verifier);

    PkcePair {
        code_verifier,
        code_challenge,
    }
}

pub fn code_challenge_s256(verifier: &str) -> String {
    let digest = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pair_has_requested_length_and_consistent_challenge() {
        let pair = generate_pkce_pair(DEFAULT_VERIFIER_LEN);
        assert_eq!(pair.code_verifier.len(), DEFAULT_VERIFIER_LEN);
        assert_eq!(pair.code_challenge, code_challenge_s256(&pair.code_verifier));
    }

    #[test]
    fn length_is_clamped() {
        assert_eq!(generate_pkce_pair(10).code_verifier.len(), MIN_VERIFIER_LEN);
        assert_eq!(generate_pkce_pair(500).code_verifier.len(), MAX_VERIFIER_LEN);
    }

    #[test]
    fn verifier_is_url_safe() {
        let pair = generate_pkce_pair(128);
        assert!(pair
            .code_verifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn challenge_matches_rfc7636_example() {
        // Appendix B of RFC 7636.
        assert_eq!(
            code_challenge_s256("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn challenge_has_no_padding() {
        for verifier in ["", "a", "ab", "abc", "any verifier string at all"] {
            let challenge = code_challenge_s256(verifier);
            assert!(!challenge.contains('='));
            assert_eq!(challenge.len(), 43);
        }
    }
}
