// Webhook signatures: hex(HMAC-SHA256(secret, body))

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

pub const SIGNATURE_HEADER: &str = "x-pse-signature";

fn keyed(secret: &str, body: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(body);
    mac
}

/// Hex-encoded signature of `body`
pub fn sign(secret: &str, body: &[u8]) -> String {
    hex::encode(keyed(secret, body).finalize().into_bytes())
}

/// Constant-time check of a hex signature against `body`
pub fn verify(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    keyed(secret, body).verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signed_body_verifies() {
        let body = br#"{"transaction_id":"tx-1","status":"APPROVED"}"#;
        let signature = sign("secret", body);
        assert_eq!(signature.len(), 64);
        assert!(verify("secret", body, &signature));
        assert!(verify("secret", body, &signature.to_uppercase()));
    }

    #[test]
    fn tampered_body_or_wrong_key_fails() {
        let signature = sign("secret", b"original");
        assert!(!verify("secret", b"modified", &signature));
        assert!(!verify("other", b"original", &signature));
        assert!(!verify("secret", b"original", "not-hex"));
        assert!(!verify("secret", b"original", ""));
    }

    #[test]
    fn empty_secret_still_signs() {
        let signature = sign("", b"body");
        assert_eq!(signature.len(), 64);
        assert!(verify("", b"body", &signature));
    }

    #[test]
    fn known_vector() {
        // RFC 4231 test case 2
        assert_eq!(
            sign("Jefe", b"what do ya want for nothing?"),
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }
}
