//! Detached Ed25519 verification over `timestamp-bytes ‖ body-bytes`
//! (spec §4.1 dialect A, step 4). Every dialect-A request is checked,
//! including liveness pings.

use ed25519_dalek::{Signature, VerifyingKey};

/// `public_key_hex`/`signature_hex` are both hex-encoded per the platform's
/// header convention (`X-Signature-Ed25519` is 64 bytes of hex).
pub fn verify_detached(public_key_hex: &str, signature_hex: &str, timestamp: &str, body: &[u8]) -> bool {
    let Some(key) = decode_verifying_key(public_key_hex) else { return false };
    let Some(signature) = decode_signature(signature_hex) else { return false };

    let mut message = Vec::with_capacity(timestamp.len() + body.len());
    message.extend_from_slice(timestamp.as_bytes());
    message.extend_from_slice(body);

    key.verify_strict(&message, &signature).is_ok()
}

fn decode_verifying_key(hex_str: &str) -> Option<VerifyingKey> {
    let bytes = hex::decode(hex_str).ok()?;
    let bytes: [u8; 32] = bytes.try_into().ok()?;
    VerifyingKey::from_bytes(&bytes).ok()
}

fn decode_signature(hex_str: &str) -> Option<Signature> {
    let bytes = hex::decode(hex_str).ok()?;
    let bytes: [u8; 64] = bytes.try_into().ok()?;
    Some(Signature::from_bytes(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::rngs::OsRng;

    fn sign(signing_key: &SigningKey, timestamp: &str, body: &[u8]) -> String {
        let mut message = timestamp.as_bytes().to_vec();
        message.extend_from_slice(body);
        hex::encode(signing_key.sign(&message).to_bytes())
    }

    #[test]
    fn valid_signature_is_accepted() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
        let timestamp = "1700000000";
        let body = br#"{"type":1}"#;
        let signature_hex = sign(&signing_key, timestamp, body);

        assert!(verify_detached(&public_key_hex, &signature_hex, timestamp, body));
    }

    #[test]
    fn tampered_body_is_rejected() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
        let timestamp = "1700000000";
        let signature_hex = sign(&signing_key, timestamp, br#"{"type":1}"#);

        assert!(!verify_detached(&public_key_hex, &signature_hex, timestamp, br#"{"type":2}"#));
    }

    #[test]
    fn tampered_timestamp_is_rejected() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let public_key_hex = hex::encode(signing_key.verifying_key().to_bytes());
        let body = br#"{"type":1}"#;
        let signature_hex = sign(&signing_key, "1700000000", body);

        assert!(!verify_detached(&public_key_hex, &signature_hex, "1700000001", body));
    }

    #[test]
    fn wrong_key_is_rejected() {
        let signing_key = SigningKey::generate(&mut OsRng);
        let other_key = SigningKey::generate(&mut OsRng);
        let wrong_public_key_hex = hex::encode(other_key.verifying_key().to_bytes());
        let timestamp = "1700000000";
        let body = br#"{"type":1}"#;
        let signature_hex = sign(&signing_key, timestamp, body);

        assert!(!verify_detached(&wrong_public_key_hex, &signature_hex, timestamp, body));
    }
}
