//! Hashing helpers and payment channel claim signature verification.

use ed25519_dalek::Verifier;
use sha2::{Digest, Sha256, Sha512};

use crate::constants::PAYCHAN_CLAIM_PREFIX;
use crate::models::Drops;

/// Prefix byte of an Ed25519 public key in its 33-byte transport form.
pub const ED25519_KEY_PREFIX: u8 = 0xED;

/// Returns the first 32 bytes of SHA-512
/// hash of message.
pub fn sha512_first_half(message: &[u8]) -> [u8; 32] {
    let mut sha512 = Sha512::new();

    sha512.update(message);
    sha512.finalize()[..32]
        .try_into()
        .expect("Invalid slice length")
}

/// Returns the SHA-256 hash of message.
pub fn sha256_digest(message: &[u8]) -> [u8; 32] {
    let mut sha256 = Sha256::new();

    sha256.update(message);
    sha256.finalize()[..]
        .try_into()
        .expect("Invalid slice length")
}

/// Returns whether `public_key` has the shape of a signing key:
/// 33 bytes with prefix 0x02, 0x03 or 0xED, or 65 bytes with prefix 0x04.
pub fn is_valid_key_shape(public_key: &[u8]) -> bool {
    match (public_key.len(), public_key.first()) {
        (33, Some(&(0x02 | 0x03))) => true,
        (33, Some(&ED25519_KEY_PREFIX)) => true,
        (65, Some(&0x04)) => true,
        _ => false,
    }
}

/// Builds the claim signing message for a payment channel: the 4-byte
/// `CLM\0` prefix, the 32-byte channel id, and the authorized amount
/// as 8 bytes big-endian.
pub fn claim_message(channel: &[u8; 32], amount: Drops) -> [u8; 44] {
    let mut message = [0; 44];

    message[..4].copy_from_slice(&PAYCHAN_CLAIM_PREFIX);
    message[4..36].copy_from_slice(channel);
    message[36..].copy_from_slice(&amount.to_be_bytes());

    message
}

/// Verifies `signature` over `message` under `public_key`.
///
/// Ed25519 keys sign the raw message (the curve hashes internally);
/// secp256k1 keys sign the SHA-512-half digest of the message with a
/// DER-encoded signature.
pub fn is_valid_message(public_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    match public_key.first() {
        Some(&ED25519_KEY_PREFIX) if public_key.len() == 33 => {
            is_valid_ed25519(&public_key[1..], signature, message)
        }
        Some(_) => is_valid_secp256k1(public_key, signature, &sha512_first_half(message)),
        None => false,
    }
}

/// Verifies a payment channel claim signature for the authorized amount.
pub fn is_valid_claim_signature(
    public_key: &[u8],
    signature: &[u8],
    channel: &[u8; 32],
    amount: Drops,
) -> bool {
    is_valid_message(public_key, signature, &claim_message(channel, amount))
}

fn is_valid_ed25519(raw_key: &[u8], signature: &[u8], message: &[u8]) -> bool {
    let key_bytes: [u8; 32] = match raw_key.try_into() {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    let public = match ed25519_dalek::VerifyingKey::from_bytes(&key_bytes) {
        Ok(key) => key,
        Err(_) => return false,
    };

    match ed25519_dalek::Signature::from_slice(signature) {
        Ok(value) => public.verify(message, &value).is_ok(),
        Err(_) => false,
    }
}

fn is_valid_secp256k1(key: &[u8], signature: &[u8], digest: &[u8; 32]) -> bool {
    let secp = secp256k1::Secp256k1::verification_only();
    let message = secp256k1::Message::from_digest(*digest);
    let sig = secp256k1::ecdsa::Signature::from_der(signature);
    let public = secp256k1::PublicKey::from_slice(key);

    if let (Ok(sig), Ok(public)) = (sig, public) {
        secp.verify_ecdsa(&message, &sig, &public).is_ok()
    } else {
        false
    }
}
