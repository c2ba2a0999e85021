// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::Error;
use libsecp256k1::{Message, PublicKey, SecretKey, Signature as SecpSignature};
use std::fmt;

/// Compact secp256k1 signature length in bytes.
pub const SIGNATURE_LEN: usize = 64;
/// Uncompressed secp256k1 public key length in bytes.
pub const SECP_PUB_LEN: usize = 65;

/// A compact (r || s) secp256k1 signature over a digest.
///
/// The all-zero value is the placeholder carried by unsigned structures and
/// never verifies.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Wraps raw compact signature bytes.
    pub fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Signature(bytes)
    }

    /// Builds a signature from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let arr: [u8; SIGNATURE_LEN] = bytes
            .try_into()
            .map_err(|_| Error::InvalidSignatureLength {
                length: bytes.len(),
            })?;
        Ok(Signature(arr))
    }

    /// The unsigned placeholder.
    pub fn zeroed() -> Self {
        Signature([0u8; SIGNATURE_LEN])
    }

    /// Returns true for the unsigned placeholder.
    pub fn is_zeroed(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// Returns reference to signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature(")?;
        for b in &self.0 {
            write!(f, "{:02x}", b)?;
        }
        write!(f, ")")
    }
}

/// Reduces a 64-byte digest to the 32-byte message secp256k1 operates on,
/// via a BLAKE2b-256 pass.
fn secp_message(digest: &[u8]) -> Message {
    let reduced = blake2b_simd::Params::new().hash_length(32).hash(digest);
    let mut message = [0u8; 32];
    message.copy_from_slice(reduced.as_bytes());
    Message::parse(&message)
}

/// Signs a 64-byte digest with a secret key.
///
/// The compact form is returned; verification always has the public key at
/// hand, so no recovery id is carried.
pub fn sign_digest(secret: &SecretKey, digest: &[u8]) -> Result<Signature, Error> {
    let message = secp_message(digest);
    let (sig, _recovery) = libsecp256k1::sign(&message, secret);
    Ok(Signature(sig.serialize()))
}

/// Verifies a compact signature over a 64-byte digest.
pub fn verify_digest(public: &PublicKey, digest: &[u8], signature: &Signature) -> bool {
    if signature.is_zeroed() {
        return false;
    }
    let message = secp_message(digest);
    match SecpSignature::parse_standard(signature.as_bytes()) {
        Ok(sig) => libsecp256k1::verify(&message, &sig, public),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn keypair(seed: u64) -> (SecretKey, PublicKey) {
        let rng = &mut ChaCha8Rng::seed_from_u64(seed);
        let secret = SecretKey::random(rng);
        let public = PublicKey::from_secret_key(&secret);
        (secret, public)
    }

    #[test]
    fn sign_verify_round_trip() {
        let (secret, public) = keypair(8);
        let digest = [0x42u8; 64];

        let sig = sign_digest(&secret, &digest).unwrap();
        assert!(verify_digest(&public, &digest, &sig));
    }

    #[test]
    fn different_digest_should_fail() {
        let (secret, public) = keypair(8);
        let sig = sign_digest(&secret, &[0x42u8; 64]).unwrap();
        assert!(!verify_digest(&public, &[0x43u8; 64], &sig));
    }

    #[test]
    fn different_key_should_fail() {
        let (secret, _) = keypair(8);
        let (_, other_public) = keypair(9);
        let digest = [0x42u8; 64];
        let sig = sign_digest(&secret, &digest).unwrap();
        assert!(!verify_digest(&other_public, &digest, &sig));
    }

    #[test]
    fn zeroed_signature_never_verifies() {
        let (_, public) = keypair(8);
        assert!(!verify_digest(&public, &[0u8; 64], &Signature::zeroed()));
    }
}
