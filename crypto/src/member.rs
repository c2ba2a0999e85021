// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{sign_digest, verify_digest, Error, Signature};
use libsecp256k1::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Raw member id length in bytes.
pub const MEMBER_ID_LEN: usize = 16;

/// A member's 16-byte GUID.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberId(Uuid);

impl MemberId {
    /// Generates a fresh random id.
    pub fn generate() -> Self {
        MemberId(Uuid::new_v4())
    }

    /// Returns the raw GUID bytes written into headers.
    pub fn to_bytes(self) -> [u8; MEMBER_ID_LEN] {
        *self.0.as_bytes()
    }

    /// Rebuilds an id from raw header bytes.
    pub fn from_bytes(bytes: [u8; MEMBER_ID_LEN]) -> Self {
        MemberId(Uuid::from_bytes(bytes))
    }

    /// Byte-wise id equality.
    pub fn equals(&self, other: &MemberId) -> bool {
        self == other
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberId({})", self.0)
    }
}

/// The identity the core consumes: an id, a public key, and optionally the
/// secret key enabling signing. Everything else about members (key
/// derivation, profiles, stores) lives outside the core.
#[derive(Clone)]
pub struct Member {
    id: MemberId,
    public_key: PublicKey,
    secret_key: Option<SecretKey>,
}

impl Member {
    /// Creates a member from existing key material.
    pub fn new(id: MemberId, public_key: PublicKey, secret_key: Option<SecretKey>) -> Self {
        Member {
            id,
            public_key,
            secret_key,
        }
    }

    /// Creates a signing-capable member with a fresh keypair and id.
    pub fn generate() -> Self {
        let secret = SecretKey::random(&mut rand::rngs::OsRng);
        let public = PublicKey::from_secret_key(&secret);
        Member {
            id: MemberId::generate(),
            public_key: public,
            secret_key: Some(secret),
        }
    }

    /// The public half of this member, as peers see it.
    pub fn to_public(&self) -> Member {
        Member {
            id: self.id,
            public_key: self.public_key,
            secret_key: None,
        }
    }

    /// Getter for the member id.
    pub fn id(&self) -> MemberId {
        self.id
    }

    /// Getter for the member public key.
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Getter for the member secret key, when held.
    pub fn secret_key(&self) -> Option<&SecretKey> {
        self.secret_key.as_ref()
    }

    /// Whether this member can produce signatures.
    pub fn can_sign(&self) -> bool {
        self.secret_key.is_some()
    }

    /// Signs a 64-byte digest with the member's secret key.
    pub fn sign_digest(&self, digest: &[u8]) -> Result<Signature, Error> {
        let secret = self
            .secret_key
            .as_ref()
            .ok_or_else(|| Error::SigningError("member holds no secret key".to_owned()))?;
        sign_digest(secret, digest)
    }

    /// Verifies a signature over a digest against the member's public key.
    pub fn verify_digest(&self, digest: &[u8], signature: &Signature) -> bool {
        verify_digest(&self.public_key, digest, signature)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("id", &self.id)
            .field("can_sign", &self.can_sign())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_bytes_round_trip() {
        let id = MemberId::generate();
        assert_eq!(MemberId::from_bytes(id.to_bytes()), id);
    }

    #[test]
    fn member_signing() {
        let member = Member::generate();
        let digest = [7u8; 64];
        let sig = member.sign_digest(&digest).unwrap();
        assert!(member.verify_digest(&digest, &sig));
    }

    #[test]
    fn public_member_cannot_sign() {
        let member = Member::generate().to_public();
        assert!(!member.can_sign());
        assert!(member.sign_digest(&[0u8; 64]).is_err());
    }
}
