// Copyright 2021-2024 BrightChain Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use crate::{Error, Signature, SECP_PUB_LEN};
use crypto_secretbox::aead::{AeadInPlace, KeyInit};
use crypto_secretbox::{Key, Nonce, Tag, XSalsa20Poly1305};
use libsecp256k1::{PublicKey, SecretKey, SharedSecret};
use rand::RngCore;
use sha2::Sha256;

/// Ephemeral public key length inside an ECIES body (uncompressed secp256k1).
pub const ECIES_PUB_LEN: usize = SECP_PUB_LEN;
/// XSalsa20 nonce length inside an ECIES body.
pub const ECIES_NONCE_LEN: usize = 24;
/// Poly1305 authentication tag length inside an ECIES body.
pub const ECIES_TAG_LEN: usize = 16;
/// Total per-message ECIES overhead preceding the ciphertext.
pub const ECIES_OVERHEAD: usize = ECIES_PUB_LEN + ECIES_NONCE_LEN + ECIES_TAG_LEN;

/// The encryption collaborator consumed by the core.
///
/// The core hands 64-byte digests (never raw messages) to
/// `sign_digest`/`verify_digest`, and whole block bodies to
/// `encrypt`/`decrypt_*`. Sealed bodies are laid out as
/// `ephemeral_public_key || nonce || tag || ciphertext`.
pub trait EciesService {
    /// Seals plaintext to a recipient public key.
    fn encrypt(&self, recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Error>;

    /// Opens a sealed body whose ECIES prefix fields are still attached.
    fn decrypt_with_header(&self, secret: &SecretKey, sealed: &[u8]) -> Result<Vec<u8>, Error>;

    /// Opens a sealed body from its already-split components.
    fn decrypt_with_components(
        &self,
        secret: &SecretKey,
        ephemeral_public_key: &[u8; ECIES_PUB_LEN],
        nonce: &[u8; ECIES_NONCE_LEN],
        tag: &[u8; ECIES_TAG_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error>;

    /// Signs a 64-byte digest.
    fn sign_digest(&self, secret: &SecretKey, digest: &[u8]) -> Result<Signature, Error>;

    /// Verifies a signature over a 64-byte digest.
    fn verify_digest(&self, public: &PublicKey, digest: &[u8], signature: &Signature) -> bool;
}

/// ECIES over secp256k1 ECDH with XSalsa20-Poly1305 sealing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SecpEcies;

impl SecpEcies {
    fn shared_key(public: &PublicKey, secret: &SecretKey) -> Result<Key, Error> {
        let shared =
            SharedSecret::<Sha256>::new(public, secret).map_err(|_| Error::InvalidKey)?;
        Ok(*Key::from_slice(shared.as_ref()))
    }
}

impl EciesService for SecpEcies {
    fn encrypt(&self, recipient: &PublicKey, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let mut rng = rand::rngs::OsRng;
        let ephemeral_secret = SecretKey::random(&mut rng);
        let ephemeral_public = PublicKey::from_secret_key(&ephemeral_secret);

        let key = Self::shared_key(recipient, &ephemeral_secret)?;
        let cipher = XSalsa20Poly1305::new(&key);

        let mut nonce = [0u8; ECIES_NONCE_LEN];
        rng.fill_bytes(&mut nonce);

        let mut buffer = plaintext.to_vec();
        let tag = cipher
            .encrypt_in_place_detached(Nonce::from_slice(&nonce), &[], &mut buffer)
            .map_err(|_| Error::EncryptionFailed)?;

        let mut sealed = Vec::with_capacity(ECIES_OVERHEAD + buffer.len());
        sealed.extend_from_slice(&ephemeral_public.serialize());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(tag.as_slice());
        sealed.extend_from_slice(&buffer);
        Ok(sealed)
    }

    fn decrypt_with_header(&self, secret: &SecretKey, sealed: &[u8]) -> Result<Vec<u8>, Error> {
        if sealed.len() < ECIES_OVERHEAD {
            return Err(Error::InvalidCiphertext {
                length: sealed.len(),
            });
        }
        let mut ephemeral_public = [0u8; ECIES_PUB_LEN];
        ephemeral_public.copy_from_slice(&sealed[..ECIES_PUB_LEN]);
        let mut nonce = [0u8; ECIES_NONCE_LEN];
        nonce.copy_from_slice(&sealed[ECIES_PUB_LEN..ECIES_PUB_LEN + ECIES_NONCE_LEN]);
        let mut tag = [0u8; ECIES_TAG_LEN];
        tag.copy_from_slice(&sealed[ECIES_PUB_LEN + ECIES_NONCE_LEN..ECIES_OVERHEAD]);

        self.decrypt_with_components(
            secret,
            &ephemeral_public,
            &nonce,
            &tag,
            &sealed[ECIES_OVERHEAD..],
        )
    }

    fn decrypt_with_components(
        &self,
        secret: &SecretKey,
        ephemeral_public_key: &[u8; ECIES_PUB_LEN],
        nonce: &[u8; ECIES_NONCE_LEN],
        tag: &[u8; ECIES_TAG_LEN],
        ciphertext: &[u8],
    ) -> Result<Vec<u8>, Error> {
        let ephemeral_public =
            PublicKey::parse(ephemeral_public_key).map_err(|_| Error::InvalidKey)?;
        let key = Self::shared_key(&ephemeral_public, secret)?;
        let cipher = XSalsa20Poly1305::new(&key);

        let mut buffer = ciphertext.to_vec();
        cipher
            .decrypt_in_place_detached(
                Nonce::from_slice(nonce),
                &[],
                &mut buffer,
                Tag::from_slice(tag),
            )
            .map_err(|_| Error::DecryptionFailed)?;
        Ok(buffer)
    }

    fn sign_digest(&self, secret: &SecretKey, digest: &[u8]) -> Result<Signature, Error> {
        crate::sign_digest(secret, digest)
    }

    fn verify_digest(&self, public: &PublicKey, digest: &[u8], signature: &Signature) -> bool {
        crate::verify_digest(public, digest, signature)
    }
}
