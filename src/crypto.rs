//! At-rest encryption for the Bluesky app password
//!
//! Secrets are stored as `base64(iv || AES-256-CBC(plaintext))` with a fresh
//! random IV per encryption. The key is derived from the host's stable
//! secret salt, so the same salt decrypts blobs across process restarts.
//! There is no key rotation or versioning.

use aes::cipher::{block_padding::Pkcs7, BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use rand::RngCore;
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Size of the AES-256 key in bytes
const KEY_SIZE: usize = 32;

/// Size of the CBC initialization vector (one AES block)
const IV_SIZE: usize = 16;

/// AES block size; a valid blob carries the IV plus at least one block
const BLOCK_SIZE: usize = 16;

/// Symmetric credential store keyed by a process-wide secret
///
/// Key material is zeroed on drop and never exposed through `Debug`.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct CredentialStore {
    key: [u8; KEY_SIZE],
}

impl CredentialStore {
    /// Derive the encryption key from the host's stable secret salt.
    ///
    /// The salt is an arbitrary-length string; it is hashed with SHA-256 to
    /// produce the 32-byte AES key.
    pub fn from_salt(salt: &str) -> Self {
        let digest = Sha256::digest(salt.as_bytes());
        let mut key = [0u8; KEY_SIZE];
        key.copy_from_slice(&digest);
        Self { key }
    }

    /// Encrypt a plaintext secret for storage.
    ///
    /// An empty plaintext short-circuits to an empty string, matching
    /// [`decrypt`](Self::decrypt) — "nothing configured" round-trips as-is.
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::EncryptionFailed` if the cipher cannot be
    /// initialized.
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        if plaintext.is_empty() {
            return Ok(String::new());
        }

        let mut iv = [0u8; IV_SIZE];
        rand::thread_rng().fill_bytes(&mut iv);

        let cipher = Aes256CbcEnc::new_from_slices(&self.key, &iv)
            .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))?;
        let ciphertext = cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());

        let mut blob = Vec::with_capacity(IV_SIZE + ciphertext.len());
        blob.extend_from_slice(&iv);
        blob.extend(ciphertext);

        Ok(BASE64.encode(blob))
    }

    /// Decrypt a stored secret.
    ///
    /// An empty input returns an empty string. Any other failure is a
    /// distinguished error rather than a silent empty result, so a corrupted
    /// blob or changed salt is never mistaken for an unconfigured credential.
    ///
    /// # Errors
    ///
    /// - `CryptoError::Decode` if the input is not valid base64
    /// - `CryptoError::CiphertextTooShort` if the blob cannot hold an IV and
    ///   one cipher block
    /// - `CryptoError::DecryptionFailed` on padding or cipher failure
    /// - `CryptoError::InvalidUtf8` if the plaintext is not UTF-8
    pub fn decrypt(&self, stored: &str) -> Result<String, CryptoError> {
        if stored.is_empty() {
            return Ok(String::new());
        }

        let decoded = BASE64.decode(stored)?;

        if decoded.len() < IV_SIZE + BLOCK_SIZE {
            return Err(CryptoError::CiphertextTooShort {
                minimum: IV_SIZE + BLOCK_SIZE,
                actual: decoded.len(),
            });
        }

        let (iv, ciphertext) = decoded.split_at(IV_SIZE);
        let cipher = Aes256CbcDec::new_from_slices(&self.key, iv)
            .map_err(|_| CryptoError::DecryptionFailed)?;
        let plaintext = cipher
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        Ok(String::from_utf8(plaintext)?)
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CredentialStore([REDACTED, {} bytes])", KEY_SIZE)
    }
}
