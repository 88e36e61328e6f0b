// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Embervault Contributors

//! Payload framing, key derivation, and authenticated decryption.
//!
//! Blob layout: `salt(16) || iv(12) || ciphertext || authTag(16)`,
//! base64-encoded as one unit. The key is derived from the password with
//! PBKDF2-HMAC-SHA256 and used for a single AES-256-GCM open; it lives in a
//! `Zeroizing` buffer and is wiped as soon as the call returns.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64ct::{Base64, Encoding};
use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use thiserror::Error;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LENGTH: usize = 16;
/// AES-GCM nonce length in bytes.
pub const IV_LENGTH: usize = 12;
/// AES-GCM authentication tag length in bytes.
pub const TAG_LENGTH: usize = 16;
/// Derived AES-256 key length in bytes.
pub const KEY_LENGTH: usize = 32;

/// Error type for payload crypto operations.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Blob is not valid base64.
    #[error("payload blob is not valid base64")]
    InvalidEncoding,
    /// Blob too short to contain the fixed-size salt/iv/tag regions.
    #[error("payload blob too short: {0} bytes")]
    BlobTooShort(usize),
    /// Authentication tag mismatch or cipher fault.
    #[error("decryption failed")]
    DecryptionFailed,
    /// Cipher fault while sealing a payload at provisioning time.
    #[error("encryption failed")]
    EncryptionFailed,
}

/// Parsed view of the combined payload blob.
#[derive(Debug)]
pub struct EncryptedBlob {
    salt: [u8; SALT_LENGTH],
    iv: [u8; IV_LENGTH],
    /// Ciphertext with the 16-byte tag appended, as AES-GCM consumes it.
    ciphertext_and_tag: Vec<u8>,
}

impl EncryptedBlob {
    /// Decode and split a base64 blob at the fixed offsets.
    pub fn from_base64(combined_b64: &str) -> Result<Self, CryptoError> {
        let bytes =
            Base64::decode_vec(combined_b64).map_err(|_| CryptoError::InvalidEncoding)?;

        let min_length = SALT_LENGTH + IV_LENGTH + TAG_LENGTH;
        if bytes.len() < min_length {
            return Err(CryptoError::BlobTooShort(bytes.len()));
        }

        let mut salt = [0u8; SALT_LENGTH];
        salt.copy_from_slice(&bytes[..SALT_LENGTH]);
        let mut iv = [0u8; IV_LENGTH];
        iv.copy_from_slice(&bytes[SALT_LENGTH..SALT_LENGTH + IV_LENGTH]);
        let ciphertext_and_tag = bytes[SALT_LENGTH + IV_LENGTH..].to_vec();

        Ok(Self {
            salt,
            iv,
            ciphertext_and_tag,
        })
    }

    /// Encode back to the combined base64 form.
    pub fn to_base64(&self) -> String {
        let mut bytes =
            Vec::with_capacity(SALT_LENGTH + IV_LENGTH + self.ciphertext_and_tag.len());
        bytes.extend_from_slice(&self.salt);
        bytes.extend_from_slice(&self.iv);
        bytes.extend_from_slice(&self.ciphertext_and_tag);
        Base64::encode_string(&bytes)
    }
}

/// Derive a 32-byte AES key from the password via PBKDF2-HMAC-SHA256.
fn derive_key(password: &str, salt: &[u8], iterations: u32) -> Zeroizing<[u8; KEY_LENGTH]> {
    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, iterations, &mut *key);
    key
}

/// Decrypt a parsed blob with the given password.
///
/// Tag mismatch, wrong password, and any cipher fault all collapse into
/// [`CryptoError::DecryptionFailed`]; the distinction must not leak.
pub fn open(blob: &EncryptedBlob, password: &str, iterations: u32) -> Result<Vec<u8>, CryptoError> {
    let key = derive_key(password, &blob.salt, iterations);
    let cipher =
        Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::DecryptionFailed)?;
    let nonce = Nonce::from_slice(&blob.iv);

    cipher
        .decrypt(nonce, blob.ciphertext_and_tag.as_slice())
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// Encrypt a plaintext under the given password, producing a combined blob.
///
/// Used at provisioning time; the serving path never encrypts.
pub fn seal(plaintext: &[u8], password: &str, iterations: u32) -> Result<EncryptedBlob, CryptoError> {
    let mut salt = [0u8; SALT_LENGTH];
    getrandom::getrandom(&mut salt).map_err(|_| CryptoError::EncryptionFailed)?;
    let mut iv = [0u8; IV_LENGTH];
    getrandom::getrandom(&mut iv).map_err(|_| CryptoError::EncryptionFailed)?;

    let key = derive_key(password, &salt, iterations);
    let cipher =
        Aes256Gcm::new_from_slice(key.as_slice()).map_err(|_| CryptoError::EncryptionFailed)?;
    let nonce = Nonce::from_slice(&iv);

    let ciphertext_and_tag = cipher
        .encrypt(nonce, plaintext)
        .map_err(|_| CryptoError::EncryptionFailed)?;

    Ok(EncryptedBlob {
        salt,
        iv,
        ciphertext_and_tag,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_ITERATIONS: u32 = 1_000;

    #[test]
    fn seal_open_round_trip() {
        let blob = seal(b"the secret", "hunter2", TEST_ITERATIONS).unwrap();
        let plaintext = open(&blob, "hunter2", TEST_ITERATIONS).unwrap();
        assert_eq!(plaintext, b"the secret");
    }

    #[test]
    fn base64_round_trip() {
        let blob = seal(b"payload", "pw", TEST_ITERATIONS).unwrap();
        let encoded = blob.to_base64();
        let decoded = EncryptedBlob::from_base64(&encoded).unwrap();
        assert_eq!(open(&decoded, "pw", TEST_ITERATIONS).unwrap(), b"payload");
    }

    #[test]
    fn wrong_password_fails() {
        let blob = seal(b"secret", "correct", TEST_ITERATIONS).unwrap();
        let err = open(&blob, "incorrect", TEST_ITERATIONS).unwrap_err();
        assert!(matches!(err, CryptoError::DecryptionFailed));
    }

    #[test]
    fn wrong_iteration_count_fails() {
        let blob = seal(b"secret", "pw", TEST_ITERATIONS).unwrap();
        assert!(open(&blob, "pw", TEST_ITERATIONS + 1).is_err());
    }

    #[test]
    fn deterministic_for_same_password() {
        let blob = seal(b"stable", "pw", TEST_ITERATIONS).unwrap();
        let first = open(&blob, "pw", TEST_ITERATIONS).unwrap();
        let second = open(&blob, "pw", TEST_ITERATIONS).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn rejects_tampered_ciphertext() {
        let blob = seal(b"secret", "pw", TEST_ITERATIONS).unwrap();
        let mut bytes = Base64::decode_vec(&blob.to_base64()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xff;
        let tampered = EncryptedBlob::from_base64(&Base64::encode_string(&bytes)).unwrap();
        assert!(open(&tampered, "pw", TEST_ITERATIONS).is_err());
    }

    #[test]
    fn rejects_truncated_blob() {
        // 28 bytes holds salt+iv but no room for the tag
        let too_short = Base64::encode_string(&[0u8; SALT_LENGTH + IV_LENGTH]);
        let err = EncryptedBlob::from_base64(&too_short).unwrap_err();
        assert!(matches!(err, CryptoError::BlobTooShort(28)));
    }

    #[test]
    fn rejects_invalid_base64() {
        let err = EncryptedBlob::from_base64("not base64!!!").unwrap_err();
        assert!(matches!(err, CryptoError::InvalidEncoding));
    }

    #[test]
    fn minimum_valid_blob_is_empty_plaintext() {
        let blob = seal(b"", "pw", TEST_ITERATIONS).unwrap();
        let decoded = EncryptedBlob::from_base64(&blob.to_base64()).unwrap();
        assert_eq!(open(&decoded, "pw", TEST_ITERATIONS).unwrap(), b"");
    }

    #[test]
    fn handles_empty_password() {
        // Empty passwords are rejected upstream, but the KDF itself is total
        let blob = seal(b"data", "", TEST_ITERATIONS).unwrap();
        assert_eq!(open(&blob, "", TEST_ITERATIONS).unwrap(), b"data");
    }
}
