#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Envelope codec for lwdump
//!
//! Request and response bodies travel as base64 text wrapping AES-CBC
//! ciphertext. The key is the raw UTF-8 bytes of the session key string and
//! its length selects AES-128, AES-192 or AES-256. The IV is always sixteen
//! zero bytes; the server rejects anything else.
//!
//! There is no authentication tag. A wrong key surfaces as a padding error.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use base64::{engine::general_purpose, Engine as _};
use lwdump_errors::{CryptoError, Error};

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// Fixed initialization vector mandated by the protocol
pub const ZERO_IV: [u8; BLOCK_SIZE] = [0u8; BLOCK_SIZE];

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes192CbcEnc = cbc::Encryptor<aes::Aes192>;
type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type Aes192CbcDec = cbc::Decryptor<aes::Aes192>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES variant selected by the key length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl KeySize {
    /// Pick the AES variant for a raw key
    ///
    /// # Errors
    ///
    /// Returns `CryptoError::InvalidKeyLength` unless the key is 16, 24 or 32 bytes.
    pub fn for_key(key: &[u8]) -> Result<Self, CryptoError> {
        match key.len() {
            16 => Ok(Self::Aes128),
            24 => Ok(Self::Aes192),
            32 => Ok(Self::Aes256),
            length => Err(CryptoError::InvalidKeyLength { length }),
        }
    }

    /// Key length in bits
    #[must_use]
    pub fn bits(self) -> usize {
        match self {
            Self::Aes128 => 128,
            Self::Aes192 => 192,
            Self::Aes256 => 256,
        }
    }
}

/// Encrypt a plaintext and return the base64 transport form
///
/// # Errors
///
/// Returns an error if the key length is not a valid AES key length.
pub fn encrypt(plaintext: &[u8], key: &str) -> Result<String, Error> {
    let ciphertext = encrypt_raw(plaintext, key.as_bytes())?;
    Ok(general_purpose::STANDARD.encode(ciphertext))
}

/// Decode the base64 transport form and decrypt it
///
/// # Errors
///
/// Returns an error if the key length is invalid, the text is not base64,
/// the ciphertext is not block aligned, or the padding is invalid.
pub fn decrypt(ciphertext: &str, key: &str) -> Result<Vec<u8>, Error> {
    let raw = general_purpose::STANDARD
        .decode(ciphertext.as_bytes())
        .map_err(|e| CryptoError::InvalidBase64 {
            message: e.to_string(),
        })?;
    decrypt_raw(&raw, key.as_bytes())
}

/// Encrypt raw bytes with PKCS#7 padding under the zero IV
///
/// # Errors
///
/// Returns an error if the key length is not a valid AES key length.
pub fn encrypt_raw(plaintext: &[u8], key: &[u8]) -> Result<Vec<u8>, Error> {
    let size = KeySize::for_key(key)?;
    let invalid = |_| CryptoError::InvalidKeyLength { length: key.len() };

    let ciphertext = match size {
        KeySize::Aes128 => Aes128CbcEnc::new_from_slices(key, &ZERO_IV)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        KeySize::Aes192 => Aes192CbcEnc::new_from_slices(key, &ZERO_IV)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
        KeySize::Aes256 => Aes256CbcEnc::new_from_slices(key, &ZERO_IV)
            .map_err(invalid)?
            .encrypt_padded_vec_mut::<Pkcs7>(plaintext),
    };

    Ok(ciphertext)
}

/// Decrypt raw ciphertext and strip PKCS#7 padding
///
/// # Errors
///
/// Returns an error if the key length is invalid, the ciphertext is empty or
/// not block aligned, or the padding is invalid.
pub fn decrypt_raw(ciphertext: &[u8], key: &[u8]) -> Result<Vec<u8>, Error> {
    let size = KeySize::for_key(key)?;

    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidBlockLength {
            length: ciphertext.len(),
        }
        .into());
    }

    let invalid = |_| CryptoError::InvalidKeyLength { length: key.len() };

    let plaintext = match size {
        KeySize::Aes128 => Aes128CbcDec::new_from_slices(key, &ZERO_IV)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        KeySize::Aes192 => Aes192CbcDec::new_from_slices(key, &ZERO_IV)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
        KeySize::Aes256 => Aes256CbcDec::new_from_slices(key, &ZERO_IV)
            .map_err(invalid)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext),
    };

    plaintext.map_err(|_| CryptoError::InvalidPadding.into())
}
