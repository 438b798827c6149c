use aes_gcm::aead::{Aead as _, KeyInit, Payload};
use aes_gcm::{Aes128Gcm, Aes256Gcm};
use bytes::Bytes;
use chacha20poly1305::ChaCha20Poly1305;

use crate::error::{Error, Result};

#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum AeadId {
    #[default]
    AES_128_GCM = 0x0001,
    AES_256_GCM = 0x0002,
    CHACHA20_POLY1305 = 0x0003,
}

impl TryFrom<u16> for AeadId {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0001 => Ok(AeadId::AES_128_GCM),
            0x0002 => Ok(AeadId::AES_256_GCM),
            0x0003 => Ok(AeadId::CHACHA20_POLY1305),
            _ => Err(Error::InvalidAeadIdValue(v)),
        }
    }
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct Aead {
    id: AeadId,
}

impl Aead {
    pub fn new(id: AeadId) -> Self {
        Aead { id }
    }

    pub fn id(&self) -> AeadId {
        self.id
    }

    pub fn key_size(&self) -> usize {
        match self.id {
            AeadId::AES_128_GCM => 16,
            AeadId::AES_256_GCM => 32,
            AeadId::CHACHA20_POLY1305 => 32,
        }
    }

    pub fn nonce_size(&self) -> usize {
        match self.id {
            AeadId::AES_128_GCM | AeadId::AES_256_GCM | AeadId::CHACHA20_POLY1305 => 12,
        }
    }

    fn check_sizes(&self, key: &[u8], nonce: &[u8]) -> Result<()> {
        if key.len() != self.key_size() {
            return Err(Error::InvalidKeyMaterial("bad AEAD key size".into()));
        }
        if nonce.len() != self.nonce_size() {
            return Err(Error::InvalidKeyMaterial("bad AEAD nonce size".into()));
        }
        Ok(())
    }

    pub fn seal(&self, key: &[u8], nonce: &[u8], aad: &[u8], plaintext: &[u8]) -> Result<Bytes> {
        self.check_sizes(key, nonce)?;

        let payload = Payload {
            msg: plaintext,
            aad,
        };
        let ciphertext = match self.id {
            AeadId::AES_128_GCM => {
                let cipher = Aes128Gcm::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                cipher
                    .encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?
            }
            AeadId::AES_256_GCM => {
                let cipher = Aes256Gcm::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                cipher
                    .encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?
            }
            AeadId::CHACHA20_POLY1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                cipher
                    .encrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?
            }
        };

        Ok(Bytes::from(ciphertext))
    }

    /// Decrypt and authenticate. A bad tag is absence, not an error; callers
    /// decide what rejection means at their layer.
    pub fn open(
        &self,
        key: &[u8],
        nonce: &[u8],
        aad: &[u8],
        ciphertext: &[u8],
    ) -> Result<Option<Bytes>> {
        self.check_sizes(key, nonce)?;

        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        let plaintext = match self.id {
            AeadId::AES_128_GCM => {
                let cipher = Aes128Gcm::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), payload).ok()
            }
            AeadId::AES_256_GCM => {
                let cipher = Aes256Gcm::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), payload).ok()
            }
            AeadId::CHACHA20_POLY1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                cipher
                    .decrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
                    .ok()
            }
        };

        Ok(plaintext.map(Bytes::from))
    }
}
