use bytes::{BufMut, Bytes, BytesMut};
use hkdf::Hkdf;
use hmac::{Hmac, Mac};
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{Error, Result};
use crate::hpke::HPKE_VERSION_LABEL;

#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum KdfId {
    #[default]
    HKDF_SHA256 = 0x0001,
    HKDF_SHA384 = 0x0002,
    HKDF_SHA512 = 0x0003,
}

impl TryFrom<u16> for KdfId {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0001 => Ok(KdfId::HKDF_SHA256),
            0x0002 => Ok(KdfId::HKDF_SHA384),
            0x0003 => Ok(KdfId::HKDF_SHA512),
            _ => Err(Error::InvalidKdfIdValue(v)),
        }
    }
}

/// HKDF extract-then-expand, plus the labeled variants every HPKE
/// derivation goes through.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct Kdf {
    id: KdfId,
}

impl Kdf {
    pub fn new(id: KdfId) -> Self {
        Kdf { id }
    }

    pub fn id(&self) -> KdfId {
        self.id
    }

    pub fn hash_size(&self) -> usize {
        match self.id {
            KdfId::HKDF_SHA256 => 32,
            KdfId::HKDF_SHA384 => 48,
            KdfId::HKDF_SHA512 => 64,
        }
    }

    pub fn extract(&self, salt: &[u8], ikm: &[u8]) -> Result<Bytes> {
        match self.id {
            KdfId::HKDF_SHA256 => {
                let mut m = Hmac::<Sha256>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
            KdfId::HKDF_SHA384 => {
                let mut m = Hmac::<Sha384>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
            KdfId::HKDF_SHA512 => {
                let mut m = Hmac::<Sha512>::new_from_slice(salt)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                m.update(ikm);
                Ok(Bytes::from(m.finalize().into_bytes().to_vec()))
            }
        }
    }

    pub fn expand(&self, prk: &[u8], info: &[u8], length: usize) -> Result<Bytes> {
        let mut out = vec![0u8; length];
        match self.id {
            KdfId::HKDF_SHA256 => {
                let hkdf = Hkdf::<Sha256>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
            }
            KdfId::HKDF_SHA384 => {
                let hkdf = Hkdf::<Sha384>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
            }
            KdfId::HKDF_SHA512 => {
                let hkdf = Hkdf::<Sha512>::from_prk(prk)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
                hkdf.expand(info, &mut out)
                    .map_err(|err| Error::RustCryptoError(err.to_string()))?;
            }
        }
        Ok(Bytes::from(out))
    }

    pub fn labeled_extract(
        &self,
        suite_id: &[u8],
        salt: &[u8],
        label: &[u8],
        ikm: &[u8],
    ) -> Result<Bytes> {
        let mut labeled_ikm = BytesMut::new();
        labeled_ikm.put_slice(HPKE_VERSION_LABEL);
        labeled_ikm.put_slice(suite_id);
        labeled_ikm.put_slice(label);
        labeled_ikm.put_slice(ikm);
        self.extract(salt, &labeled_ikm.freeze())
    }

    pub fn labeled_expand(
        &self,
        suite_id: &[u8],
        prk: &[u8],
        label: &[u8],
        info: &[u8],
        length: usize,
    ) -> Result<Bytes> {
        let mut labeled_info = BytesMut::new();
        labeled_info.put_u16(length as u16);
        labeled_info.put_slice(HPKE_VERSION_LABEL);
        labeled_info.put_slice(suite_id);
        labeled_info.put_slice(label);
        labeled_info.put_slice(info);
        self.expand(prk, &labeled_info.freeze(), length)
    }
}
