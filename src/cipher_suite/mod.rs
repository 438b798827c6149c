#[cfg(test)]
mod cipher_suite_test;

use std::fmt::{Display, Formatter};

use bytes::{BufMut, Bytes, BytesMut};

use crate::codec::*;
use crate::crypto::hash::HashScheme;
use crate::crypto::signature::SignatureScheme;
use crate::error::{Error, Result};
use crate::hpke::{AeadId, Hpke, KdfId, KemId};

/// Label prefix for every MLS KDF derivation, versioned to the protocol
/// draft. The trailing space is part of the prefix.
pub(crate) const MLS_PREFIX: &[u8] = b"mls10 ";

#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum CipherSuite {
    #[default]
    MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519 = 0x0001,
    MLS10_128_DHKEMP256_AES128GCM_SHA256_P256 = 0x0002,
    MLS10_128_DHKEMX25519_CHACHA20POLY1305_SHA256_Ed25519 = 0x0003,
    MLS10_256_DHKEMX448_AES256GCM_SHA512_Ed448 = 0x0004,
    MLS10_256_DHKEMP521_AES256GCM_SHA512_P521 = 0x0005,
    MLS10_256_DHKEMX448_CHACHA20POLY1305_SHA512_Ed448 = 0x0006,
    MLS10_256_DHKEMP384_AES256GCM_SHA384_P384 = 0x0007,
}

impl TryFrom<u16> for CipherSuite {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0001 => Ok(CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519),
            0x0002 => Ok(CipherSuite::MLS10_128_DHKEMP256_AES128GCM_SHA256_P256),
            0x0003 => Ok(CipherSuite::MLS10_128_DHKEMX25519_CHACHA20POLY1305_SHA256_Ed25519),
            0x0004 => Ok(CipherSuite::MLS10_256_DHKEMX448_AES256GCM_SHA512_Ed448),
            0x0005 => Ok(CipherSuite::MLS10_256_DHKEMP521_AES256GCM_SHA512_P521),
            0x0006 => Ok(CipherSuite::MLS10_256_DHKEMX448_CHACHA20POLY1305_SHA512_Ed448),
            0x0007 => Ok(CipherSuite::MLS10_256_DHKEMP384_AES256GCM_SHA384_P384),
            _ => Err(Error::InvalidCipherSuiteValue(v)),
        }
    }
}

impl Display for CipherSuite {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl CipherSuite {
    pub fn hash(&self) -> HashScheme {
        match *self {
            CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519
            | CipherSuite::MLS10_128_DHKEMP256_AES128GCM_SHA256_P256
            | CipherSuite::MLS10_128_DHKEMX25519_CHACHA20POLY1305_SHA256_Ed25519 => {
                HashScheme::Sha256
            }
            CipherSuite::MLS10_256_DHKEMP384_AES256GCM_SHA384_P384 => HashScheme::Sha384,
            CipherSuite::MLS10_256_DHKEMX448_AES256GCM_SHA512_Ed448
            | CipherSuite::MLS10_256_DHKEMP521_AES256GCM_SHA512_P521
            | CipherSuite::MLS10_256_DHKEMX448_CHACHA20POLY1305_SHA512_Ed448 => HashScheme::Sha512,
        }
    }

    pub fn hpke(&self) -> Result<Hpke> {
        match *self {
            CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519 => Hpke::new(
                KemId::DHKEM_X25519_SHA256,
                KdfId::HKDF_SHA256,
                AeadId::AES_128_GCM,
            ),
            CipherSuite::MLS10_128_DHKEMP256_AES128GCM_SHA256_P256 => Hpke::new(
                KemId::DHKEM_P256_SHA256,
                KdfId::HKDF_SHA256,
                AeadId::AES_128_GCM,
            ),
            CipherSuite::MLS10_128_DHKEMX25519_CHACHA20POLY1305_SHA256_Ed25519 => Hpke::new(
                KemId::DHKEM_X25519_SHA256,
                KdfId::HKDF_SHA256,
                AeadId::CHACHA20_POLY1305,
            ),
            CipherSuite::MLS10_256_DHKEMX448_AES256GCM_SHA512_Ed448 => Hpke::new(
                KemId::DHKEM_X448_SHA512,
                KdfId::HKDF_SHA512,
                AeadId::AES_256_GCM,
            ),
            CipherSuite::MLS10_256_DHKEMP521_AES256GCM_SHA512_P521 => Hpke::new(
                KemId::DHKEM_P521_SHA512,
                KdfId::HKDF_SHA512,
                AeadId::AES_256_GCM,
            ),
            CipherSuite::MLS10_256_DHKEMX448_CHACHA20POLY1305_SHA512_Ed448 => Hpke::new(
                KemId::DHKEM_X448_SHA512,
                KdfId::HKDF_SHA512,
                AeadId::CHACHA20_POLY1305,
            ),
            CipherSuite::MLS10_256_DHKEMP384_AES256GCM_SHA384_P384 => Hpke::new(
                KemId::DHKEM_P384_SHA384,
                KdfId::HKDF_SHA384,
                AeadId::AES_256_GCM,
            ),
        }
    }

    pub fn signature_scheme(&self) -> Result<SignatureScheme> {
        match *self {
            CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519
            | CipherSuite::MLS10_128_DHKEMX25519_CHACHA20POLY1305_SHA256_Ed25519 => {
                Ok(SignatureScheme::Ed25519)
            }
            CipherSuite::MLS10_128_DHKEMP256_AES128GCM_SHA256_P256 => {
                Ok(SignatureScheme::ECDSA_P256_SHA256)
            }
            CipherSuite::MLS10_256_DHKEMP384_AES256GCM_SHA384_P384 => {
                Ok(SignatureScheme::ECDSA_P384_SHA384)
            }
            CipherSuite::MLS10_256_DHKEMP521_AES256GCM_SHA512_P521
            | CipherSuite::MLS10_256_DHKEMX448_AES256GCM_SHA512_Ed448
            | CipherSuite::MLS10_256_DHKEMX448_CHACHA20POLY1305_SHA512_Ed448 => {
                Err(Error::UnsupportedSignatureScheme)
            }
        }
    }

    pub fn digest(&self, data: &[u8]) -> Bytes {
        self.hash().digest(data)
    }

    /// All cipher suites authenticate with HMAC under the suite hash.
    pub fn sign_mac(&self, key: &[u8], message: &[u8]) -> Bytes {
        self.hash().mac(key, message)
    }

    pub fn verify_mac(&self, key: &[u8], message: &[u8], tag: &[u8]) -> bool {
        self.hash().verify_mac(key, message, tag)
    }

    /// The MLS variant of labeled expansion: HKDF-Expand over the encoded
    /// `HkdfLabel { length, "mls10 " || label, context }`.
    pub fn expand_with_label(
        &self,
        secret: &[u8],
        label: &[u8],
        context: &[u8],
        length: usize,
    ) -> Result<Bytes> {
        let mut mls_label = MLS_PREFIX.to_vec();
        mls_label.extend_from_slice(label);

        let mut buf = BytesMut::new();
        buf.put_u16(length as u16);
        serialize_opaque8(&mls_label, &mut buf)?;
        serialize_opaque32(context, &mut buf)?;
        let info = buf.freeze();

        self.hpke()?.kdf().expand(secret, &info, length)
    }

    pub fn derive_secret(&self, secret: &[u8], label: &[u8]) -> Result<Bytes> {
        self.expand_with_label(secret, label, &[], self.hash().size())
    }
}
