use bytes::{BufMut, Bytes, BytesMut};
use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::OsRng;

use crate::crypto::secret::SecretBytes;
use crate::error::{Error, Result};
use crate::hpke::kdf::{Kdf, KdfId};

#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum KemId {
    DHKEM_P256_SHA256 = 0x0010,
    DHKEM_P384_SHA384 = 0x0011,
    DHKEM_P521_SHA512 = 0x0012,
    #[default]
    DHKEM_X25519_SHA256 = 0x0020,
    DHKEM_X448_SHA512 = 0x0021,
}

impl TryFrom<u16> for KemId {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0010 => Ok(KemId::DHKEM_P256_SHA256),
            0x0011 => Ok(KemId::DHKEM_P384_SHA384),
            0x0012 => Ok(KemId::DHKEM_P521_SHA512),
            0x0020 => Ok(KemId::DHKEM_X25519_SHA256),
            0x0021 => Ok(KemId::DHKEM_X448_SHA512),
            _ => Err(Error::InvalidKemIdValue(v)),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum KemPublicKey {
    X25519(x25519_dalek::PublicKey),
    P256(p256::PublicKey),
    P384(p384::PublicKey),
}

#[derive(Clone)]
pub enum KemPrivateKey {
    X25519(x25519_dalek::StaticSecret),
    P256(p256::SecretKey),
    P384(p384::SecretKey),
}

/// DHKEM: encapsulation by ephemeral Diffie-Hellman against the recipient
/// key, with the shared secret run through the KEM-scoped labeled KDF.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Kem {
    id: KemId,
    kdf: Kdf,
    suite_id: Bytes,
}

impl Kem {
    pub fn new(id: KemId) -> Result<Self> {
        let kdf = match id {
            KemId::DHKEM_X25519_SHA256 | KemId::DHKEM_P256_SHA256 => Kdf::new(KdfId::HKDF_SHA256),
            KemId::DHKEM_P384_SHA384 => Kdf::new(KdfId::HKDF_SHA384),
            KemId::DHKEM_P521_SHA512 | KemId::DHKEM_X448_SHA512 => {
                return Err(Error::UnsupportedKem(id as u16))
            }
        };

        let mut suite_id = BytesMut::new();
        suite_id.put_slice(b"KEM");
        suite_id.put_u16(id as u16);

        Ok(Kem {
            id,
            kdf,
            suite_id: suite_id.freeze(),
        })
    }

    pub fn id(&self) -> KemId {
        self.id
    }

    /// Length of the KEM shared secret: the hash size of the KEM's KDF.
    pub fn secret_size(&self) -> usize {
        self.kdf.hash_size()
    }

    fn private_key_size(&self) -> usize {
        match self.id {
            KemId::DHKEM_X25519_SHA256 | KemId::DHKEM_P256_SHA256 => 32,
            KemId::DHKEM_P384_SHA384 => 48,
            KemId::DHKEM_P521_SHA512 | KemId::DHKEM_X448_SHA512 => 0,
        }
    }

    pub fn generate_key_pair(&self) -> Result<(KemPrivateKey, KemPublicKey)> {
        let sk = match self.id {
            KemId::DHKEM_X25519_SHA256 => {
                KemPrivateKey::X25519(x25519_dalek::StaticSecret::random_from_rng(OsRng))
            }
            KemId::DHKEM_P256_SHA256 => KemPrivateKey::P256(p256::SecretKey::random(&mut OsRng)),
            KemId::DHKEM_P384_SHA384 => KemPrivateKey::P384(p384::SecretKey::random(&mut OsRng)),
            KemId::DHKEM_P521_SHA512 | KemId::DHKEM_X448_SHA512 => {
                return Err(Error::UnsupportedKem(self.id as u16))
            }
        };
        let pk = self.public_from_private(&sk);
        Ok((sk, pk))
    }

    /// Deterministic key generation from input keying material.
    pub fn derive_key_pair(&self, ikm: &[u8]) -> Result<(KemPrivateKey, KemPublicKey)> {
        let dkp_prk = self
            .kdf
            .labeled_extract(&self.suite_id, &[], b"dkp_prk", ikm)?;

        let sk = match self.id {
            KemId::DHKEM_X25519_SHA256 => {
                let okm =
                    self.kdf
                        .labeled_expand(&self.suite_id, &dkp_prk, b"sk", &[], 32)?;
                let mut sk_bytes = [0u8; 32];
                sk_bytes.copy_from_slice(&okm);
                KemPrivateKey::X25519(x25519_dalek::StaticSecret::from(sk_bytes))
            }
            KemId::DHKEM_P256_SHA256 | KemId::DHKEM_P384_SHA384 => {
                // Rejection-sample scalar candidates until one lands in the
                // group order.
                let mut found = None;
                for counter in 0u8..=255 {
                    let candidate = self.kdf.labeled_expand(
                        &self.suite_id,
                        &dkp_prk,
                        b"candidate",
                        &[counter],
                        self.private_key_size(),
                    )?;
                    let sk = match self.id {
                        KemId::DHKEM_P256_SHA256 => {
                            p256::SecretKey::from_slice(&candidate).map(KemPrivateKey::P256)
                        }
                        _ => p384::SecretKey::from_slice(&candidate).map(KemPrivateKey::P384),
                    };
                    if let Ok(sk) = sk {
                        found = Some(sk);
                        break;
                    }
                }
                found.ok_or(Error::DeriveKeyPairFailed)?
            }
            KemId::DHKEM_P521_SHA512 | KemId::DHKEM_X448_SHA512 => {
                return Err(Error::UnsupportedKem(self.id as u16))
            }
        };

        let pk = self.public_from_private(&sk);
        Ok((sk, pk))
    }

    pub fn public_from_private(&self, sk: &KemPrivateKey) -> KemPublicKey {
        match sk {
            KemPrivateKey::X25519(sk) => KemPublicKey::X25519(x25519_dalek::PublicKey::from(sk)),
            KemPrivateKey::P256(sk) => KemPublicKey::P256(sk.public_key()),
            KemPrivateKey::P384(sk) => KemPublicKey::P384(sk.public_key()),
        }
    }

    pub fn serialize_public(&self, pk: &KemPublicKey) -> Bytes {
        match pk {
            KemPublicKey::X25519(pk) => Bytes::from(pk.as_bytes().to_vec()),
            KemPublicKey::P256(pk) => Bytes::from(pk.to_encoded_point(false).as_bytes().to_vec()),
            KemPublicKey::P384(pk) => Bytes::from(pk.to_encoded_point(false).as_bytes().to_vec()),
        }
    }

    pub fn deserialize_public(&self, data: &[u8]) -> Result<KemPublicKey> {
        match self.id {
            KemId::DHKEM_X25519_SHA256 => {
                let pk_bytes: [u8; 32] = data
                    .try_into()
                    .map_err(|_| Error::InvalidKeyMaterial("bad X25519 public key size".into()))?;
                Ok(KemPublicKey::X25519(x25519_dalek::PublicKey::from(
                    pk_bytes,
                )))
            }
            KemId::DHKEM_P256_SHA256 => p256::PublicKey::from_sec1_bytes(data)
                .map(KemPublicKey::P256)
                .map_err(|err| Error::InvalidKeyMaterial(err.to_string())),
            KemId::DHKEM_P384_SHA384 => p384::PublicKey::from_sec1_bytes(data)
                .map(KemPublicKey::P384)
                .map_err(|err| Error::InvalidKeyMaterial(err.to_string())),
            KemId::DHKEM_P521_SHA512 | KemId::DHKEM_X448_SHA512 => {
                Err(Error::UnsupportedKem(self.id as u16))
            }
        }
    }

    fn dh(&self, sk: &KemPrivateKey, pk: &KemPublicKey) -> Result<SecretBytes> {
        match (sk, pk) {
            (KemPrivateKey::X25519(sk), KemPublicKey::X25519(pk)) => {
                let shared = sk.diffie_hellman(pk);
                if !shared.was_contributory() {
                    return Err(Error::InvalidKeyMaterial(
                        "low-order X25519 public key".into(),
                    ));
                }
                Ok(SecretBytes::from(shared.as_bytes().to_vec()))
            }
            (KemPrivateKey::P256(sk), KemPublicKey::P256(pk)) => {
                let shared = p256::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                Ok(SecretBytes::from(shared.raw_secret_bytes().to_vec()))
            }
            (KemPrivateKey::P384(sk), KemPublicKey::P384(pk)) => {
                let shared = p384::ecdh::diffie_hellman(sk.to_nonzero_scalar(), pk.as_affine());
                Ok(SecretBytes::from(shared.raw_secret_bytes().to_vec()))
            }
            _ => Err(Error::InvalidKeyMaterial(
                "key does not match the KEM curve".into(),
            )),
        }
    }

    fn extract_and_expand(&self, dh: &[u8], kem_context: &[u8]) -> Result<SecretBytes> {
        let eae_prk = self
            .kdf
            .labeled_extract(&self.suite_id, &[], b"eae_prk", dh)?;
        let shared_secret = self.kdf.labeled_expand(
            &self.suite_id,
            &eae_prk,
            b"shared_secret",
            kem_context,
            self.secret_size(),
        )?;
        Ok(SecretBytes::from(shared_secret))
    }

    pub fn encap(&self, pk_r: &KemPublicKey) -> Result<(SecretBytes, Bytes)> {
        let (sk_e, pk_e) = self.generate_key_pair()?;
        let dh = self.dh(&sk_e, pk_r)?;

        let enc = self.serialize_public(&pk_e);
        let pk_rm = self.serialize_public(pk_r);
        let mut kem_context = BytesMut::new();
        kem_context.put_slice(&enc);
        kem_context.put_slice(&pk_rm);

        let shared_secret = self.extract_and_expand(dh.as_ref(), &kem_context.freeze())?;
        Ok((shared_secret, enc))
    }

    pub fn decap(&self, enc: &[u8], sk_r: &KemPrivateKey) -> Result<SecretBytes> {
        let pk_e = self.deserialize_public(enc)?;
        let dh = self.dh(sk_r, &pk_e)?;

        let pk_rm = self.serialize_public(&self.public_from_private(sk_r));
        let mut kem_context = BytesMut::new();
        kem_context.put_slice(enc);
        kem_context.put_slice(&pk_rm);

        self.extract_and_expand(dh.as_ref(), &kem_context.freeze())
    }

    /// Authenticated variant: the shared secret also binds the sender's
    /// static key, so only the holder of `sk_s` can have produced `enc`.
    pub fn auth_encap(
        &self,
        pk_r: &KemPublicKey,
        sk_s: &KemPrivateKey,
    ) -> Result<(SecretBytes, Bytes)> {
        let (sk_e, pk_e) = self.generate_key_pair()?;
        let dh_e = self.dh(&sk_e, pk_r)?;
        let dh_s = self.dh(sk_s, pk_r)?;
        let mut dh = Vec::with_capacity(dh_e.len() + dh_s.len());
        dh.extend_from_slice(dh_e.as_ref());
        dh.extend_from_slice(dh_s.as_ref());
        let dh = SecretBytes::from(dh);

        let enc = self.serialize_public(&pk_e);
        let pk_rm = self.serialize_public(pk_r);
        let pk_sm = self.serialize_public(&self.public_from_private(sk_s));
        let mut kem_context = BytesMut::new();
        kem_context.put_slice(&enc);
        kem_context.put_slice(&pk_rm);
        kem_context.put_slice(&pk_sm);

        let shared_secret = self.extract_and_expand(dh.as_ref(), &kem_context.freeze())?;
        Ok((shared_secret, enc))
    }

    pub fn auth_decap(
        &self,
        enc: &[u8],
        pk_s: &KemPublicKey,
        sk_r: &KemPrivateKey,
    ) -> Result<SecretBytes> {
        let pk_e = self.deserialize_public(enc)?;
        let dh_e = self.dh(sk_r, &pk_e)?;
        let dh_s = self.dh(sk_r, pk_s)?;
        let mut dh = Vec::with_capacity(dh_e.len() + dh_s.len());
        dh.extend_from_slice(dh_e.as_ref());
        dh.extend_from_slice(dh_s.as_ref());
        let dh = SecretBytes::from(dh);

        let pk_rm = self.serialize_public(&self.public_from_private(sk_r));
        let pk_sm = self.serialize_public(pk_s);
        let mut kem_context = BytesMut::new();
        kem_context.put_slice(enc);
        kem_context.put_slice(&pk_rm);
        kem_context.put_slice(&pk_sm);

        self.extract_and_expand(dh.as_ref(), &kem_context.freeze())
    }
}
