use bytes::Bytes;
use rand_core::OsRng;
use signature::{Signer, Verifier};

use crate::cipher_suite::CipherSuite;
use crate::crypto::secret::SecretBytes;
use crate::error::{Error, Result};

#[allow(non_camel_case_types)]
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u16)]
pub enum SignatureScheme {
    ECDSA_P256_SHA256 = 0x0403,
    ECDSA_P384_SHA384 = 0x0503,
    ECDSA_P521_SHA512 = 0x0603,
    #[default]
    Ed25519 = 0x0807,
    Ed448 = 0x0808,
}

impl TryFrom<u16> for SignatureScheme {
    type Error = Error;

    fn try_from(v: u16) -> std::result::Result<Self, Self::Error> {
        match v {
            0x0403 => Ok(SignatureScheme::ECDSA_P256_SHA256),
            0x0503 => Ok(SignatureScheme::ECDSA_P384_SHA384),
            0x0603 => Ok(SignatureScheme::ECDSA_P521_SHA512),
            0x0807 => Ok(SignatureScheme::Ed25519),
            0x0808 => Ok(SignatureScheme::Ed448),
            _ => Err(Error::InvalidSignatureSchemeValue(v)),
        }
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct SignaturePublicKey {
    scheme: SignatureScheme,
    data: Bytes,
}

impl SignaturePublicKey {
    pub fn new(scheme: SignatureScheme, data: Bytes) -> Self {
        SignaturePublicKey { scheme, data }
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Verify a signature over `message`. Any failure, including a scheme
    /// that does not match the suite, reads as an invalid signature.
    pub fn verify(&self, suite: CipherSuite, message: &[u8], signature: &[u8]) -> bool {
        match suite.signature_scheme() {
            Ok(scheme) if scheme == self.scheme => {}
            _ => return false,
        }

        match self.scheme {
            SignatureScheme::Ed25519 => {
                let Ok(public_key) = self.data.as_ref().try_into() else {
                    return false;
                };
                let Ok(verifying_key) = ed25519_dalek::VerifyingKey::from_bytes(public_key) else {
                    return false;
                };
                let Ok(signature) = ed25519_dalek::Signature::from_slice(signature) else {
                    return false;
                };
                verifying_key.verify(message, &signature).is_ok()
            }
            SignatureScheme::ECDSA_P256_SHA256 => {
                let Ok(verifying_key) = p256::ecdsa::VerifyingKey::from_sec1_bytes(&self.data)
                else {
                    return false;
                };
                let Ok(signature) = p256::ecdsa::Signature::from_der(signature) else {
                    return false;
                };
                verifying_key.verify(message, &signature).is_ok()
            }
            SignatureScheme::ECDSA_P384_SHA384 => {
                let Ok(verifying_key) = p384::ecdsa::VerifyingKey::from_sec1_bytes(&self.data)
                else {
                    return false;
                };
                let Ok(signature) = p384::ecdsa::Signature::from_der(signature) else {
                    return false;
                };
                verifying_key.verify(message, &signature).is_ok()
            }
            SignatureScheme::ECDSA_P521_SHA512 | SignatureScheme::Ed448 => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SignaturePrivateKey {
    scheme: SignatureScheme,
    data: SecretBytes,
    public_key: SignaturePublicKey,
}

impl SignaturePrivateKey {
    /// Generate a fresh signing key for the scheme.
    pub fn generate(scheme: SignatureScheme) -> Result<Self> {
        match scheme {
            SignatureScheme::Ed25519 => {
                let signing_key = ed25519_dalek::SigningKey::generate(&mut OsRng);
                let public = Bytes::from(signing_key.verifying_key().to_bytes().to_vec());
                Ok(SignaturePrivateKey {
                    scheme,
                    data: SecretBytes::from(signing_key.to_bytes().to_vec()),
                    public_key: SignaturePublicKey::new(scheme, public),
                })
            }
            SignatureScheme::ECDSA_P256_SHA256 => {
                let signing_key = p256::ecdsa::SigningKey::random(&mut OsRng);
                let public = Bytes::from(
                    signing_key
                        .verifying_key()
                        .to_encoded_point(false)
                        .as_bytes()
                        .to_vec(),
                );
                Ok(SignaturePrivateKey {
                    scheme,
                    data: SecretBytes::from(signing_key.to_bytes().to_vec()),
                    public_key: SignaturePublicKey::new(scheme, public),
                })
            }
            SignatureScheme::ECDSA_P384_SHA384 => {
                let signing_key = p384::ecdsa::SigningKey::random(&mut OsRng);
                let public = Bytes::from(
                    signing_key
                        .verifying_key()
                        .to_encoded_point(false)
                        .as_bytes()
                        .to_vec(),
                );
                Ok(SignaturePrivateKey {
                    scheme,
                    data: SecretBytes::from(signing_key.to_bytes().to_vec()),
                    public_key: SignaturePublicKey::new(scheme, public),
                })
            }
            SignatureScheme::ECDSA_P521_SHA512 | SignatureScheme::Ed448 => {
                Err(Error::UnsupportedSignatureScheme)
            }
        }
    }

    /// Reconstruct a signing key from raw private key bytes (an Ed25519 seed
    /// or a NIST scalar).
    pub fn from_bytes(scheme: SignatureScheme, data: &[u8]) -> Result<Self> {
        match scheme {
            SignatureScheme::Ed25519 => {
                let seed: &[u8; 32] = data
                    .try_into()
                    .map_err(|_| Error::InvalidKeyMaterial("bad Ed25519 seed length".into()))?;
                let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
                let public = Bytes::from(signing_key.verifying_key().to_bytes().to_vec());
                Ok(SignaturePrivateKey {
                    scheme,
                    data: SecretBytes::from(data),
                    public_key: SignaturePublicKey::new(scheme, public),
                })
            }
            SignatureScheme::ECDSA_P256_SHA256 => {
                let signing_key = p256::ecdsa::SigningKey::from_slice(data)
                    .map_err(|err| Error::InvalidKeyMaterial(err.to_string()))?;
                let public = Bytes::from(
                    signing_key
                        .verifying_key()
                        .to_encoded_point(false)
                        .as_bytes()
                        .to_vec(),
                );
                Ok(SignaturePrivateKey {
                    scheme,
                    data: SecretBytes::from(data),
                    public_key: SignaturePublicKey::new(scheme, public),
                })
            }
            SignatureScheme::ECDSA_P384_SHA384 => {
                let signing_key = p384::ecdsa::SigningKey::from_slice(data)
                    .map_err(|err| Error::InvalidKeyMaterial(err.to_string()))?;
                let public = Bytes::from(
                    signing_key
                        .verifying_key()
                        .to_encoded_point(false)
                        .as_bytes()
                        .to_vec(),
                );
                Ok(SignaturePrivateKey {
                    scheme,
                    data: SecretBytes::from(data),
                    public_key: SignaturePublicKey::new(scheme, public),
                })
            }
            SignatureScheme::ECDSA_P521_SHA512 | SignatureScheme::Ed448 => {
                Err(Error::UnsupportedSignatureScheme)
            }
        }
    }

    pub fn scheme(&self) -> SignatureScheme {
        self.scheme
    }

    pub fn public_key(&self) -> &SignaturePublicKey {
        &self.public_key
    }

    pub fn sign(&self, suite: CipherSuite, message: &[u8]) -> Result<Bytes> {
        if suite.signature_scheme()? != self.scheme {
            return Err(Error::InvalidKeyMaterial(
                "signature scheme does not match cipher suite".into(),
            ));
        }

        match self.scheme {
            SignatureScheme::Ed25519 => {
                let seed: &[u8; 32] = self
                    .data
                    .as_ref()
                    .try_into()
                    .map_err(|_| Error::InvalidKeyMaterial("bad Ed25519 seed length".into()))?;
                let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
                let signature: ed25519_dalek::Signature = signing_key.sign(message);
                Ok(Bytes::from(signature.to_vec()))
            }
            SignatureScheme::ECDSA_P256_SHA256 => {
                let signing_key = p256::ecdsa::SigningKey::from_slice(self.data.as_ref())
                    .map_err(|err| Error::InvalidKeyMaterial(err.to_string()))?;
                let signature: p256::ecdsa::Signature = signing_key.sign(message);
                Ok(Bytes::from(signature.to_der().to_bytes().to_vec()))
            }
            SignatureScheme::ECDSA_P384_SHA384 => {
                let signing_key = p384::ecdsa::SigningKey::from_slice(self.data.as_ref())
                    .map_err(|err| Error::InvalidKeyMaterial(err.to_string()))?;
                let signature: p384::ecdsa::Signature = signing_key.sign(message);
                Ok(Bytes::from(signature.to_der().to_bytes().to_vec()))
            }
            SignatureScheme::ECDSA_P521_SHA512 | SignatureScheme::Ed448 => {
                Err(Error::UnsupportedSignatureScheme)
            }
        }
    }
}
