use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cipher_suite::CipherSuite;
use crate::codec::*;
use crate::crypto::secret::SecretBytes;
use crate::error::{Error, Result};
use crate::hpke::KemPrivateKey;
use crate::key_package::KeyPackage;
use crate::message::framing::{ProtocolVersion, PROTOCOL_VERSION_MLS10};
use crate::message::group_info::GroupInfo;

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct HpkeCiphertext {
    pub kem_output: Bytes,
    pub ciphertext: Bytes,
}

impl Deserializer for HpkeCiphertext {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let kem_output = deserialize_opaque16(buf)?;
        let ciphertext = deserialize_opaque32(buf)?;
        Ok(Self {
            kem_output,
            ciphertext,
        })
    }
}

impl Serializer for HpkeCiphertext {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque16(&self.kem_output, buf)?;
        serialize_opaque32(&self.ciphertext, buf)
    }
}

/// The secrets a joining member needs: the epoch secret, plus the path
/// secret when the committer placed them on its direct path.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct GroupSecrets {
    pub epoch_secret: SecretBytes,
    pub path_secret: Option<SecretBytes>,
}

impl Deserializer for GroupSecrets {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let epoch_secret = SecretBytes::from(deserialize_opaque8(buf)?);
        let path_secret = if deserialize_optional(buf)? {
            Some(SecretBytes::from(deserialize_opaque8(buf)?))
        } else {
            None
        };
        Ok(Self {
            epoch_secret,
            path_secret,
        })
    }
}

impl Serializer for GroupSecrets {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(self.epoch_secret.as_ref(), buf)?;
        serialize_optional(self.path_secret.is_some(), buf)?;
        if let Some(path_secret) = &self.path_secret {
            serialize_opaque8(path_secret.as_ref(), buf)?;
        }
        Ok(())
    }
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct EncryptedGroupSecrets {
    pub key_package_hash: Bytes,
    pub encrypted_group_secrets: HpkeCiphertext,
}

impl Deserializer for EncryptedGroupSecrets {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let key_package_hash = deserialize_opaque8(buf)?;
        let encrypted_group_secrets = HpkeCiphertext::deserialize(buf)?;
        Ok(Self {
            key_package_hash,
            encrypted_group_secrets,
        })
    }
}

impl Serializer for EncryptedGroupSecrets {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(&self.key_package_hash, buf)?;
        self.encrypted_group_secrets.serialize(buf)
    }
}

/// Hands a new member the encrypted GroupInfo and, per recipient, the group
/// secrets sealed to their init key.
#[derive(Default, Debug, Clone)]
pub struct Welcome {
    pub version: ProtocolVersion,
    pub cipher_suite: CipherSuite,
    pub secrets: Vec<EncryptedGroupSecrets>,
    pub encrypted_group_info: Bytes,
    // Committer-side only; a decoded Welcome never has it.
    epoch_secret: Option<SecretBytes>,
}

impl PartialEq for Welcome {
    fn eq(&self, other: &Self) -> bool {
        // Wire identity; the retained epoch secret is not part of it.
        self.version == other.version
            && self.cipher_suite == other.cipher_suite
            && self.secrets == other.secrets
            && self.encrypted_group_info == other.encrypted_group_info
    }
}

impl Welcome {
    /// Seal a signed GroupInfo under keys derived from the epoch secret.
    pub fn new(
        cipher_suite: CipherSuite,
        epoch_secret: SecretBytes,
        group_info: &GroupInfo,
    ) -> Result<Self> {
        let (key, nonce) = group_info_key_nonce(cipher_suite, epoch_secret.as_ref())?;
        let raw_group_info = group_info.serialize_detached()?;
        let encrypted_group_info =
            cipher_suite
                .hpke()?
                .aead()
                .seal(&key, &nonce, &[], &raw_group_info)?;

        Ok(Welcome {
            version: PROTOCOL_VERSION_MLS10,
            cipher_suite,
            secrets: vec![],
            encrypted_group_info,
            epoch_secret: Some(epoch_secret),
        })
    }

    /// Add a recipient: seal the group secrets to the key package's init
    /// key with empty info and empty aad.
    pub fn encrypt(&mut self, key_package: &KeyPackage, path_secret: Option<&[u8]>) -> Result<()> {
        let Some(epoch_secret) = &self.epoch_secret else {
            return Err(Error::InvalidKeyMaterial(
                "welcome was not built with an epoch secret".into(),
            ));
        };

        let group_secrets = GroupSecrets {
            epoch_secret: epoch_secret.clone(),
            path_secret: path_secret.map(SecretBytes::from),
        };
        let raw_group_secrets = group_secrets.serialize_detached()?;

        let hpke = key_package.cipher_suite.hpke()?;
        let init_key = hpke.kem().deserialize_public(&key_package.init_key)?;
        let (kem_output, mut sender) = hpke.setup_base_s(&init_key, &[])?;
        let ciphertext = sender.seal(&[], &raw_group_secrets)?;

        self.secrets.push(EncryptedGroupSecrets {
            key_package_hash: key_package.hash()?,
            encrypted_group_secrets: HpkeCiphertext {
                kem_output,
                ciphertext,
            },
        });

        Ok(())
    }

    /// Index of the entry addressed to this key package, if any. Duplicate
    /// entries are left as-is; the first match wins.
    pub fn find(&self, key_package: &KeyPackage) -> Result<Option<usize>> {
        let hash = key_package.hash()?;
        Ok(self
            .secrets
            .iter()
            .position(|sec| sec.key_package_hash == hash))
    }

    /// Recover the GroupInfo. Rejection at the AEAD layer means the caller
    /// holds the wrong epoch secret or a mangled Welcome.
    pub fn decrypt(&self, epoch_secret: &[u8]) -> Result<GroupInfo> {
        let (key, nonce) = group_info_key_nonce(self.cipher_suite, epoch_secret)?;
        let raw_group_info = self
            .cipher_suite
            .hpke()?
            .aead()
            .open(&key, &nonce, &[], &self.encrypted_group_info)?
            .ok_or(Error::WelcomeDecryptionFailed)?;

        GroupInfo::deserialize_exact(&raw_group_info, self.cipher_suite)
    }

    /// Recipient side: unseal the group secrets addressed to `key_package`
    /// with the matching init private key.
    pub fn decrypt_secrets(
        &self,
        key_package: &KeyPackage,
        init_priv: &KemPrivateKey,
    ) -> Result<GroupSecrets> {
        let index = self
            .find(key_package)?
            .ok_or(Error::GroupSecretsNotFound)?;
        let sec = &self.secrets[index].encrypted_group_secrets;

        let hpke = self.cipher_suite.hpke()?;
        let mut receiver = hpke.setup_base_r(&sec.kem_output, init_priv, &[])?;
        let raw_group_secrets = receiver
            .open(&[], &sec.ciphertext)?
            .ok_or(Error::WelcomeDecryptionFailed)?;

        GroupSecrets::deserialize_exact(&raw_group_secrets)
    }
}

impl Deserializer for Welcome {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if buf.remaining() < 3 {
            return Err(Error::BufferTooSmall);
        }
        let version = buf.get_u8();
        if version != PROTOCOL_VERSION_MLS10 {
            return Err(Error::InvalidProtocolVersionValue(version));
        }
        let cipher_suite: CipherSuite = buf.get_u16().try_into()?;

        let mut secrets = vec![];
        deserialize_vector32(buf, |b: &mut Bytes| -> Result<()> {
            secrets.push(EncryptedGroupSecrets::deserialize(b)?);
            Ok(())
        })?;

        let encrypted_group_info = deserialize_opaque32(buf)?;

        Ok(Self {
            version,
            cipher_suite,
            secrets,
            encrypted_group_info,
            epoch_secret: None,
        })
    }
}

impl Serializer for Welcome {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        buf.put_u8(self.version);
        buf.put_u16(self.cipher_suite as u16);
        serialize_vector32(
            self.secrets.len(),
            buf,
            |i: usize, b: &mut BytesMut| -> Result<()> { self.secrets[i].serialize(b) },
        )?;
        serialize_opaque32(&self.encrypted_group_info, buf)
    }
}

/// Key and nonce protecting the GroupInfo: `"group info"` narrows the epoch
/// secret, and the key and nonce both derive from that narrowed secret.
fn group_info_key_nonce(suite: CipherSuite, epoch_secret: &[u8]) -> Result<(Bytes, Bytes)> {
    let hpke = suite.hpke()?;
    let secret_size = hpke.kdf().hash_size();
    let key_size = hpke.aead().key_size();
    let nonce_size = hpke.aead().nonce_size();

    let secret = suite.expand_with_label(epoch_secret, b"group info", &[], secret_size)?;
    let key = suite.expand_with_label(&secret, b"key", &[], key_size)?;
    let nonce = suite.expand_with_label(&secret, b"nonce", &[], nonce_size)?;

    Ok((key, nonce))
}
