use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cipher_suite::CipherSuite;
use crate::codec::*;
use crate::crypto::credential::Credential;
use crate::crypto::signature::SignaturePrivateKey;
use crate::error::{Error, Result};
use crate::message::framing::{ProtocolVersion, PROTOCOL_VERSION_MLS10};
use crate::tree::{deserialize_extensions, serialize_extensions, Extension};

/// A member's published join material: an HPKE init key bound to a
/// credential by the credential holder's signature.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct KeyPackage {
    pub version: ProtocolVersion,
    pub cipher_suite: CipherSuite,
    pub init_key: Bytes,
    pub credential: Credential,
    pub extensions: Vec<Extension>,
    pub signature: Bytes,
}

impl KeyPackage {
    pub fn new(cipher_suite: CipherSuite, init_key: Bytes, credential: Credential) -> Self {
        KeyPackage {
            version: PROTOCOL_VERSION_MLS10,
            cipher_suite,
            init_key,
            credential,
            extensions: vec![],
            signature: Bytes::new(),
        }
    }

    fn serialize_base<B>(&self, buf: &mut B) -> Result<()>
    where
        B: BufMut,
    {
        buf.put_u8(self.version);
        buf.put_u16(self.cipher_suite as u16);
        serialize_opaque16(&self.init_key, buf)?;
        self.credential.serialize(buf)?;
        serialize_extensions(&self.extensions, buf)
    }

    pub fn to_be_signed(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.serialize_base(&mut buf)?;
        Ok(buf.freeze())
    }

    pub fn sign(&mut self, signer: &SignaturePrivateKey) -> Result<()> {
        let tbs = self.to_be_signed()?;
        self.signature = signer.sign(self.cipher_suite, &tbs)?;
        Ok(())
    }

    pub fn verify(&self) -> bool {
        let Ok(tbs) = self.to_be_signed() else {
            return false;
        };
        self.credential
            .public_key()
            .verify(self.cipher_suite, &tbs, &self.signature)
    }

    /// Identifier for this key package: the suite hash over its full
    /// serialization.
    pub fn hash(&self) -> Result<Bytes> {
        Ok(self.cipher_suite.digest(&self.serialize_detached()?))
    }
}

impl Deserializer for KeyPackage {
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
        let init_key = deserialize_opaque16(buf)?;
        let credential = Credential::deserialize(buf)?;
        let extensions = deserialize_extensions(buf)?;
        let signature = deserialize_opaque16(buf)?;

        Ok(Self {
            version,
            cipher_suite,
            init_key,
            credential,
            extensions,
            signature,
        })
    }
}

impl Serializer for KeyPackage {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        self.serialize_base(buf)?;
        serialize_opaque16(&self.signature, buf)
    }
}
