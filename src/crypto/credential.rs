use bytes::{Buf, BufMut, Bytes};

use crate::codec::*;
use crate::crypto::signature::{SignaturePublicKey, SignatureScheme};
use crate::error::{Error, Result};

/// A bare signature key bound to an application-chosen identity.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct BasicCredential {
    identity: Bytes,
    public_key: SignaturePublicKey,
}

impl BasicCredential {
    pub fn new(identity: Bytes, public_key: SignaturePublicKey) -> Self {
        BasicCredential {
            identity,
            public_key,
        }
    }

    pub fn identity(&self) -> &[u8] {
        &self.identity
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Credential {
    Basic(BasicCredential),
}

impl Default for Credential {
    fn default() -> Self {
        Credential::Basic(BasicCredential::default())
    }
}

impl Credential {
    pub fn public_key(&self) -> &SignaturePublicKey {
        match self {
            Credential::Basic(basic) => &basic.public_key,
        }
    }

    pub fn identity(&self) -> &[u8] {
        match self {
            Credential::Basic(basic) => basic.identity(),
        }
    }
}

impl Deserializer for Credential {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if !buf.has_remaining() {
            return Err(Error::BufferTooSmall);
        }
        let v = buf.get_u8();
        match v {
            1 => {
                let identity = deserialize_opaque16(buf)?;
                if buf.remaining() < 2 {
                    return Err(Error::BufferTooSmall);
                }
                let scheme: SignatureScheme = buf.get_u16().try_into()?;
                let public_key = deserialize_opaque16(buf)?;

                Ok(Credential::Basic(BasicCredential {
                    identity,
                    public_key: SignaturePublicKey::new(scheme, public_key),
                }))
            }
            _ => Err(Error::InvalidCredentialTypeValue(v)),
        }
    }
}

impl Serializer for Credential {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        match self {
            Credential::Basic(basic) => {
                buf.put_u8(1);
                serialize_opaque16(&basic.identity, buf)?;
                buf.put_u16(basic.public_key.scheme() as u16);
                serialize_opaque16(basic.public_key.as_bytes(), buf)
            }
        }
    }
}
