use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::*;
use crate::error::{Error, Result};
use crate::key_package::KeyPackage;

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Add {
    pub key_package: KeyPackage,
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Update {
    pub key_package: KeyPackage,
}

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Remove {
    pub removed: u32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Proposal {
    Add(Add),
    Update(Update),
    Remove(Remove),
}

impl Proposal {
    pub fn proposal_type(&self) -> u8 {
        match self {
            Proposal::Add(_) => 1,
            Proposal::Update(_) => 2,
            Proposal::Remove(_) => 3,
        }
    }
}

impl Deserializer for Proposal {
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
            1 => Ok(Proposal::Add(Add {
                key_package: KeyPackage::deserialize(buf)?,
            })),
            2 => Ok(Proposal::Update(Update {
                key_package: KeyPackage::deserialize(buf)?,
            })),
            3 => {
                if buf.remaining() < 4 {
                    return Err(Error::BufferTooSmall);
                }
                Ok(Proposal::Remove(Remove {
                    removed: buf.get_u32(),
                }))
            }
            _ => Err(Error::InvalidProposalTypeValue(v)),
        }
    }
}

impl Serializer for Proposal {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        buf.put_u8(self.proposal_type());
        match self {
            Proposal::Add(add) => add.key_package.serialize(buf),
            Proposal::Update(update) => update.key_package.serialize(buf),
            Proposal::Remove(remove) => {
                buf.put_u32(remove.removed);
                Ok(())
            }
        }
    }
}

/// Hash-based reference to a proposal covered by a Commit.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct ProposalId {
    pub hash: Bytes,
}

impl Deserializer for ProposalId {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        Ok(Self {
            hash: deserialize_opaque8(buf)?,
        })
    }
}

impl Serializer for ProposalId {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(&self.hash, buf)
    }
}

/// A Commit names the proposals it applies and optionally carries the
/// committer's (opaque, tree-layer) update path.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    pub proposals: Vec<ProposalId>,
    pub path: Option<Bytes>,
}

impl Deserializer for Commit {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let mut proposals = vec![];
        deserialize_vector32(buf, |b: &mut Bytes| -> Result<()> {
            proposals.push(ProposalId::deserialize(b)?);
            Ok(())
        })?;

        let path = if deserialize_optional(buf)? {
            Some(deserialize_opaque32(buf)?)
        } else {
            None
        };

        Ok(Self { proposals, path })
    }
}

impl Serializer for Commit {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_vector32(
            self.proposals.len(),
            buf,
            |i: usize, b: &mut BytesMut| -> Result<()> { self.proposals[i].serialize(b) },
        )?;
        serialize_optional(self.path.is_some(), buf)?;
        if let Some(path) = &self.path {
            serialize_opaque32(path, buf)?;
        }
        Ok(())
    }
}
