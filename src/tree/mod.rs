
use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::codec::*;
use crate::error::{Error, Result};
use crate::key_package::KeyPackage;

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct LeafIndex(pub u32);

#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct Extension {
    pub ext_type: u16,
    pub data: Bytes,
}

impl Deserializer for Extension {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if buf.remaining() < 2 {
            return Err(Error::BufferTooSmall);
        }
        let ext_type = buf.get_u16();
        let data = deserialize_opaque16(buf)?;
        Ok(Self { ext_type, data })
    }
}

impl Serializer for Extension {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        buf.put_u16(self.ext_type);
        serialize_opaque16(&self.data, buf)
    }
}

pub(crate) fn deserialize_extensions<B: Buf>(buf: &mut B) -> Result<Vec<Extension>> {
    let mut extensions = vec![];
    deserialize_vector32(buf, |b: &mut Bytes| -> Result<()> {
        extensions.push(Extension::deserialize(b)?);
        Ok(())
    })?;
    Ok(extensions)
}

pub(crate) fn serialize_extensions<B: BufMut>(
    extensions: &[Extension],
    buf: &mut B,
) -> Result<()> {
    serialize_vector32(
        extensions.len(),
        buf,
        |i: usize, b: &mut BytesMut| -> Result<()> { extensions[i].serialize(b) },
    )
}

/// Public view of the group's ratchet tree: the leaves and their key
/// packages. Path secrets and tree math live elsewhere; everything here
/// needs only lookup and a stable serialization.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct RatchetTree {
    leaves: Vec<Option<KeyPackage>>,
}

impl RatchetTree {
    pub fn new() -> Self {
        RatchetTree { leaves: vec![] }
    }

    pub fn from_leaves(leaves: Vec<Option<KeyPackage>>) -> Self {
        RatchetTree { leaves }
    }

    pub fn add_leaf(&mut self, key_package: KeyPackage) -> LeafIndex {
        self.leaves.push(Some(key_package));
        LeafIndex(self.leaves.len() as u32 - 1)
    }

    pub fn blank_leaf(&mut self, index: LeafIndex) {
        if let Some(leaf) = self.leaves.get_mut(index.0 as usize) {
            *leaf = None;
        }
    }

    /// The key package at a leaf, or `None` when the index is out of range
    /// or the leaf is blank.
    pub fn key_package(&self, index: LeafIndex) -> Option<&KeyPackage> {
        self.leaves.get(index.0 as usize)?.as_ref()
    }

    pub fn leaf_count(&self) -> u32 {
        self.leaves.len() as u32
    }
}

impl Deserializer for RatchetTree {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let mut leaves = vec![];
        deserialize_vector32(buf, |b: &mut Bytes| -> Result<()> {
            if deserialize_optional(b)? {
                leaves.push(Some(KeyPackage::deserialize(b)?));
            } else {
                leaves.push(None);
            }
            Ok(())
        })?;
        Ok(RatchetTree { leaves })
    }
}

impl Serializer for RatchetTree {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_vector32(
            self.leaves.len(),
            buf,
            |i: usize, b: &mut BytesMut| -> Result<()> {
                serialize_optional(self.leaves[i].is_some(), b)?;
                if let Some(leaf) = &self.leaves[i] {
                    leaf.serialize(b)?;
                }
                Ok(())
            },
        )
    }
}
