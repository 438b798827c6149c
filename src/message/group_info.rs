use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cipher_suite::CipherSuite;
use crate::codec::*;
use crate::crypto::signature::SignaturePrivateKey;
use crate::error::{Error, Result};
use crate::tree::{deserialize_extensions, serialize_extensions, Extension, LeafIndex, RatchetTree};

/// The epoch snapshot handed to joining members: group state, transcript
/// hashes, and the committer's signature over all of it.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct GroupInfo {
    suite: CipherSuite,
    pub group_id: Bytes,
    pub epoch: u64,
    pub tree: RatchetTree,
    pub confirmed_transcript_hash: Bytes,
    pub interim_transcript_hash: Bytes,
    pub extensions: Vec<Extension>,
    pub confirmation: Bytes,
    pub signer_index: LeafIndex,
    pub signature: Bytes,
}

impl GroupInfo {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        suite: CipherSuite,
        group_id: Bytes,
        epoch: u64,
        tree: RatchetTree,
        confirmed_transcript_hash: Bytes,
        interim_transcript_hash: Bytes,
        extensions: Vec<Extension>,
        confirmation: Bytes,
    ) -> Self {
        GroupInfo {
            suite,
            group_id,
            epoch,
            tree,
            confirmed_transcript_hash,
            interim_transcript_hash,
            extensions,
            confirmation,
            signer_index: LeafIndex(0),
            signature: Bytes::new(),
        }
    }

    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    pub fn to_be_signed(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        serialize_opaque8(&self.group_id, &mut buf)?;
        buf.put_u64(self.epoch);
        self.tree.serialize(&mut buf)?;
        serialize_opaque8(&self.confirmed_transcript_hash, &mut buf)?;
        serialize_opaque8(&self.interim_transcript_hash, &mut buf)?;
        serialize_opaque8(&self.confirmation, &mut buf)?;
        buf.put_u32(self.signer_index.0);
        Ok(buf.freeze())
    }

    /// Sign as the member at `index`. The leaf must be occupied and its
    /// credential must match the signing key.
    pub fn sign(&mut self, index: LeafIndex, signer: &SignaturePrivateKey) -> Result<()> {
        let Some(key_package) = self.tree.key_package(index) else {
            return Err(Error::SignerLeafBlank);
        };

        if key_package.credential.public_key() != signer.public_key() {
            return Err(Error::SignerKeyMismatch);
        }

        self.signer_index = index;
        let tbs = self.to_be_signed()?;
        self.signature = signer.sign(self.suite, &tbs)?;
        Ok(())
    }

    pub fn verify(&self) -> Result<bool> {
        let Some(key_package) = self.tree.key_package(self.signer_index) else {
            return Err(Error::SignerLeafBlank);
        };

        let tbs = self.to_be_signed()?;
        Ok(key_package
            .credential
            .public_key()
            .verify(self.suite, &tbs, &self.signature))
    }

    /// The suite is carried alongside the wire object, so decoding needs it
    /// supplied by the carrier (a Welcome knows its cipher suite).
    pub fn deserialize<B>(buf: &mut B, suite: CipherSuite) -> Result<Self>
    where
        B: Buf,
    {
        let group_id = deserialize_opaque8(buf)?;
        if buf.remaining() < 8 {
            return Err(Error::BufferTooSmall);
        }
        let epoch = buf.get_u64();
        let tree = RatchetTree::deserialize(buf)?;
        let confirmed_transcript_hash = deserialize_opaque8(buf)?;
        let interim_transcript_hash = deserialize_opaque8(buf)?;
        let extensions = deserialize_extensions(buf)?;
        let confirmation = deserialize_opaque8(buf)?;
        if buf.remaining() < 4 {
            return Err(Error::BufferTooSmall);
        }
        let signer_index = LeafIndex(buf.get_u32());
        let signature = deserialize_opaque16(buf)?;

        Ok(Self {
            suite,
            group_id,
            epoch,
            tree,
            confirmed_transcript_hash,
            interim_transcript_hash,
            extensions,
            confirmation,
            signer_index,
            signature,
        })
    }

    pub fn deserialize_exact(mut buf: &[u8], suite: CipherSuite) -> Result<Self> {
        let v = Self::deserialize(&mut buf, suite)?;
        if buf.has_remaining() {
            return Err(Error::InputContainsExcessBytes(buf.remaining()));
        }
        Ok(v)
    }
}

impl Serializer for GroupInfo {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(&self.group_id, buf)?;
        buf.put_u64(self.epoch);
        self.tree.serialize(buf)?;
        serialize_opaque8(&self.confirmed_transcript_hash, buf)?;
        serialize_opaque8(&self.interim_transcript_hash, buf)?;
        serialize_extensions(&self.extensions, buf)?;
        serialize_opaque8(&self.confirmation, buf)?;
        buf.put_u32(self.signer_index.0);
        serialize_opaque16(&self.signature, buf)
    }
}
