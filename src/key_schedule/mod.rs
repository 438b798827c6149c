//! The epoch key schedule: each epoch's secrets hang off a single
//! `epoch_secret`, and Commits drive the transition to the next one.

#[cfg(test)]
mod key_schedule_test;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cipher_suite::CipherSuite;
use crate::codec::*;
use crate::crypto::secret::SecretBytes;
use crate::error::{Error, Result};
use crate::tree::{deserialize_extensions, serialize_extensions, Extension};

pub const SECRET_LABEL_SENDER_DATA: &[u8] = b"sender data";
pub const SECRET_LABEL_HANDSHAKE: &[u8] = b"handshake";
pub const SECRET_LABEL_APP: &[u8] = b"app";
pub const SECRET_LABEL_EXPORTER: &[u8] = b"exporter";
pub const SECRET_LABEL_CONFIRM: &[u8] = b"confirm";
pub const SECRET_LABEL_INIT: &[u8] = b"init";
pub const SECRET_LABEL_MEMBERSHIP: &[u8] = b"membership";
pub const SECRET_LABEL_RESUMPTION: &[u8] = b"resumption";

/// Epoch-bound group state. Serialized, it prefixes every signed content
/// and anchors the key schedule's transcript binding.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct GroupContext {
    pub group_id: Bytes,
    pub epoch: u64,
    pub tree_hash: Bytes,
    pub confirmed_transcript_hash: Bytes,
    pub extensions: Vec<Extension>,
}

impl Deserializer for GroupContext {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        let group_id = deserialize_opaque8(buf)?;
        if buf.remaining() < 8 {
            return Err(Error::BufferTooSmall);
        }
        let epoch = buf.get_u64();
        let tree_hash = deserialize_opaque8(buf)?;
        let confirmed_transcript_hash = deserialize_opaque8(buf)?;
        let extensions = deserialize_extensions(buf)?;

        Ok(Self {
            group_id,
            epoch,
            tree_hash,
            confirmed_transcript_hash,
            extensions,
        })
    }
}

impl Serializer for GroupContext {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(&self.group_id, buf)?;
        buf.put_u64(self.epoch);
        serialize_opaque8(&self.tree_hash, buf)?;
        serialize_opaque8(&self.confirmed_transcript_hash, buf)?;
        serialize_extensions(&self.extensions, buf)
    }
}

/// The secrets of one epoch, all derived from `epoch_secret`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyScheduleEpoch {
    pub suite: CipherSuite,
    pub epoch_secret: SecretBytes,
    pub sender_data_secret: SecretBytes,
    pub handshake_secret: SecretBytes,
    pub application_secret: SecretBytes,
    pub exporter_secret: SecretBytes,
    pub confirmation_key: SecretBytes,
    pub init_secret: SecretBytes,
    pub membership_key: SecretBytes,
    pub resumption_secret: SecretBytes,
}

impl KeyScheduleEpoch {
    pub fn new(suite: CipherSuite, epoch_secret: SecretBytes) -> Result<Self> {
        let derive = |label: &[u8]| -> Result<SecretBytes> {
            Ok(SecretBytes::from(
                suite.derive_secret(epoch_secret.as_ref(), label)?,
            ))
        };

        Ok(KeyScheduleEpoch {
            suite,
            sender_data_secret: derive(SECRET_LABEL_SENDER_DATA)?,
            handshake_secret: derive(SECRET_LABEL_HANDSHAKE)?,
            application_secret: derive(SECRET_LABEL_APP)?,
            exporter_secret: derive(SECRET_LABEL_EXPORTER)?,
            confirmation_key: derive(SECRET_LABEL_CONFIRM)?,
            init_secret: derive(SECRET_LABEL_INIT)?,
            membership_key: derive(SECRET_LABEL_MEMBERSHIP)?,
            resumption_secret: derive(SECRET_LABEL_RESUMPTION)?,
            epoch_secret,
        })
    }

    /// Advance to the next epoch. The commit secret is mixed with this
    /// epoch's init secret, then expanded against the serialized group
    /// context of the new epoch.
    pub fn next_epoch(&self, commit_secret: &[u8], group_context: &[u8]) -> Result<Self> {
        let extracted = self
            .suite
            .hpke()?
            .kdf()
            .extract(self.init_secret.as_ref(), commit_secret)?;
        let next_secret = self.suite.expand_with_label(
            &extracted,
            b"epoch",
            group_context,
            self.suite.hash().size(),
        )?;
        KeyScheduleEpoch::new(self.suite, SecretBytes::from(next_secret))
    }
}

/// Hash of the transcript up to and including a Commit's signed content.
pub fn confirmed_transcript_hash(
    suite: CipherSuite,
    interim_before: &[u8],
    commit_content: &[u8],
) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_slice(interim_before);
    buf.put_slice(commit_content);
    suite.digest(&buf.freeze())
}

/// Hash extending the confirmed transcript with the Commit's
/// authentication data.
pub fn interim_transcript_hash(
    suite: CipherSuite,
    confirmed: &[u8],
    commit_auth_data: &[u8],
) -> Bytes {
    let mut buf = BytesMut::new();
    buf.put_slice(confirmed);
    buf.put_slice(commit_auth_data);
    suite.digest(&buf.freeze())
}
