use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::cipher_suite::CipherSuite;
use crate::codec::*;
use crate::crypto::signature::{SignaturePrivateKey, SignaturePublicKey};
use crate::error::{Error, Result};
use crate::key_schedule::GroupContext;
use crate::message::proposal::{Commit, Proposal};

pub type ProtocolVersion = u8;

pub const PROTOCOL_VERSION_MLS10: ProtocolVersion = 1;

// GroupID is an application-specific group identifier.
pub type GroupID = Bytes;

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum ContentType {
    #[default]
    Application = 1,
    Proposal = 2,
    Commit = 3,
}

impl TryFrom<u8> for ContentType {
    type Error = Error;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            1 => Ok(ContentType::Application),
            2 => Ok(ContentType::Proposal),
            3 => Ok(ContentType::Commit),
            _ => Err(Error::InvalidContentTypeValue(v)),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Content {
    Application(Bytes),
    Proposal(Proposal),
    Commit(Commit),
}

impl Default for Content {
    fn default() -> Self {
        Content::Application(Bytes::new())
    }
}

impl Content {
    pub fn content_type(&self) -> ContentType {
        match self {
            Content::Application(_) => ContentType::Application,
            Content::Proposal(_) => ContentType::Proposal,
            Content::Commit(_) => ContentType::Commit,
        }
    }

    /// The payload without its tag byte, for carriers that record the
    /// content type elsewhere.
    fn serialize_untagged<B>(&self, buf: &mut B) -> Result<()>
    where
        B: BufMut,
    {
        match self {
            Content::Application(application) => serialize_opaque32(application, buf),
            Content::Proposal(proposal) => proposal.serialize(buf),
            Content::Commit(commit) => commit.serialize(buf),
        }
    }

    fn deserialize_untagged<B>(buf: &mut B, ct: ContentType) -> Result<Self>
    where
        B: Buf,
    {
        match ct {
            ContentType::Application => Ok(Content::Application(deserialize_opaque32(buf)?)),
            ContentType::Proposal => Ok(Content::Proposal(Proposal::deserialize(buf)?)),
            ContentType::Commit => Ok(Content::Commit(Commit::deserialize(buf)?)),
        }
    }
}

impl Deserializer for Content {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if !buf.has_remaining() {
            return Err(Error::BufferTooSmall);
        }
        let ct: ContentType = buf.get_u8().try_into()?;
        Content::deserialize_untagged(buf, ct)
    }
}

impl Serializer for Content {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        buf.put_u8(self.content_type() as u8);
        self.serialize_untagged(buf)
    }
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum SenderType {
    #[default]
    Member = 1,
    Preconfigured = 2,
    NewMember = 3,
}

impl TryFrom<u8> for SenderType {
    type Error = Error;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            1 => Ok(SenderType::Member),
            2 => Ok(SenderType::Preconfigured),
            3 => Ok(SenderType::NewMember),
            _ => Err(Error::InvalidSenderTypeValue(v)),
        }
    }
}

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub struct Sender {
    pub sender_type: SenderType,
    pub sender: u32,
}

impl Sender {
    pub fn member(index: u32) -> Self {
        Sender {
            sender_type: SenderType::Member,
            sender: index,
        }
    }
}

impl Deserializer for Sender {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf,
    {
        if buf.remaining() < 5 {
            return Err(Error::BufferTooSmall);
        }
        let sender_type: SenderType = buf.get_u8().try_into()?;
        let sender = buf.get_u32();
        Ok(Self {
            sender_type,
            sender,
        })
    }
}

impl Serializer for Sender {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        buf.put_u8(self.sender_type as u8);
        buf.put_u32(self.sender);
        Ok(())
    }
}

/// A group message in the clear: signed by its sender, and carrying a
/// membership MAC when it travels unencrypted.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MLSPlaintext {
    pub group_id: GroupID,
    pub epoch: u64,
    pub sender: Sender,
    pub authenticated_data: Bytes,
    pub content: Content,
    pub signature: Bytes,
    pub confirmation_tag: Option<Bytes>,
    pub membership_tag: Option<Bytes>,
    // Provenance, not wire state: true only for plaintexts recovered from a
    // ciphertext whose AEAD already authenticated the sender.
    decrypted: bool,
}

impl MLSPlaintext {
    pub fn new(group_id: GroupID, epoch: u64, sender: Sender, content: Content) -> Self {
        MLSPlaintext {
            group_id,
            epoch,
            sender,
            content,
            ..Default::default()
        }
    }

    /// Rebuild a plaintext from the decrypted content of an MLSCiphertext.
    /// This is the only constructor that marks the result `decrypted`; the
    /// caller vouches that the AEAD layer authenticated the sender.
    pub fn from_decrypted_content(
        group_id: GroupID,
        epoch: u64,
        sender: Sender,
        content_type: ContentType,
        authenticated_data: Bytes,
        raw_content: &[u8],
    ) -> Result<Self> {
        let mut buf = raw_content;
        let content = Content::deserialize_untagged(&mut buf, content_type)?;
        let signature = deserialize_opaque16(&mut buf)?;
        let confirmation_tag = if deserialize_optional(&mut buf)? {
            Some(deserialize_opaque8(&mut buf)?)
        } else {
            None
        };
        let _padding = deserialize_opaque16(&mut buf)?;

        Ok(MLSPlaintext {
            group_id,
            epoch,
            sender,
            authenticated_data,
            content,
            signature,
            confirmation_tag,
            membership_tag: None,
            decrypted: true,
        })
    }

    pub fn decrypted(&self) -> bool {
        self.decrypted
    }

    /// The byte string an MLSCiphertext encrypts: content, signature,
    /// confirmation tag, padding.
    pub fn marshal_content(&self, padding_size: usize) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        self.content.serialize_untagged(&mut buf)?;
        serialize_opaque16(&self.signature, &mut buf)?;
        serialize_optional(self.confirmation_tag.is_some(), &mut buf)?;
        if let Some(tag) = &self.confirmation_tag {
            serialize_opaque8(tag, &mut buf)?;
        }
        let padding = vec![0u8; padding_size];
        serialize_opaque16(&padding, &mut buf)?;
        Ok(buf.freeze())
    }

    /// Everything the sender's signature covers, prefixed by the
    /// epoch-bound group context.
    pub fn to_be_signed(&self, context: &GroupContext) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        context.serialize(&mut buf)?;
        serialize_opaque8(&self.group_id, &mut buf)?;
        buf.put_u64(self.epoch);
        self.sender.serialize(&mut buf)?;
        serialize_opaque32(&self.authenticated_data, &mut buf)?;
        self.content.serialize(&mut buf)?;
        Ok(buf.freeze())
    }

    pub fn sign(
        &mut self,
        suite: CipherSuite,
        context: &GroupContext,
        signer: &SignaturePrivateKey,
    ) -> Result<()> {
        let tbs = self.to_be_signed(context)?;
        self.signature = signer.sign(suite, &tbs)?;
        Ok(())
    }

    pub fn verify(
        &self,
        suite: CipherSuite,
        context: &GroupContext,
        public_key: &SignaturePublicKey,
    ) -> bool {
        let Ok(tbs) = self.to_be_signed(context) else {
            return false;
        };
        public_key.verify(suite, &tbs, &self.signature)
    }

    /// Input to the membership MAC: the signed content plus the signature
    /// and confirmation tag that accompany it.
    pub fn membership_tag_input(&self, context: &GroupContext) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        buf.put_slice(&self.to_be_signed(context)?);
        serialize_opaque16(&self.signature, &mut buf)?;
        serialize_optional(self.confirmation_tag.is_some(), &mut buf)?;
        if let Some(tag) = &self.confirmation_tag {
            serialize_opaque8(tag, &mut buf)?;
        }
        Ok(buf.freeze())
    }

    pub fn set_membership_tag(
        &mut self,
        suite: CipherSuite,
        context: &GroupContext,
        membership_key: &[u8],
    ) -> Result<()> {
        let input = self.membership_tag_input(context)?;
        self.membership_tag = Some(suite.sign_mac(membership_key, &input));
        Ok(())
    }

    /// A plaintext recovered from an authenticated ciphertext passes
    /// unconditionally; anything else must carry a correct tag.
    pub fn verify_membership_tag(
        &self,
        suite: CipherSuite,
        context: &GroupContext,
        membership_key: &[u8],
    ) -> bool {
        if self.decrypted {
            return true;
        }
        let Some(membership_tag) = &self.membership_tag else {
            return false;
        };
        let Ok(input) = self.membership_tag_input(context) else {
            return false;
        };
        suite.verify_mac(membership_key, &input, membership_tag)
    }

    /// The deterministic byte string a Commit contributes to the confirmed
    /// transcript hash.
    pub fn commit_content(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        serialize_opaque8(&self.group_id, &mut buf)?;
        buf.put_u64(self.epoch);
        self.sender.serialize(&mut buf)?;
        self.content.serialize(&mut buf)?;
        serialize_opaque16(&self.signature, &mut buf)?;
        Ok(buf.freeze())
    }

    /// The Commit's authentication data for the interim transcript hash.
    pub fn commit_auth_data(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        serialize_optional(self.confirmation_tag.is_some(), &mut buf)?;
        if let Some(tag) = &self.confirmation_tag {
            serialize_opaque8(tag, &mut buf)?;
        }
        Ok(buf.freeze())
    }
}

impl Deserializer for MLSPlaintext {
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
        let sender = Sender::deserialize(buf)?;
        let authenticated_data = deserialize_opaque32(buf)?;
        let content = Content::deserialize(buf)?;
        let signature = deserialize_opaque16(buf)?;
        let confirmation_tag = if deserialize_optional(buf)? {
            Some(deserialize_opaque8(buf)?)
        } else {
            None
        };
        let membership_tag = if deserialize_optional(buf)? {
            Some(deserialize_opaque8(buf)?)
        } else {
            None
        };

        Ok(Self {
            group_id,
            epoch,
            sender,
            authenticated_data,
            content,
            signature,
            confirmation_tag,
            membership_tag,
            decrypted: false,
        })
    }
}

impl Serializer for MLSPlaintext {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(&self.group_id, buf)?;
        buf.put_u64(self.epoch);
        self.sender.serialize(buf)?;
        serialize_opaque32(&self.authenticated_data, buf)?;
        self.content.serialize(buf)?;
        serialize_opaque16(&self.signature, buf)?;
        serialize_optional(self.confirmation_tag.is_some(), buf)?;
        if let Some(tag) = &self.confirmation_tag {
            serialize_opaque8(tag, buf)?;
        }
        serialize_optional(self.membership_tag.is_some(), buf)?;
        if let Some(tag) = &self.membership_tag {
            serialize_opaque8(tag, buf)?;
        }
        Ok(())
    }
}

/// The encrypted framing of a group message. Only the encoding lives here;
/// producing and consuming the ciphertext is the group state's job.
#[derive(Default, Debug, Clone, Eq, PartialEq)]
pub struct MLSCiphertext {
    pub group_id: GroupID,
    pub epoch: u64,
    pub content_type: ContentType,
    pub sender_data_nonce: Bytes,
    pub encrypted_sender_data: Bytes,
    pub authenticated_data: Bytes,
    pub ciphertext: Bytes,
}

impl Deserializer for MLSCiphertext {
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
        if !buf.has_remaining() {
            return Err(Error::BufferTooSmall);
        }
        let content_type: ContentType = buf.get_u8().try_into()?;
        let sender_data_nonce = deserialize_opaque8(buf)?;
        let encrypted_sender_data = deserialize_opaque8(buf)?;
        let authenticated_data = deserialize_opaque32(buf)?;
        let ciphertext = deserialize_opaque32(buf)?;

        Ok(Self {
            group_id,
            epoch,
            content_type,
            sender_data_nonce,
            encrypted_sender_data,
            authenticated_data,
            ciphertext,
        })
    }
}

impl Serializer for MLSCiphertext {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut,
    {
        serialize_opaque8(&self.group_id, buf)?;
        buf.put_u64(self.epoch);
        buf.put_u8(self.content_type as u8);
        serialize_opaque8(&self.sender_data_nonce, buf)?;
        serialize_opaque8(&self.encrypted_sender_data, buf)?;
        serialize_opaque32(&self.authenticated_data, buf)?;
        serialize_opaque32(&self.ciphertext, buf)
    }
}
