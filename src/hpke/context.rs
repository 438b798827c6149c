use bytes::Bytes;

use crate::crypto::secret::SecretBytes;
use crate::error::{Error, Result};
use crate::hpke::aead::Aead;
use crate::hpke::kdf::Kdf;

/// Keying state shared by the sender and receiver sides of one HPKE stream.
///
/// The sequence counter is owned exclusively by the context and only ever
/// moves forward; once it is exhausted the context is unusable for good.
#[derive(Debug, Clone)]
pub struct Context {
    pub(crate) suite_id: Bytes,
    pub(crate) key: SecretBytes,
    pub(crate) nonce_base: SecretBytes,
    pub(crate) exporter_secret: SecretBytes,
    pub(crate) seq: u64,
    pub(crate) kdf: Kdf,
    pub(crate) aead: Aead,
}

impl Context {
    pub(crate) fn current_nonce(&self) -> Bytes {
        let mut nonce = vec![0u8; self.aead.nonce_size()];
        let offset = nonce.len() - 8;
        nonce[offset..].copy_from_slice(&self.seq.to_be_bytes());
        for (b, base) in nonce.iter_mut().zip(self.nonce_base.as_ref()) {
            *b ^= base;
        }
        Bytes::from(nonce)
    }

    fn seal_next(&mut self, aad: &[u8], plaintext: &[u8]) -> Result<Bytes> {
        if self.seq == u64::MAX {
            return Err(Error::SequenceOverflow);
        }
        let nonce = self.current_nonce();
        let ciphertext = self.aead.seal(self.key.as_ref(), &nonce, aad, plaintext)?;
        self.seq += 1;
        Ok(ciphertext)
    }

    fn open_next(&mut self, aad: &[u8], ciphertext: &[u8]) -> Result<Option<Bytes>> {
        if self.seq == u64::MAX {
            return Err(Error::SequenceOverflow);
        }
        let nonce = self.current_nonce();
        let plaintext = self.aead.open(self.key.as_ref(), &nonce, aad, ciphertext)?;
        // A rejected ciphertext still consumes its slot in the nonce
        // sequence; rolling back would desynchronize the stream.
        self.seq += 1;
        Ok(plaintext)
    }

    /// Derive additional secrets bound to this context. Does not touch the
    /// sequence counter and may be called any number of times.
    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Bytes> {
        self.kdf.labeled_expand(
            &self.suite_id,
            self.exporter_secret.as_ref(),
            b"sec",
            exporter_context,
            length,
        )
    }
}

impl PartialEq for Context {
    fn eq(&self, other: &Self) -> bool {
        self.suite_id == other.suite_id
            && self.key == other.key
            && self.nonce_base == other.nonce_base
            && self.exporter_secret == other.exporter_secret
            && self.seq == other.seq
    }
}

impl Eq for Context {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SenderContext(pub(crate) Context);

impl SenderContext {
    pub fn seal(&mut self, aad: &[u8], plaintext: &[u8]) -> Result<Bytes> {
        self.0.seal_next(aad, plaintext)
    }

    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Bytes> {
        self.0.export(exporter_context, length)
    }
}

impl From<Context> for SenderContext {
    fn from(context: Context) -> Self {
        SenderContext(context)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiverContext(pub(crate) Context);

impl ReceiverContext {
    /// `None` means the ciphertext failed authentication. The sequence
    /// counter advances either way.
    pub fn open(&mut self, aad: &[u8], ciphertext: &[u8]) -> Result<Option<Bytes>> {
        self.0.open_next(aad, ciphertext)
    }

    pub fn export(&self, exporter_context: &[u8], length: usize) -> Result<Bytes> {
        self.0.export(exporter_context, length)
    }
}

impl From<Context> for ReceiverContext {
    fn from(context: Context) -> Self {
        ReceiverContext(context)
    }
}
