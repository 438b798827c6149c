//! HPKE (draft-irtf-cfrg-hpke-05): a KEM, a KDF, and an AEAD composed into
//! per-recipient encryption contexts.

pub mod aead;
pub mod context;
pub mod kdf;
pub mod kem;

#[cfg(test)]
mod hpke_test;

pub use aead::{Aead, AeadId};
pub use context::{Context, ReceiverContext, SenderContext};
pub use kdf::{Kdf, KdfId};
pub use kem::{Kem, KemId, KemPrivateKey, KemPublicKey};

use bytes::{BufMut, Bytes, BytesMut};

use crate::crypto::secret::SecretBytes;
use crate::error::{Error, Result};

/// Version prefix baked into every labeled KDF input. The trailing space is
/// part of the label; the draft number is part of the wire format.
pub(crate) const HPKE_VERSION_LABEL: &[u8] = b"HPKE-05 ";

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum Mode {
    #[default]
    Base = 0x00,
    Psk = 0x01,
    Auth = 0x02,
    AuthPsk = 0x03,
}

/// An HPKE cipher suite: algorithm selection happens once here, and the
/// setup calls below run monomorphic from then on.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Hpke {
    suite_id: Bytes,
    kem: Kem,
    kdf: Kdf,
    aead: Aead,
}

impl Hpke {
    pub fn new(kem_id: KemId, kdf_id: KdfId, aead_id: AeadId) -> Result<Self> {
        let kem = Kem::new(kem_id)?;

        let mut suite_id = BytesMut::new();
        suite_id.put_slice(b"HPKE");
        suite_id.put_u16(kem_id as u16);
        suite_id.put_u16(kdf_id as u16);
        suite_id.put_u16(aead_id as u16);

        Ok(Hpke {
            suite_id: suite_id.freeze(),
            kem,
            kdf: Kdf::new(kdf_id),
            aead: Aead::new(aead_id),
        })
    }

    pub fn suite_id(&self) -> &[u8] {
        &self.suite_id
    }

    pub fn kem(&self) -> &Kem {
        &self.kem
    }

    pub fn kdf(&self) -> &Kdf {
        &self.kdf
    }

    pub fn aead(&self) -> &Aead {
        &self.aead
    }

    pub fn setup_base_s(
        &self,
        pk_r: &KemPublicKey,
        info: &[u8],
    ) -> Result<(Bytes, SenderContext)> {
        let (shared_secret, enc) = self.kem.encap(pk_r)?;
        let ctx = self.key_schedule(Mode::Base, &shared_secret, info, &[], &[])?;
        Ok((enc, SenderContext::from(ctx)))
    }

    pub fn setup_base_r(
        &self,
        enc: &[u8],
        sk_r: &KemPrivateKey,
        info: &[u8],
    ) -> Result<ReceiverContext> {
        let shared_secret = self.kem.decap(enc, sk_r)?;
        let ctx = self.key_schedule(Mode::Base, &shared_secret, info, &[], &[])?;
        Ok(ReceiverContext::from(ctx))
    }

    pub fn setup_psk_s(
        &self,
        pk_r: &KemPublicKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<(Bytes, SenderContext)> {
        let (shared_secret, enc) = self.kem.encap(pk_r)?;
        let ctx = self.key_schedule(Mode::Psk, &shared_secret, info, psk, psk_id)?;
        Ok((enc, SenderContext::from(ctx)))
    }

    pub fn setup_psk_r(
        &self,
        enc: &[u8],
        sk_r: &KemPrivateKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<ReceiverContext> {
        let shared_secret = self.kem.decap(enc, sk_r)?;
        let ctx = self.key_schedule(Mode::Psk, &shared_secret, info, psk, psk_id)?;
        Ok(ReceiverContext::from(ctx))
    }

    pub fn setup_auth_s(
        &self,
        pk_r: &KemPublicKey,
        info: &[u8],
        sk_s: &KemPrivateKey,
    ) -> Result<(Bytes, SenderContext)> {
        let (shared_secret, enc) = self.kem.auth_encap(pk_r, sk_s)?;
        let ctx = self.key_schedule(Mode::Auth, &shared_secret, info, &[], &[])?;
        Ok((enc, SenderContext::from(ctx)))
    }

    pub fn setup_auth_r(
        &self,
        enc: &[u8],
        sk_r: &KemPrivateKey,
        info: &[u8],
        pk_s: &KemPublicKey,
    ) -> Result<ReceiverContext> {
        let shared_secret = self.kem.auth_decap(enc, pk_s, sk_r)?;
        let ctx = self.key_schedule(Mode::Auth, &shared_secret, info, &[], &[])?;
        Ok(ReceiverContext::from(ctx))
    }

    pub fn setup_auth_psk_s(
        &self,
        pk_r: &KemPublicKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        sk_s: &KemPrivateKey,
    ) -> Result<(Bytes, SenderContext)> {
        let (shared_secret, enc) = self.kem.auth_encap(pk_r, sk_s)?;
        let ctx = self.key_schedule(Mode::AuthPsk, &shared_secret, info, psk, psk_id)?;
        Ok((enc, SenderContext::from(ctx)))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn setup_auth_psk_r(
        &self,
        enc: &[u8],
        sk_r: &KemPrivateKey,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
        pk_s: &KemPublicKey,
    ) -> Result<ReceiverContext> {
        let shared_secret = self.kem.auth_decap(enc, pk_s, sk_r)?;
        let ctx = self.key_schedule(Mode::AuthPsk, &shared_secret, info, psk, psk_id)?;
        Ok(ReceiverContext::from(ctx))
    }

    /// A PSK and its id travel together: both absent for the base and auth
    /// modes, both present for the psk modes.
    pub fn verify_psk_inputs(mode: Mode, psk: &[u8], psk_id: &[u8]) -> bool {
        let got_psk = !psk.is_empty();
        let got_psk_id = !psk_id.is_empty();
        if got_psk != got_psk_id {
            return false;
        }

        (!got_psk && (mode == Mode::Base || mode == Mode::Auth))
            || (got_psk && (mode == Mode::Psk || mode == Mode::AuthPsk))
    }

    fn key_schedule(
        &self,
        mode: Mode,
        shared_secret: &SecretBytes,
        info: &[u8],
        psk: &[u8],
        psk_id: &[u8],
    ) -> Result<Context> {
        if !Self::verify_psk_inputs(mode, psk, psk_id) {
            return Err(Error::InvalidPskInputs);
        }

        let psk_id_hash = self
            .kdf
            .labeled_extract(&self.suite_id, &[], b"psk_id_hash", psk_id)?;
        let info_hash = self
            .kdf
            .labeled_extract(&self.suite_id, &[], b"info_hash", info)?;

        let mut ks_context = BytesMut::new();
        ks_context.put_u8(mode as u8);
        ks_context.put_slice(&psk_id_hash);
        ks_context.put_slice(&info_hash);
        let ks_context = ks_context.freeze();

        let psk_hash = self
            .kdf
            .labeled_extract(&self.suite_id, &[], b"psk_hash", psk)?;
        let secret =
            self.kdf
                .labeled_extract(&self.suite_id, &psk_hash, b"secret", shared_secret.as_ref())?;

        let key = self.kdf.labeled_expand(
            &self.suite_id,
            &secret,
            b"key",
            &ks_context,
            self.aead.key_size(),
        )?;
        let nonce_base = self.kdf.labeled_expand(
            &self.suite_id,
            &secret,
            b"nonce",
            &ks_context,
            self.aead.nonce_size(),
        )?;
        let exporter_secret = self.kdf.labeled_expand(
            &self.suite_id,
            &secret,
            b"exp",
            &ks_context,
            self.kdf.hash_size(),
        )?;

        Ok(Context {
            suite_id: self.suite_id.clone(),
            key: SecretBytes::from(key),
            nonce_base: SecretBytes::from(nonce_base),
            exporter_secret: SecretBytes::from(exporter_secret),
            seq: 0,
            kdf: self.kdf,
            aead: self.aead,
        })
    }
}
