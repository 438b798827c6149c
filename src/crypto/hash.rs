use bytes::Bytes;
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256, Sha384, Sha512};
use subtle::ConstantTimeEq;

#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum HashScheme {
    #[default]
    Sha256,
    Sha384,
    Sha512,
}

impl HashScheme {
    pub fn size(&self) -> usize {
        match self {
            HashScheme::Sha256 => 32,
            HashScheme::Sha384 => 48,
            HashScheme::Sha512 => 64,
        }
    }

    pub fn digest(&self, data: &[u8]) -> Bytes {
        match self {
            HashScheme::Sha256 => {
                let mut h = Sha256::new();
                h.update(data);
                Bytes::from(h.finalize().to_vec())
            }
            HashScheme::Sha384 => {
                let mut h = Sha384::new();
                h.update(data);
                Bytes::from(h.finalize().to_vec())
            }
            HashScheme::Sha512 => {
                let mut h = Sha512::new();
                h.update(data);
                Bytes::from(h.finalize().to_vec())
            }
        }
    }

    /// HMAC under this hash. All cipher suites use HMAC for their MAC.
    pub fn mac(&self, key: &[u8], message: &[u8]) -> Bytes {
        match self {
            HashScheme::Sha256 => {
                // A key of any length is acceptable to HMAC.
                let mut m = Hmac::<Sha256>::new_from_slice(key).expect("HMAC accepts any key size");
                m.update(message);
                Bytes::from(m.finalize().into_bytes().to_vec())
            }
            HashScheme::Sha384 => {
                let mut m = Hmac::<Sha384>::new_from_slice(key).expect("HMAC accepts any key size");
                m.update(message);
                Bytes::from(m.finalize().into_bytes().to_vec())
            }
            HashScheme::Sha512 => {
                let mut m = Hmac::<Sha512>::new_from_slice(key).expect("HMAC accepts any key size");
                m.update(message);
                Bytes::from(m.finalize().into_bytes().to_vec())
            }
        }
    }

    /// Recompute and compare a MAC without leaking the position of the first
    /// differing byte.
    pub fn verify_mac(&self, key: &[u8], message: &[u8], tag: &[u8]) -> bool {
        self.mac(key, message).as_ref().ct_eq(tag).into()
    }
}
