pub mod credential;
pub mod hash;
pub mod secret;
pub mod signature;

#[cfg(test)]
mod crypto_test;

pub use credential::{BasicCredential, Credential};
pub use hash::HashScheme;
pub use secret::SecretBytes;
pub use signature::{SignaturePrivateKey, SignaturePublicKey, SignatureScheme};
