use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    // codec
    #[error("buffer too small")]
    BufferTooSmall,
    #[error("input contains {0} excess bytes")]
    InputContainsExcessBytes(usize),
    #[error("opaque size exceeds maximum value for a {0}-byte length prefix")]
    OpaqueSizeExceedsPrefixLimit(usize),
    #[error("invalid optional value")]
    InvalidOptionalValue,
    #[error("invalid protocol version value {0}")]
    InvalidProtocolVersionValue(u8),
    #[error("invalid cipher suite value {0}")]
    InvalidCipherSuiteValue(u16),
    #[error("invalid content type value {0}")]
    InvalidContentTypeValue(u8),
    #[error("invalid sender type value {0}")]
    InvalidSenderTypeValue(u8),
    #[error("invalid proposal type value {0}")]
    InvalidProposalTypeValue(u8),
    #[error("invalid credential type value {0}")]
    InvalidCredentialTypeValue(u8),
    #[error("invalid signature scheme value {0}")]
    InvalidSignatureSchemeValue(u16),
    #[error("invalid KEM id value {0}")]
    InvalidKemIdValue(u16),
    #[error("invalid KDF id value {0}")]
    InvalidKdfIdValue(u16),
    #[error("invalid AEAD id value {0}")]
    InvalidAeadIdValue(u16),

    // unsupported algorithms
    #[error("unsupported KEM algorithm {0:#06x}")]
    UnsupportedKem(u16),
    #[error("unsupported cipher suite")]
    UnsupportedCipherSuite,
    #[error("unsupported signature scheme")]
    UnsupportedSignatureScheme,

    // parameter validation
    #[error("invalid PSK inputs")]
    InvalidPskInputs,
    #[error("cannot sign from a blank leaf")]
    SignerLeafBlank,
    #[error("signing key does not match leaf credential")]
    SignerKeyMismatch,
    #[error("invalid key material: {0}")]
    InvalidKeyMaterial(String),
    #[error("key pair derivation failed")]
    DeriveKeyPairFailed,

    // protocol
    #[error("sequence number overflow")]
    SequenceOverflow,
    #[error("welcome decryption failed")]
    WelcomeDecryptionFailed,
    #[error("no encrypted group secrets for the provided key package")]
    GroupSecretsNotFound,

    #[error("RustCrypto error {0}")]
    RustCryptoError(String),
}
