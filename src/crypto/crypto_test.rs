use bytes::Bytes;

use crate::cipher_suite::CipherSuite;
use crate::codec::{Deserializer, Serializer};
use crate::crypto::credential::{BasicCredential, Credential};
use crate::crypto::hash::HashScheme;
use crate::crypto::secret::SecretBytes;
use crate::crypto::signature::{SignaturePrivateKey, SignatureScheme};
use crate::error::Result;

#[test]
fn test_hmac_sha256_rfc4231_case1() {
    let key = [0x0bu8; 20];
    let tag = HashScheme::Sha256.mac(&key, b"Hi There");
    let want = hex::decode("b0344c61d8db38535ca8afceaf0bf12b881dc200c9833da726e9376c2e32cff7")
        .unwrap();
    assert_eq!(tag.as_ref(), &want[..]);
    assert!(HashScheme::Sha256.verify_mac(&key, b"Hi There", &tag));
    assert!(!HashScheme::Sha256.verify_mac(&key, b"Hi There!", &tag));
}

#[test]
fn test_hash_sizes() {
    assert_eq!(HashScheme::Sha256.digest(b"abc").len(), 32);
    assert_eq!(HashScheme::Sha384.digest(b"abc").len(), 48);
    assert_eq!(HashScheme::Sha512.digest(b"abc").len(), 64);
}

#[test]
fn test_secret_bytes_equality() {
    let a = SecretBytes::from(b"secret".as_ref());
    let b = SecretBytes::from(b"secret".as_ref());
    let c = SecretBytes::from(b"secreT".as_ref());
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(format!("{a:?}"), "SecretBytes(6 bytes)");
}

#[test]
fn test_sign_verify_round_trip() -> Result<()> {
    let cases = [
        (
            CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519,
            SignatureScheme::Ed25519,
        ),
        (
            CipherSuite::MLS10_128_DHKEMP256_AES128GCM_SHA256_P256,
            SignatureScheme::ECDSA_P256_SHA256,
        ),
        (
            CipherSuite::MLS10_256_DHKEMP384_AES256GCM_SHA384_P384,
            SignatureScheme::ECDSA_P384_SHA384,
        ),
    ];

    for (suite, scheme) in cases {
        let priv_key = SignaturePrivateKey::generate(scheme)?;
        let message = b"the quick brown fox";
        let signature = priv_key.sign(suite, message)?;

        assert!(priv_key.public_key().verify(suite, message, &signature));

        // Any bit flip in the message or signature must fail verification.
        let mut bad_message = message.to_vec();
        bad_message[3] ^= 0x01;
        assert!(!priv_key.public_key().verify(suite, &bad_message, &signature));

        let mut bad_signature = signature.to_vec();
        bad_signature[2] ^= 0x80;
        assert!(!priv_key.public_key().verify(suite, message, &bad_signature));
    }

    Ok(())
}

#[test]
fn test_ed25519_from_bytes_is_deterministic() -> Result<()> {
    let suite = CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519;
    let seed = [7u8; 32];
    let a = SignaturePrivateKey::from_bytes(SignatureScheme::Ed25519, &seed)?;
    let b = SignaturePrivateKey::from_bytes(SignatureScheme::Ed25519, &seed)?;
    assert_eq!(a.public_key(), b.public_key());
    assert_eq!(a.sign(suite, b"msg")?, b.sign(suite, b"msg")?);
    Ok(())
}

#[test]
fn test_credential_round_trip() -> Result<()> {
    let priv_key = SignaturePrivateKey::generate(SignatureScheme::Ed25519)?;
    let cred = Credential::Basic(BasicCredential::new(
        Bytes::from_static(b"alice"),
        priv_key.public_key().clone(),
    ));

    let raw = cred.serialize_detached()?;
    let parsed = Credential::deserialize_exact(&raw)?;
    assert_eq!(parsed, cred);
    assert_eq!(parsed.serialize_detached()?, raw);

    Ok(())
}
