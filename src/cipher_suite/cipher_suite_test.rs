use super::*;

#[test]
fn test_registry_values() -> Result<()> {
    for v in 1u16..=7 {
        let suite: CipherSuite = v.try_into()?;
        assert_eq!(suite as u16, v);
    }
    assert!(matches!(
        CipherSuite::try_from(0x0008),
        Err(Error::InvalidCipherSuiteValue(0x0008))
    ));
    Ok(())
}

#[test]
fn test_unsupported_suites() {
    for suite in [
        CipherSuite::MLS10_256_DHKEMX448_AES256GCM_SHA512_Ed448,
        CipherSuite::MLS10_256_DHKEMP521_AES256GCM_SHA512_P521,
        CipherSuite::MLS10_256_DHKEMX448_CHACHA20POLY1305_SHA512_Ed448,
    ] {
        assert!(suite.hpke().is_err());
        assert!(suite.signature_scheme().is_err());
    }
}

#[test]
fn test_expand_with_label() -> Result<()> {
    let suite = CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519;
    let secret = [0x42u8; 32];

    let a = suite.expand_with_label(&secret, b"test", b"context", 32)?;
    let b = suite.expand_with_label(&secret, b"test", b"context", 32)?;
    assert_eq!(a, b);
    assert_eq!(a.len(), 32);

    // Label and context are both bound into the derivation.
    assert_ne!(suite.expand_with_label(&secret, b"test2", b"context", 32)?, a);
    assert_ne!(suite.expand_with_label(&secret, b"test", b"context2", 32)?, a);

    assert_eq!(suite.expand_with_label(&secret, b"test", b"", 16)?.len(), 16);

    Ok(())
}

#[test]
fn test_derive_secret_length_matches_hash() -> Result<()> {
    let secret = [0x17u8; 64];
    let cases = [
        (CipherSuite::MLS10_128_DHKEMX25519_AES128GCM_SHA256_Ed25519, 32),
        (CipherSuite::MLS10_256_DHKEMP384_AES256GCM_SHA384_P384, 48),
    ];
    for (suite, size) in cases {
        assert_eq!(suite.derive_secret(&secret, b"init")?.len(), size);
    }
    Ok(())
}

#[test]
fn test_mac_round_trip() {
    let suite = CipherSuite::MLS10_128_DHKEMP256_AES128GCM_SHA256_P256;
    let tag = suite.sign_mac(b"key", b"message");
    assert!(suite.verify_mac(b"key", b"message", &tag));
    assert!(!suite.verify_mac(b"key", b"message!", &tag));
    assert!(!suite.verify_mac(b"yek", b"message", &tag));
}
