use super::*;

fn suites() -> Vec<Hpke> {
    vec![
        Hpke::new(
            KemId::DHKEM_X25519_SHA256,
            KdfId::HKDF_SHA256,
            AeadId::CHACHA20_POLY1305,
        )
        .unwrap(),
        Hpke::new(
            KemId::DHKEM_P256_SHA256,
            KdfId::HKDF_SHA256,
            AeadId::AES_128_GCM,
        )
        .unwrap(),
        Hpke::new(
            KemId::DHKEM_P384_SHA384,
            KdfId::HKDF_SHA384,
            AeadId::AES_256_GCM,
        )
        .unwrap(),
    ]
}

#[test]
fn test_hkdf_sha256_rfc5869_case1() -> Result<()> {
    let kdf = Kdf::new(KdfId::HKDF_SHA256);
    let ikm = hex::decode("0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b").unwrap();
    let salt = hex::decode("000102030405060708090a0b0c").unwrap();
    let info = hex::decode("f0f1f2f3f4f5f6f7f8f9").unwrap();

    let prk = kdf.extract(&salt, &ikm)?;
    assert_eq!(
        prk.as_ref(),
        &hex::decode("077709362c2e32df0ddc3f0dc47bba6390b6c73bb50f9c3122ec844ad7c2b3e5")
            .unwrap()[..]
    );

    let okm = kdf.expand(&prk, &info, 42)?;
    assert_eq!(
        okm.as_ref(),
        &hex::decode(
            "3cb25f25faacd57a90434f64d0362f2a2d2d0a90cf1a5a4c5db02d56ecc4c5bf34007208d5b887185865"
        )
        .unwrap()[..]
    );

    Ok(())
}

#[test]
fn test_suite_id_layout() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::CHACHA20_POLY1305,
    )?;
    assert_eq!(hpke.suite_id(), b"HPKE\x00\x20\x00\x01\x00\x03".as_ref());
    Ok(())
}

#[test]
fn test_unsupported_kems() {
    assert!(matches!(
        Kem::new(KemId::DHKEM_X448_SHA512),
        Err(Error::UnsupportedKem(0x0021))
    ));
    assert!(matches!(
        Kem::new(KemId::DHKEM_P521_SHA512),
        Err(Error::UnsupportedKem(0x0012))
    ));
}

#[test]
fn test_kem_encap_decap() -> Result<()> {
    for kem_id in [KemId::DHKEM_X25519_SHA256, KemId::DHKEM_P256_SHA256] {
        let kem = Kem::new(kem_id)?;
        let (sk_r, pk_r) = kem.generate_key_pair()?;

        let (shared_secret, enc) = kem.encap(&pk_r)?;
        assert_eq!(shared_secret.len(), kem.secret_size());

        let recovered = kem.decap(&enc, &sk_r)?;
        assert_eq!(shared_secret, recovered);
    }
    Ok(())
}

#[test]
fn test_kem_auth_encap_decap() -> Result<()> {
    let kem = Kem::new(KemId::DHKEM_X25519_SHA256)?;
    let (sk_r, pk_r) = kem.generate_key_pair()?;
    let (sk_s, pk_s) = kem.generate_key_pair()?;

    let (shared_secret, enc) = kem.auth_encap(&pk_r, &sk_s)?;
    let recovered = kem.auth_decap(&enc, &pk_s, &sk_r)?;
    assert_eq!(shared_secret, recovered);

    // A different claimed sender key yields a different shared secret.
    let (_, pk_mallory) = kem.generate_key_pair()?;
    let mismatched = kem.auth_decap(&enc, &pk_mallory, &sk_r)?;
    assert_ne!(shared_secret, mismatched);

    Ok(())
}

#[test]
fn test_kem_derive_key_pair_is_deterministic() -> Result<()> {
    for kem_id in [KemId::DHKEM_X25519_SHA256, KemId::DHKEM_P256_SHA256] {
        let kem = Kem::new(kem_id)?;
        let (_, pk_a) = kem.derive_key_pair(b"some fixed input keying material")?;
        let (_, pk_b) = kem.derive_key_pair(b"some fixed input keying material")?;
        let (_, pk_c) = kem.derive_key_pair(b"a different input")?;
        assert_eq!(kem.serialize_public(&pk_a), kem.serialize_public(&pk_b));
        assert_ne!(kem.serialize_public(&pk_a), kem.serialize_public(&pk_c));
    }
    Ok(())
}

#[test]
fn test_kem_public_key_round_trip() -> Result<()> {
    for kem_id in [
        KemId::DHKEM_X25519_SHA256,
        KemId::DHKEM_P256_SHA256,
        KemId::DHKEM_P384_SHA384,
    ] {
        let kem = Kem::new(kem_id)?;
        let (_, pk) = kem.generate_key_pair()?;
        let raw = kem.serialize_public(&pk);
        assert_eq!(kem.deserialize_public(&raw)?, pk);
    }
    Ok(())
}

#[test]
fn test_base_round_trip() -> Result<()> {
    for hpke in suites() {
        let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

        let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"abc")?;
        let mut receiver = hpke.setup_base_r(&enc, &sk_r, b"abc")?;

        let ct = sender.seal(b"aad", b"hello")?;
        let pt = receiver.open(b"aad", &ct)?;
        assert_eq!(pt.as_deref(), Some(b"hello".as_ref()));
    }
    Ok(())
}

#[test]
fn test_psk_round_trip() -> Result<()> {
    for hpke in suites() {
        let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

        let (enc, mut sender) = hpke.setup_psk_s(&pk_r, b"info", b"a very secret psk", b"psk-id")?;
        let mut receiver = hpke.setup_psk_r(&enc, &sk_r, b"info", b"a very secret psk", b"psk-id")?;

        let ct = sender.seal(b"", b"pre-shared")?;
        assert_eq!(
            receiver.open(b"", &ct)?.as_deref(),
            Some(b"pre-shared".as_ref())
        );
    }
    Ok(())
}

#[test]
fn test_auth_round_trip() -> Result<()> {
    for hpke in suites() {
        let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;
        let (sk_s, pk_s) = hpke.kem().generate_key_pair()?;

        let (enc, mut sender) = hpke.setup_auth_s(&pk_r, b"info", &sk_s)?;
        let mut receiver = hpke.setup_auth_r(&enc, &sk_r, b"info", &pk_s)?;

        let ct = sender.seal(b"aad", b"authenticated")?;
        assert_eq!(
            receiver.open(b"aad", &ct)?.as_deref(),
            Some(b"authenticated".as_ref())
        );
    }
    Ok(())
}

#[test]
fn test_auth_psk_round_trip() -> Result<()> {
    for hpke in suites() {
        let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;
        let (sk_s, pk_s) = hpke.kem().generate_key_pair()?;

        let (enc, mut sender) = hpke.setup_auth_psk_s(&pk_r, b"", b"psk", b"psk-id", &sk_s)?;
        let mut receiver = hpke.setup_auth_psk_r(&enc, &sk_r, b"", b"psk", b"psk-id", &pk_s)?;

        let ct = sender.seal(b"", b"both")?;
        assert_eq!(receiver.open(b"", &ct)?.as_deref(), Some(b"both".as_ref()));
    }
    Ok(())
}

// Two seals under the same context must differ, and the second nonce is the
// base with the counter value 1 folded into its trailing byte.
#[test]
fn test_seal_nonce_progression() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::CHACHA20_POLY1305,
    )?;
    let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

    let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"abc")?;

    let nonce0 = sender.0.current_nonce();
    assert_eq!(nonce0.as_ref(), sender.0.nonce_base.as_ref());
    let ct1 = sender.seal(b"aad", b"hello")?;

    let nonce1 = sender.0.current_nonce();
    let mut expected = sender.0.nonce_base.as_ref().to_vec();
    *expected.last_mut().unwrap() ^= 0x01;
    assert_eq!(nonce1, expected);

    let ct2 = sender.seal(b"aad", b"hello")?;
    assert_ne!(ct1, ct2);

    let mut receiver = hpke.setup_base_r(&enc, &sk_r, b"abc")?;
    assert_eq!(receiver.open(b"aad", &ct1)?.as_deref(), Some(b"hello".as_ref()));
    assert_eq!(receiver.open(b"aad", &ct2)?.as_deref(), Some(b"hello".as_ref()));

    Ok(())
}

#[test]
fn test_nonce_sequence_xor() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::AES_128_GCM,
    )?;
    let (_, pk_r) = hpke.kem().generate_key_pair()?;
    let (_, mut sender) = hpke.setup_base_s(&pk_r, b"")?;

    for n in 0u64..5 {
        let mut expected = vec![0u8; 12];
        expected[4..].copy_from_slice(&n.to_be_bytes());
        for (b, base) in expected.iter_mut().zip(sender.0.nonce_base.as_ref()) {
            *b ^= base;
        }
        assert_eq!(sender.0.current_nonce(), expected);
        sender.seal(b"", b"x")?;
    }

    Ok(())
}

#[test]
fn test_sequence_overflow_is_fatal() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::CHACHA20_POLY1305,
    )?;
    let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

    let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"")?;
    sender.0.seq = u64::MAX;
    assert!(matches!(
        sender.seal(b"", b"pt"),
        Err(Error::SequenceOverflow)
    ));
    // Still unusable afterwards.
    assert!(matches!(
        sender.seal(b"", b"pt"),
        Err(Error::SequenceOverflow)
    ));

    let mut receiver = hpke.setup_base_r(&enc, &sk_r, b"")?;
    receiver.0.seq = u64::MAX;
    assert!(matches!(
        receiver.open(b"", b"ct"),
        Err(Error::SequenceOverflow)
    ));

    Ok(())
}

#[test]
fn test_open_failure_advances_sequence() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::CHACHA20_POLY1305,
    )?;
    let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

    let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"")?;
    let mut receiver = hpke.setup_base_r(&enc, &sk_r, b"")?;

    let ct0 = sender.seal(b"", b"zero")?;
    let ct1 = sender.seal(b"", b"one")?;

    // Feed garbage first: authentication fails but the slot is consumed,
    // so ct0 can no longer be opened while ct1 lines up.
    assert_eq!(receiver.open(b"", b"garbage")?, None);
    assert_eq!(receiver.0.seq, 1);
    assert_eq!(receiver.open(b"", &ct1)?.as_deref(), Some(b"one".as_ref()));
    let _ = ct0;

    Ok(())
}

#[test]
fn test_exporter_determinism() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::CHACHA20_POLY1305,
    )?;
    let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

    let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"abc")?;
    let receiver = hpke.setup_base_r(&enc, &sk_r, b"abc")?;

    let sender_export = sender.export(b"", 32)?;
    let receiver_export = receiver.export(b"", 32)?;
    assert_eq!(sender_export.len(), 32);
    assert_eq!(sender_export, receiver_export);

    // Exporting never consumes sequence numbers.
    assert_eq!(sender.0.seq, 0);
    sender.seal(b"", b"pt")?;
    assert_eq!(sender.export(b"", 32)?, receiver_export);

    assert_ne!(sender.export(b"other", 32)?, receiver_export);
    assert_eq!(sender.export(b"", 64)?.len(), 64);

    Ok(())
}

#[test]
fn test_context_equality_ignores_counter_only_after_use() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_P256_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::AES_128_GCM,
    )?;
    let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;

    let (enc, mut sender) = hpke.setup_base_s(&pk_r, b"ctx")?;
    let receiver = hpke.setup_base_r(&enc, &sk_r, b"ctx")?;

    // Fresh contexts derived from the same inputs are equal.
    assert_eq!(sender.0, receiver.0);

    // Sealing moves the counter, which is part of context identity.
    sender.seal(b"", b"pt")?;
    assert_ne!(sender.0, receiver.0);

    Ok(())
}

#[test]
fn test_psk_input_gating() {
    let cases = [
        // (mode, psk, psk_id, accepted)
        (Mode::Base, &b""[..], &b""[..], true),
        (Mode::Base, b"psk", b"", false),
        (Mode::Base, b"", b"id", false),
        (Mode::Base, b"psk", b"id", false),
        (Mode::Psk, b"", b"", false),
        (Mode::Psk, b"psk", b"", false),
        (Mode::Psk, b"", b"id", false),
        (Mode::Psk, b"psk", b"id", true),
        (Mode::Auth, b"", b"", true),
        (Mode::Auth, b"psk", b"id", false),
        (Mode::AuthPsk, b"", b"", false),
        (Mode::AuthPsk, b"psk", b"id", true),
    ];

    for (mode, psk, psk_id, accepted) in cases {
        assert_eq!(
            Hpke::verify_psk_inputs(mode, psk, psk_id),
            accepted,
            "mode {mode:?} psk {} psk_id {}",
            psk.len(),
            psk_id.len(),
        );
    }
}

// Mode psk with a psk but an empty psk_id must be rejected before any key
// derivation happens.
#[test]
fn test_invalid_psk_inputs_surface_from_setup() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_P256_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::AES_128_GCM,
    )?;
    let (_, pk_r) = hpke.kem().generate_key_pair()?;

    assert!(matches!(
        hpke.setup_psk_s(&pk_r, b"", b"non-empty psk", b""),
        Err(Error::InvalidPskInputs)
    ));

    Ok(())
}

// A receiver set up with the wrong claimed sender key still constructs, but
// everything it opens is rejected.
#[test]
fn test_auth_mode_wrong_sender_key() -> Result<()> {
    let hpke = Hpke::new(
        KemId::DHKEM_X25519_SHA256,
        KdfId::HKDF_SHA256,
        AeadId::CHACHA20_POLY1305,
    )?;
    let (sk_r, pk_r) = hpke.kem().generate_key_pair()?;
    let (sk_s, _) = hpke.kem().generate_key_pair()?;
    let (_, pk_wrong) = hpke.kem().generate_key_pair()?;

    let (enc, mut sender) = hpke.setup_auth_s(&pk_r, b"info", &sk_s)?;
    let ct = sender.seal(b"aad", b"secret")?;

    let mut receiver = hpke.setup_auth_r(&enc, &sk_r, b"info", &pk_wrong)?;
    assert_eq!(receiver.open(b"aad", &ct)?, None);

    Ok(())
}
