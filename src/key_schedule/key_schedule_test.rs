use bytes::Bytes;

use super::*;

fn test_suite() -> CipherSuite {
    CipherSuite::MLS10_128_DHKEMX25519_CHACHA20POLY1305_SHA256_Ed25519
}

#[test]
fn test_group_context_round_trip() -> Result<()> {
    let ctx = GroupContext {
        group_id: Bytes::from_static(b"group"),
        epoch: 42,
        tree_hash: Bytes::from_static(b"tree hash"),
        confirmed_transcript_hash: Bytes::from_static(b"transcript"),
        extensions: vec![Extension {
            ext_type: 2,
            data: Bytes::from_static(b"ext data"),
        }],
    };

    let raw = ctx.serialize_detached()?;
    let parsed = GroupContext::deserialize_exact(&raw)?;
    assert_eq!(parsed, ctx);
    assert_eq!(parsed.serialize_detached()?, raw);

    Ok(())
}

#[test]
fn test_epoch_secrets_are_distinct_and_deterministic() -> Result<()> {
    let suite = test_suite();
    let epoch_secret = SecretBytes::from(vec![0x42u8; suite.hash().size()]);

    let a = KeyScheduleEpoch::new(suite, epoch_secret.clone())?;
    let b = KeyScheduleEpoch::new(suite, epoch_secret)?;
    assert_eq!(a, b);

    // Every label carves out its own secret.
    let secrets = [
        &a.sender_data_secret,
        &a.handshake_secret,
        &a.application_secret,
        &a.exporter_secret,
        &a.confirmation_key,
        &a.init_secret,
        &a.membership_key,
        &a.resumption_secret,
    ];
    for (i, x) in secrets.iter().enumerate() {
        assert_eq!(x.len(), suite.hash().size());
        for y in secrets.iter().skip(i + 1) {
            assert_ne!(x, y);
        }
    }

    Ok(())
}

#[test]
fn test_next_epoch_rotates_all_secrets() -> Result<()> {
    let suite = test_suite();
    let epoch = KeyScheduleEpoch::new(suite, SecretBytes::from(vec![7u8; 32]))?;

    let ctx = GroupContext {
        group_id: Bytes::from_static(b"group"),
        epoch: 1,
        tree_hash: Bytes::from_static(b"tree"),
        confirmed_transcript_hash: Bytes::from_static(b"confirmed"),
        extensions: vec![],
    };
    let raw_ctx = ctx.serialize_detached()?;

    let next = epoch.next_epoch(b"commit secret", &raw_ctx)?;
    assert_ne!(next.epoch_secret, epoch.epoch_secret);
    assert_ne!(next.membership_key, epoch.membership_key);
    assert_ne!(next.init_secret, epoch.init_secret);

    // Same commit secret and context, same destination epoch.
    let again = epoch.next_epoch(b"commit secret", &raw_ctx)?;
    assert_eq!(next, again);

    // The transition binds the group context.
    let mut other_ctx = ctx;
    other_ctx.epoch = 2;
    let elsewhere = epoch.next_epoch(b"commit secret", &other_ctx.serialize_detached()?)?;
    assert_ne!(elsewhere.epoch_secret, next.epoch_secret);

    Ok(())
}

#[test]
fn test_transcript_hash_chaining() {
    let suite = test_suite();

    let confirmed = confirmed_transcript_hash(suite, b"interim before", b"commit content");
    assert_eq!(confirmed.len(), suite.hash().size());
    assert_eq!(
        confirmed,
        confirmed_transcript_hash(suite, b"interim before", b"commit content")
    );
    assert_ne!(
        confirmed,
        confirmed_transcript_hash(suite, b"interim before", b"other commit")
    );

    let interim = interim_transcript_hash(suite, &confirmed, b"auth data");
    assert_eq!(interim.len(), suite.hash().size());
    assert_ne!(interim, confirmed);
}
