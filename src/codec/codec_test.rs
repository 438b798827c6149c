use bytes::{Buf, BytesMut};

use super::*;

#[test]
fn test_opaque_round_trip() -> Result<()> {
    let data = b"hello world".as_ref();

    let mut buf = BytesMut::new();
    serialize_opaque8(data, &mut buf)?;
    assert_eq!(buf[0], data.len() as u8);
    assert_eq!(deserialize_opaque8(&mut buf.freeze())?, data);

    let mut buf = BytesMut::new();
    serialize_opaque16(data, &mut buf)?;
    assert_eq!(&buf[..2], &[0, data.len() as u8]);
    assert_eq!(deserialize_opaque16(&mut buf.freeze())?, data);

    let mut buf = BytesMut::new();
    serialize_opaque32(data, &mut buf)?;
    assert_eq!(&buf[..4], &[0, 0, 0, data.len() as u8]);
    assert_eq!(deserialize_opaque32(&mut buf.freeze())?, data);

    Ok(())
}

#[test]
fn test_opaque_prefix_limit() {
    let data = vec![0u8; 256];
    let mut buf = BytesMut::new();
    assert!(matches!(
        serialize_opaque8(&data, &mut buf),
        Err(Error::OpaqueSizeExceedsPrefixLimit(1))
    ));

    let data = vec![0u8; 65536];
    let mut buf = BytesMut::new();
    assert!(matches!(
        serialize_opaque16(&data, &mut buf),
        Err(Error::OpaqueSizeExceedsPrefixLimit(2))
    ));
}

#[test]
fn test_opaque_truncated() {
    // Prefix promises more bytes than the buffer holds.
    let mut buf = [3u8, 1, 2].as_ref();
    assert!(matches!(
        deserialize_opaque8(&mut buf),
        Err(Error::BufferTooSmall)
    ));

    let mut buf = [0u8].as_ref();
    assert!(matches!(
        deserialize_opaque16(&mut buf),
        Err(Error::BufferTooSmall)
    ));

    let mut buf = [].as_ref();
    assert!(matches!(
        deserialize_opaque32(&mut buf),
        Err(Error::BufferTooSmall)
    ));
}

#[test]
fn test_optional() -> Result<()> {
    let mut buf = BytesMut::new();
    serialize_optional(true, &mut buf)?;
    serialize_optional(false, &mut buf)?;
    let mut buf = buf.freeze();
    assert!(deserialize_optional(&mut buf)?);
    assert!(!deserialize_optional(&mut buf)?);

    let mut buf = [2u8].as_ref();
    assert!(matches!(
        deserialize_optional(&mut buf),
        Err(Error::InvalidOptionalValue)
    ));

    Ok(())
}

#[test]
fn test_vector32_round_trip() -> Result<()> {
    let items: Vec<&[u8]> = vec![b"a", b"bc", b"def"];

    let mut buf = BytesMut::new();
    serialize_vector32(items.len(), &mut buf, |i, b| serialize_opaque8(items[i], b))?;

    let mut out = vec![];
    deserialize_vector32(&mut buf.freeze(), |b| {
        out.push(deserialize_opaque8(b)?);
        Ok(())
    })?;

    assert_eq!(out.len(), items.len());
    for (got, want) in out.iter().zip(items.iter()) {
        assert_eq!(got.as_ref(), *want);
    }

    Ok(())
}

#[test]
fn test_deserialize_exact_rejects_excess() {
    struct Octet(u8);

    impl Deserializer for Octet {
        fn deserialize<B: Buf>(buf: &mut B) -> Result<Self> {
            if !buf.has_remaining() {
                return Err(Error::BufferTooSmall);
            }
            Ok(Octet(buf.get_u8()))
        }
    }

    assert!(matches!(
        Octet::deserialize_exact(&[1, 2]),
        Err(Error::InputContainsExcessBytes(1))
    ));
    assert!(Octet::deserialize_exact(&[7]).is_ok());
}
