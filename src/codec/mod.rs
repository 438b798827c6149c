#[cfg(test)]
mod codec_test;

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{Error, Result};

// Length-prefixed byte strings. The prefix width is a property of the
// field's declared type, so each width gets its own pair of functions.

pub fn serialize_opaque8<B: BufMut>(v: &[u8], buf: &mut B) -> Result<()> {
    if v.len() > u8::MAX as usize {
        return Err(Error::OpaqueSizeExceedsPrefixLimit(1));
    }
    buf.put_u8(v.len() as u8);
    buf.put(v);
    Ok(())
}

pub fn deserialize_opaque8<B: Buf>(buf: &mut B) -> Result<Bytes> {
    if !buf.has_remaining() {
        return Err(Error::BufferTooSmall);
    }
    let n = buf.get_u8() as usize;
    if buf.remaining() < n {
        return Err(Error::BufferTooSmall);
    }
    Ok(buf.copy_to_bytes(n))
}

pub fn serialize_opaque16<B: BufMut>(v: &[u8], buf: &mut B) -> Result<()> {
    if v.len() > u16::MAX as usize {
        return Err(Error::OpaqueSizeExceedsPrefixLimit(2));
    }
    buf.put_u16(v.len() as u16);
    buf.put(v);
    Ok(())
}

pub fn deserialize_opaque16<B: Buf>(buf: &mut B) -> Result<Bytes> {
    if buf.remaining() < 2 {
        return Err(Error::BufferTooSmall);
    }
    let n = buf.get_u16() as usize;
    if buf.remaining() < n {
        return Err(Error::BufferTooSmall);
    }
    Ok(buf.copy_to_bytes(n))
}

pub fn serialize_opaque32<B: BufMut>(v: &[u8], buf: &mut B) -> Result<()> {
    if v.len() > u32::MAX as usize {
        return Err(Error::OpaqueSizeExceedsPrefixLimit(4));
    }
    buf.put_u32(v.len() as u32);
    buf.put(v);
    Ok(())
}

pub fn deserialize_opaque32<B: Buf>(buf: &mut B) -> Result<Bytes> {
    if buf.remaining() < 4 {
        return Err(Error::BufferTooSmall);
    }
    let n = buf.get_u32() as usize;
    if buf.remaining() < n {
        return Err(Error::BufferTooSmall);
    }
    Ok(buf.copy_to_bytes(n))
}

// Composite vectors carry a 4-byte prefix holding the byte length of the
// encoded contents, not the element count.

pub fn serialize_vector32<B: BufMut>(
    n: usize,
    buf: &mut B,
    mut f: impl FnMut(usize, &mut BytesMut) -> Result<()>,
) -> Result<()> {
    // The total size is unknown until the elements are encoded, so the
    // contents go through a temporary buffer.
    let mut child = BytesMut::new();
    for i in 0..n {
        f(i, &mut child)?;
    }
    serialize_opaque32(&child.freeze(), buf)
}

pub fn deserialize_vector32<B: Buf>(
    buf: &mut B,
    mut f: impl FnMut(&mut Bytes) -> Result<()>,
) -> Result<()> {
    let mut v = deserialize_opaque32(buf)?;
    let ss = &mut v;
    while ss.has_remaining() {
        f(ss)?;
    }
    Ok(())
}

pub fn serialize_optional<B: BufMut>(present: bool, buf: &mut B) -> Result<()> {
    buf.put_u8(u8::from(present));
    Ok(())
}

pub fn deserialize_optional<B: Buf>(buf: &mut B) -> Result<bool> {
    if !buf.has_remaining() {
        return Err(Error::BufferTooSmall);
    }
    match buf.get_u8() {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(Error::InvalidOptionalValue),
    }
}

pub trait Deserializer {
    fn deserialize<B>(buf: &mut B) -> Result<Self>
    where
        Self: Sized,
        B: Buf;

    fn deserialize_exact(mut buf: &[u8]) -> Result<Self>
    where
        Self: Sized,
    {
        let v = Self::deserialize(&mut buf)?;
        if buf.has_remaining() {
            return Err(Error::InputContainsExcessBytes(buf.remaining()));
        }
        Ok(v)
    }
}

pub trait Serializer {
    fn serialize<B>(&self, buf: &mut B) -> Result<()>
    where
        Self: Sized,
        B: BufMut;

    fn serialize_detached(&self) -> Result<Bytes>
    where
        Self: Sized,
    {
        let mut buf = BytesMut::new();
        self.serialize(&mut buf)?;
        Ok(buf.freeze())
    }
}
