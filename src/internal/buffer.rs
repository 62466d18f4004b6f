// Bounds-checked little-endian buffer primitives.
//
// All reads and writes are addressed by absolute offset into a fully
// materialized buffer. Nothing here grows a buffer: any access past the end
// fails with `OutOfBounds`, which callers propagate unchanged.

use byteorder::{ByteOrder, LittleEndian};

use crate::internal::error::{Error, Result};

/// Size of the uint32 length prefix used by strings, byte blobs and arrays.
pub const LENGTH_PREFIX_LEN: usize = 4;

fn out_of_bounds(offset: usize, length: usize, available: usize) -> Error {
    Error::OutOfBounds {
        offset,
        length,
        available,
    }
}

fn range(buf: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    let end = offset
        .checked_add(length)
        .ok_or_else(|| out_of_bounds(offset, length, buf.len()))?;
    buf.get(offset..end)
        .ok_or_else(|| out_of_bounds(offset, length, buf.len()))
}

fn range_mut(buf: &mut [u8], offset: usize, length: usize) -> Result<&mut [u8]> {
    let available = buf.len();
    let end = offset
        .checked_add(length)
        .ok_or_else(|| out_of_bounds(offset, length, available))?;
    buf.get_mut(offset..end)
        .ok_or_else(|| out_of_bounds(offset, length, available))
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8> {
    Ok(range(buf, offset, 1)?[0])
}

pub fn read_i8(buf: &[u8], offset: usize) -> Result<i8> {
    Ok(read_u8(buf, offset)? as i8)
}

pub fn read_u16_le(buf: &[u8], offset: usize) -> Result<u16> {
    Ok(LittleEndian::read_u16(range(buf, offset, 2)?))
}

pub fn read_i16_le(buf: &[u8], offset: usize) -> Result<i16> {
    Ok(LittleEndian::read_i16(range(buf, offset, 2)?))
}

pub fn read_u32_le(buf: &[u8], offset: usize) -> Result<u32> {
    Ok(LittleEndian::read_u32(range(buf, offset, 4)?))
}

pub fn read_i32_le(buf: &[u8], offset: usize) -> Result<i32> {
    Ok(LittleEndian::read_i32(range(buf, offset, 4)?))
}

pub fn read_f32_le(buf: &[u8], offset: usize) -> Result<f32> {
    Ok(LittleEndian::read_f32(range(buf, offset, 4)?))
}

/// Returns a view of `length` bytes starting at `offset`.
pub fn read_bytes(buf: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    range(buf, offset, length)
}

/// Reads a uint32 LE length prefix and the payload that follows it.
///
/// Returns the payload view; the encoded length of the whole string is
/// `LENGTH_PREFIX_LEN + payload.len()`.
pub fn read_prefixed_bytes(buf: &[u8], offset: usize) -> Result<&[u8]> {
    let length = read_u32_le(buf, offset)? as usize;
    range(buf, offset + LENGTH_PREFIX_LEN, length)
}

/// Reads a length-prefixed string.
///
/// Returns the decoded text and the payload length in bytes. With `strict`
/// set, invalid UTF-8 is an error; otherwise invalid sequences are replaced.
pub fn read_prefixed_string(buf: &[u8], offset: usize, strict: bool) -> Result<(String, usize)> {
    let payload = read_prefixed_bytes(buf, offset)?;
    let text = if strict {
        std::str::from_utf8(payload)
            .map_err(|e| Error::InvalidString(format!("Invalid UTF-8 string at offset {}: {}", offset, e)))?
            .to_string()
    } else {
        String::from_utf8_lossy(payload).into_owned()
    };
    Ok((text, payload.len()))
}

pub fn write_u8(buf: &mut [u8], value: u8, offset: usize) -> Result<()> {
    range_mut(buf, offset, 1)?[0] = value;
    Ok(())
}

pub fn write_i8(buf: &mut [u8], value: i8, offset: usize) -> Result<()> {
    write_u8(buf, value as u8, offset)
}

pub fn write_u16_le(buf: &mut [u8], value: u16, offset: usize) -> Result<()> {
    LittleEndian::write_u16(range_mut(buf, offset, 2)?, value);
    Ok(())
}

pub fn write_i16_le(buf: &mut [u8], value: i16, offset: usize) -> Result<()> {
    LittleEndian::write_i16(range_mut(buf, offset, 2)?, value);
    Ok(())
}

pub fn write_u32_le(buf: &mut [u8], value: u32, offset: usize) -> Result<()> {
    LittleEndian::write_u32(range_mut(buf, offset, 4)?, value);
    Ok(())
}

pub fn write_i32_le(buf: &mut [u8], value: i32, offset: usize) -> Result<()> {
    LittleEndian::write_i32(range_mut(buf, offset, 4)?, value);
    Ok(())
}

pub fn write_f32_le(buf: &mut [u8], value: f32, offset: usize) -> Result<()> {
    LittleEndian::write_f32(range_mut(buf, offset, 4)?, value);
    Ok(())
}

/// Copies `src` into `buf` at `offset`.
///
/// With `pad_length`, exactly that many bytes are written: `src` is
/// truncated if longer and zero-padded if shorter. Returns the number of
/// bytes written.
pub fn write_bytes(buf: &mut [u8], src: &[u8], offset: usize, pad_length: Option<usize>) -> Result<usize> {
    let length = pad_length.unwrap_or(src.len());
    let dest = range_mut(buf, offset, length)?;
    let copied = src.len().min(length);
    dest[..copied].copy_from_slice(&src[..copied]);
    dest[copied..].fill(0);
    Ok(length)
}

/// Writes a uint32 LE length prefix followed by `payload`.
///
/// Returns the total number of bytes written.
pub fn write_prefixed_bytes(buf: &mut [u8], payload: &[u8], offset: usize) -> Result<usize> {
    let length = u32::try_from(payload.len()).map_err(|_| Error::ValueOutOfRange {
        expected: "uint32 length prefix".to_string(),
        value: payload.len().to_string(),
    })?;
    write_u32_le(buf, length, offset)?;
    let written = write_bytes(buf, payload, offset + LENGTH_PREFIX_LEN, None)?;
    Ok(LENGTH_PREFIX_LEN + written)
}

pub fn write_prefixed_string(buf: &mut [u8], value: &str, offset: usize) -> Result<usize> {
    write_prefixed_bytes(buf, value.as_bytes(), offset)
}
