//! Little-endian integer reads over byte slices.
//!
//! Every read is bounds checked and reports [`Error::Truncated`] instead of
//! panicking when the span runs past the end of the slice.

use crate::error::Error;
use core::convert::TryInto;

fn span<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], Error> {
    let end = offset.checked_add(N).ok_or(Error::Truncated {
        needed: usize::MAX,
        available: bytes.len(),
    })?;

    bytes
        .get(offset..end)
        .ok_or(Error::Truncated {
            needed: end,
            available: bytes.len(),
        })
        .and_then(|b| {
            b.try_into().map_err(|_| Error::Truncated {
                needed: end,
                available: bytes.len(),
            })
        })
}

/// Read an unsigned 32 bit integer from `bytes[offset..offset + 4]`
pub fn le_u32(bytes: &[u8], offset: usize) -> Result<u32, Error> {
    span::<4>(bytes, offset).map(u32::from_le_bytes)
}

/// Read an unsigned 16 bit integer from `bytes[offset..offset + 2]`
pub fn le_u16(bytes: &[u8], offset: usize) -> Result<u16, Error> {
    span::<2>(bytes, offset).map(u16::from_le_bytes)
}

/// Read a signed 16 bit integer from `bytes[offset..offset + 2]`
pub fn le_i16(bytes: &[u8], offset: usize) -> Result<i16, Error> {
    span::<2>(bytes, offset).map(i16::from_le_bytes)
}
