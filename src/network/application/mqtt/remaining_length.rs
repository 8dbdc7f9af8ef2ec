//! The variable-length "remaining length" field of the fixed header.
//!
//! Each byte carries 7 bits of the value, least-significant group first, and
//! uses its top bit (0x80) to flag that another byte follows. At most four
//! bytes are allowed, which caps the value at 268,435,455.

use super::error::{Error, Malformed};
use heapless::Vec;

/// Largest value the field can carry (`0xFF 0xFF 0xFF 0x7F`).
pub const MAX_REMAINING_LENGTH: usize = 268_435_455;

/// Maximum number of bytes the field may occupy.
pub const MAX_ENCODED_LEN: usize = 4;

const CONTINUATION: u8 = 0x80;

/// Encode `value`, returning 1 to 4 bytes.
///
/// Fails with [`Error::PacketTooLarge`] above [`MAX_REMAINING_LENGTH`].
pub fn encode(mut value: usize) -> Result<Vec<u8, MAX_ENCODED_LEN>, Error> {
    if value > MAX_REMAINING_LENGTH {
        return Err(Error::PacketTooLarge);
    }
    let mut out = Vec::new();
    loop {
        let mut byte = (value % 128) as u8;
        value /= 128;
        if value > 0 {
            byte |= CONTINUATION;
        }
        out.push(byte).map_err(|_| Error::PacketTooLarge)?;
        if value == 0 {
            return Ok(out);
        }
    }
}

/// Number of bytes [`encode`] produces for `value`.
pub const fn encoded_len(value: usize) -> usize {
    if value < 128 {
        1
    } else if value < 16_384 {
        2
    } else if value < 2_097_152 {
        3
    } else {
        4
    }
}

/// Decode the field from the start of `buf`.
///
/// Returns the value and how many bytes it occupied. A fifth continuation
/// byte is [`Malformed::RemainingLength`]; running out of input first is
/// [`Malformed::Truncated`].
pub fn decode(buf: &[u8]) -> Result<(usize, usize), Error> {
    let mut value = 0usize;
    let mut multiplier = 1usize;
    for (i, &byte) in buf.iter().enumerate() {
        if i == MAX_ENCODED_LEN {
            return Err(Malformed::RemainingLength.into());
        }
        value += (byte & 0x7F) as usize * multiplier;
        if byte & CONTINUATION == 0 {
            return Ok((value, i + 1));
        }
        multiplier *= 128;
    }
    if buf.len() >= MAX_ENCODED_LEN {
        Err(Malformed::RemainingLength.into())
    } else {
        Err(Malformed::Truncated.into())
    }
}
