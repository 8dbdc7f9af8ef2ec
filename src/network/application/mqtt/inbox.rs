//! Receive buffer between the transport and the decoder.
//!
//! A single read may return part of a packet, exactly one, or several.
//! The inbox keeps whatever the decoder has not consumed yet.
//!
//! A packet that cannot be kept (too large for the buffers, or of an invalid
//! type) but whose remaining length is readable is skipped as a whole frame,
//! across as many reads as it takes, so the packets after it stay aligned.

use super::decoder::{decode, DecodedPacket};
use super::error::{Error, Malformed};
use super::packet::MAX_FRAME_SIZE;
use super::remaining_length;

/// Room for one partial frame plus one full read.
const INBOX_SIZE: usize = 2 * MAX_FRAME_SIZE;

pub(crate) struct Inbox {
    buf: [u8; INBOX_SIZE],
    len: usize,
    /// Bytes of a rejected frame still to be dropped, possibly not read yet.
    skip: usize,
}

impl Inbox {
    pub(crate) const fn new() -> Self {
        Self {
            buf: [0; INBOX_SIZE],
            len: 0,
            skip: 0,
        }
    }

    /// Pop the next complete packet, or `None` when more bytes are needed.
    ///
    /// A rejected frame is reported once; its bytes are then skipped. Only
    /// an unreadable remaining length discards everything buffered, since
    /// the next packet boundary is unknown after it.
    pub(crate) fn next_packet(&mut self) -> Result<Option<DecodedPacket>, Error> {
        self.drop_skipped();
        match decode(&self.buf[..self.len]) {
            Ok(packet) => {
                self.consume(packet.consumed());
                Ok(Some(packet))
            }
            Err(Error::MalformedPacket(Malformed::Truncated)) => Ok(None),
            Err(
                e @ (Error::PacketTooLarge
                | Error::MalformedPacket(Malformed::InvalidPacketType(_))),
            ) => {
                match remaining_length::decode(&self.buf[1..self.len]) {
                    Ok((length, length_bytes)) => {
                        self.skip = 1 + length_bytes + length;
                        warn!("skipping a {=usize}-byte frame: {}", self.skip, e);
                        self.drop_skipped();
                        Err(e)
                    }
                    // Wait until the frame size is known.
                    Err(Error::MalformedPacket(Malformed::Truncated)) => Ok(None),
                    Err(_) => {
                        self.len = 0;
                        Err(e)
                    }
                }
            }
            Err(e) => {
                self.len = 0;
                Err(e)
            }
        }
    }

    /// Free space for the next read, at most one frame.
    pub(crate) fn spare_mut(&mut self) -> &mut [u8] {
        let end = (self.len + MAX_FRAME_SIZE).min(INBOX_SIZE);
        &mut self.buf[self.len..end]
    }

    /// Mark `n` bytes of [`spare_mut`](Self::spare_mut) as filled.
    pub(crate) fn commit(&mut self, n: usize) {
        self.len = (self.len + n).min(INBOX_SIZE);
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    fn drop_skipped(&mut self) {
        let n = self.skip.min(self.len);
        self.consume(n);
        self.skip -= n;
    }

    fn consume(&mut self, n: usize) {
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
    }
}

impl core::fmt::Debug for Inbox {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Inbox")
            .field("buffered", &self.len)
            .field("skip", &self.skip)
            .finish()
    }
}
