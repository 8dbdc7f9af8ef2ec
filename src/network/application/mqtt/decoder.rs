//! Single-packet decoder.
//!
//! [`decode`] consumes exactly one control packet from the front of a
//! buffer. The variable header and payload stay opaque: the session engine
//! correlates replies by comparing encoded bytes, not parsed fields.

use super::error::{Error, Malformed};
use super::packet::{ControlPacket, ControlPacketType, FixedHeader, Frame, MAX_BODY_SIZE};
use super::remaining_length;
use super::QoS;
use heapless::Vec;

/// Opaque packet body (variable header followed by payload).
pub type Body = Vec<u8, MAX_BODY_SIZE>;

/// One packet as read off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPacket {
    header: FixedHeader,
    body: Body,
    consumed: usize,
}

/// Decode the first packet in `buf`.
///
/// Bytes after that packet are left alone; call again on
/// `&buf[packet.consumed()..]` for the next one.
pub fn decode(buf: &[u8]) -> Result<DecodedPacket, Error> {
    let (&first, rest) = buf.split_first().ok_or(Malformed::Truncated)?;
    // Validate the type nibble before anything else so garbage is reported as such.
    ControlPacketType::try_from(first >> 4)?;
    let (length, length_bytes) = remaining_length::decode(rest)?;
    if length > MAX_BODY_SIZE {
        return Err(Error::PacketTooLarge);
    }
    let start = 1 + length_bytes;
    let body = buf
        .get(start..start + length)
        .ok_or(Malformed::Truncated)?;
    Ok(DecodedPacket {
        header: FixedHeader::parse(first, length)?,
        body: Body::from_slice(body).map_err(|_| Error::PacketTooLarge)?,
        consumed: start + length,
    })
}

impl DecodedPacket {
    /// The fixed header.
    pub fn header(&self) -> &FixedHeader {
        &self.header
    }

    /// The packet type.
    pub fn packet_type(&self) -> ControlPacketType {
        self.header.packet_type()
    }

    /// Raw variable header and payload bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// How many input bytes this packet occupied.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Re-encode the packet exactly as it was received.
    pub fn to_bytes(&self) -> Result<Frame, Error> {
        let mut frame = Frame::new();
        frame
            .extend_from_slice(&self.header.to_bytes()?)
            .map_err(|_| Error::PacketTooLarge)?;
        frame
            .extend_from_slice(&self.body)
            .map_err(|_| Error::PacketTooLarge)?;
        Ok(frame)
    }

    /// Whether this packet encodes to exactly the same bytes as `expected`.
    pub fn matches(&self, expected: &ControlPacket) -> Result<bool, Error> {
        Ok(self.to_bytes()? == expected.to_bytes()?)
    }

    /// Read this packet as a PUBLISH, or `None` for any other type.
    pub fn publish(&self) -> Result<Option<Publish<'_>>, Error> {
        if self.packet_type() != ControlPacketType::Publish {
            return Ok(None);
        }
        let qos_bits = (self.header.flags() >> 1) & 0b11;
        let qos = QoS::try_from(qos_bits).map_err(|_| Malformed::InvalidFlags)?;
        let (topic, mut rest) = read_str(&self.body)?;
        let packet_identifier = if qos == QoS::AtMostOnce {
            None
        } else {
            let (id, tail) = rest.split_at_checked(2).ok_or(Malformed::Truncated)?;
            rest = tail;
            Some(u16::from_be_bytes([id[0], id[1]]))
        };
        Ok(Some(Publish {
            topic,
            payload: rest,
            dup: self.header.flag(3),
            qos,
            retain: self.header.flag(0),
            packet_identifier,
        }))
    }
}

/// A borrowed view of a received PUBLISH packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Publish<'a> {
    /// Topic the message was published to.
    pub topic: &'a str,
    /// Application message.
    pub payload: &'a [u8],
    /// Redelivery flag.
    pub dup: bool,
    /// Delivery QoS chosen by the sender.
    pub qos: QoS,
    /// Retained-message flag.
    pub retain: bool,
    /// Present for QoS 1 and 2 deliveries.
    pub packet_identifier: Option<u16>,
}

fn read_str(buf: &[u8]) -> Result<(&str, &[u8]), Error> {
    let (len, rest) = buf.split_at_checked(2).ok_or(Malformed::InvalidString)?;
    let len = u16::from_be_bytes([len[0], len[1]]) as usize;
    let (text, rest) = rest.split_at_checked(len).ok_or(Malformed::InvalidString)?;
    let text = core::str::from_utf8(text).map_err(|_| Malformed::InvalidString)?;
    Ok((text, rest))
}
