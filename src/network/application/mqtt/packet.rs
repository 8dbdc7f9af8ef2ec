//! Control packet model and encoder.
//!
//! A [`ControlPacket`] is a fixed header plus two opaque byte blocks, the
//! variable header and the payload. The remaining length is never set by
//! hand: [`ControlPacket::new`] derives it from the two blocks, so a built
//! packet always declares exactly the number of bytes that follow it.

use super::error::{Error, Malformed};
use super::remaining_length;
use heapless::Vec;

/// Capacity of a variable header: a 2-byte length prefix plus a 256-byte topic.
pub const MAX_VARIABLE_HEADER_SIZE: usize = 258;

/// Capacity of a payload.
pub const MAX_PAYLOAD_SIZE: usize = 1024;

/// Largest remaining length this crate will build or accept.
pub const MAX_BODY_SIZE: usize = MAX_VARIABLE_HEADER_SIZE + MAX_PAYLOAD_SIZE;

/// Largest encoded packet: header byte, 4 length bytes and the body.
pub const MAX_FRAME_SIZE: usize = 1 + remaining_length::MAX_ENCODED_LEN + MAX_BODY_SIZE;

/// Variable header bytes.
pub type VariableHeader = Vec<u8, MAX_VARIABLE_HEADER_SIZE>;

/// Payload bytes.
pub type Payload = Vec<u8, MAX_PAYLOAD_SIZE>;

/// A fully encoded packet.
pub type Frame = Vec<u8, MAX_FRAME_SIZE>;

/// The packet type carried in the high nibble of the first header byte.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ControlPacketType {
    /// Reserved by the protocol.
    Reserved = 0,
    /// Client request to connect to the server.
    Connect = 1,
    /// Connect acknowledgment.
    Connack = 2,
    /// Publish message.
    Publish = 3,
    /// Publish acknowledgment.
    Puback = 4,
    /// Publish received (QoS 2, part 1).
    Pubrec = 5,
    /// Publish release (QoS 2, part 2).
    Pubrel = 6,
    /// Publish complete (QoS 2, part 3).
    Pubcomp = 7,
    /// Client subscribe request.
    Subscribe = 8,
    /// Subscribe acknowledgment.
    Suback = 9,
    /// Unsubscribe request.
    Unsubscribe = 10,
    /// Unsubscribe acknowledgment.
    Unsuback = 11,
    /// PING request.
    Pingreq = 12,
    /// PING response.
    Pingresp = 13,
    /// Client is disconnecting.
    Disconnect = 14,
}

impl TryFrom<u8> for ControlPacketType {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Ok(match value {
            0 => Self::Reserved,
            1 => Self::Connect,
            2 => Self::Connack,
            3 => Self::Publish,
            4 => Self::Puback,
            5 => Self::Pubrec,
            6 => Self::Pubrel,
            7 => Self::Pubcomp,
            8 => Self::Subscribe,
            9 => Self::Suback,
            10 => Self::Unsubscribe,
            11 => Self::Unsuback,
            12 => Self::Pingreq,
            13 => Self::Pingresp,
            14 => Self::Disconnect,
            other => return Err(Malformed::InvalidPacketType(other).into()),
        })
    }
}

/// The first header byte split into type and flag bits, plus the remaining
/// length of the packet it heads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FixedHeader {
    packet_type: ControlPacketType,
    flags: u8,
    remaining_length: usize,
}

impl FixedHeader {
    /// Flags are given low bit first: `flag0` is bit 0 of the header byte.
    pub(crate) fn new(
        packet_type: ControlPacketType,
        [flag0, flag1, flag2, flag3]: [bool; 4],
        remaining_length: usize,
    ) -> Self {
        let flags = (flag3 as u8) << 3 | (flag2 as u8) << 2 | (flag1 as u8) << 1 | flag0 as u8;
        Self {
            packet_type,
            flags,
            remaining_length,
        }
    }

    /// Split a raw header byte.
    pub(crate) fn parse(byte: u8, remaining_length: usize) -> Result<Self, Error> {
        let packet_type = ControlPacketType::try_from(byte >> 4)?;
        let flag = |n: u8| (byte >> n) & 1 == 1;
        Ok(Self::new(
            packet_type,
            [flag(0), flag(1), flag(2), flag(3)],
            remaining_length,
        ))
    }

    /// The packet type.
    pub fn packet_type(&self) -> ControlPacketType {
        self.packet_type
    }

    /// Flag bit `n` (0-3) of the header byte.
    pub fn flag(&self, n: u8) -> bool {
        n < 4 && (self.flags >> n) & 1 == 1
    }

    /// The four flag bits as the low nibble.
    pub fn flags(&self) -> u8 {
        self.flags
    }

    /// Number of bytes following the fixed header.
    pub fn remaining_length(&self) -> usize {
        self.remaining_length
    }

    /// The type/flags byte.
    pub fn first_byte(&self) -> u8 {
        (self.packet_type as u8) << 4 | self.flags
    }

    /// Header byte followed by the encoded remaining length.
    pub fn to_bytes(&self) -> Result<Vec<u8, 5>, Error> {
        let mut out = Vec::new();
        out.push(self.first_byte())
            .map_err(|_| Error::PacketTooLarge)?;
        out.extend_from_slice(&remaining_length::encode(self.remaining_length)?)
            .map_err(|_| Error::PacketTooLarge)?;
        Ok(out)
    }
}

/// An immutable control packet ready to be written to a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPacket {
    header: FixedHeader,
    variable_header: VariableHeader,
    payload: Payload,
}

impl ControlPacket {
    /// Assemble a packet, deriving the remaining length from the two blocks.
    ///
    /// Flags are given low bit first, as in [`FixedHeader`].
    pub fn new(
        packet_type: ControlPacketType,
        flags: [bool; 4],
        variable_header: &[u8],
        payload: &[u8],
    ) -> Result<Self, Error> {
        let variable_header =
            VariableHeader::from_slice(variable_header).map_err(|_| Error::PacketTooLarge)?;
        let payload = Payload::from_slice(payload).map_err(|_| Error::PacketTooLarge)?;
        let remaining_length = variable_header.len() + payload.len();
        Ok(Self {
            header: FixedHeader::new(packet_type, flags, remaining_length),
            variable_header,
            payload,
        })
    }

    /// A packet with no variable header and no payload.
    pub fn empty(packet_type: ControlPacketType) -> Self {
        Self {
            header: FixedHeader::new(packet_type, [false; 4], 0),
            variable_header: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// The fixed header.
    pub fn header(&self) -> &FixedHeader {
        &self.header
    }

    /// The packet type.
    pub fn packet_type(&self) -> ControlPacketType {
        self.header.packet_type
    }

    /// Variable header bytes.
    pub fn variable_header(&self) -> &[u8] {
        &self.variable_header
    }

    /// Payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Encoded size in bytes.
    pub fn encoded_len(&self) -> usize {
        1 + remaining_length::encoded_len(self.header.remaining_length)
            + self.header.remaining_length
    }

    /// Serialize as fixed header, variable header, payload.
    pub fn to_bytes(&self) -> Result<Frame, Error> {
        let mut frame = Frame::new();
        frame
            .extend_from_slice(&self.header.to_bytes()?)
            .map_err(|_| Error::PacketTooLarge)?;
        frame
            .extend_from_slice(&self.variable_header)
            .map_err(|_| Error::PacketTooLarge)?;
        frame
            .extend_from_slice(&self.payload)
            .map_err(|_| Error::PacketTooLarge)?;
        Ok(frame)
    }
}
