//! Error types for the MQTT codec and client session.

use super::packet::ControlPacketType;
use crate::network::error::Error as NetworkError;

/// Why a byte sequence is not a valid control packet.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Malformed {
    /// The type nibble is outside 0-14.
    InvalidPacketType(u8),
    /// The remaining length did not terminate within 4 bytes.
    RemainingLength,
    /// Fewer bytes are available than the header declares.
    Truncated,
    /// A length-prefixed string runs past the end of the packet or is not UTF-8.
    InvalidString,
    /// Header flag bits the packet type does not allow, such as PUBLISH QoS 3.
    InvalidFlags,
}

/// A protocol feature this crate deliberately does not implement.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Unsupported {
    /// PUBLISH with QoS 1 or 2.
    QoS,
    /// Will topic / will message payloads.
    WillMessage,
    /// Topic, client id, credential or message text outside ASCII.
    NonAscii,
}

/// Errors reported by the codec and by [`Client`](super::Client) exchanges.
///
/// Every variant is fatal to the exchange in flight. The client never
/// reconnects or retransmits; the caller decides what to do next.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The input is not a well-formed control packet.
    MalformedPacket(Malformed),
    /// The packet does not fit the fixed-size buffers.
    PacketTooLarge,
    /// A QoS value outside the range its field allows.
    InvalidQoS(u8),
    /// SUBSCRIBE or UNSUBSCRIBE was built without any topic.
    NoTopics,
    /// The request needs a feature that is not implemented.
    UnsupportedFeature(Unsupported),
    /// A reply of the expected type arrived but its bytes differ from the
    /// expected acknowledgement.
    UnexpectedResponse(ControlPacketType),
    /// The broker answered CONNECT with this non-zero return code.
    ConnectionRefused(u8),
    /// The wait loop used all its attempts without seeing the expected type.
    NoMatch,
    /// The transport returned no data while a reply was outstanding.
    Timeout,
    /// The operation needs an established session.
    NotConnected,
    /// `connect` was called on a session that has already been opened.
    AlreadyConnected,
    /// Connection options could not be parsed.
    InvalidOptions,
    /// The transport failed.
    Transport(NetworkError),
}

impl From<NetworkError> for Error {
    fn from(error: NetworkError) -> Self {
        Error::Transport(error)
    }
}

impl From<Malformed> for Error {
    fn from(reason: Malformed) -> Self {
        Error::MalformedPacket(reason)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::MalformedPacket(reason) => write!(f, "malformed packet: {:?}", reason),
            Error::PacketTooLarge => f.write_str("packet exceeds buffer capacity"),
            Error::InvalidQoS(qos) => write!(f, "invalid QoS value {}", qos),
            Error::NoTopics => f.write_str("at least one topic is required"),
            Error::UnsupportedFeature(feature) => write!(f, "unsupported feature: {:?}", feature),
            Error::UnexpectedResponse(kind) => write!(f, "unexpected {:?} response", kind),
            Error::ConnectionRefused(code) => write!(f, "connection refused with code {}", code),
            Error::NoMatch => f.write_str("no matching message"),
            Error::Timeout => f.write_str("timed out waiting for a reply"),
            Error::NotConnected => f.write_str("not connected"),
            Error::AlreadyConnected => f.write_str("session already opened"),
            Error::InvalidOptions => f.write_str("invalid connection options"),
            Error::Transport(error) => write!(f, "transport error: {}", error),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::MalformedPacket(reason) => defmt::write!(f, "MalformedPacket({})", reason),
            Error::PacketTooLarge => defmt::write!(f, "PacketTooLarge"),
            Error::InvalidQoS(qos) => defmt::write!(f, "InvalidQoS({=u8})", *qos),
            Error::NoTopics => defmt::write!(f, "NoTopics"),
            Error::UnsupportedFeature(feature) => defmt::write!(f, "UnsupportedFeature({})", feature),
            Error::UnexpectedResponse(kind) => defmt::write!(f, "UnexpectedResponse({})", kind),
            Error::ConnectionRefused(code) => defmt::write!(f, "ConnectionRefused({=u8})", *code),
            Error::NoMatch => defmt::write!(f, "NoMatch"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::NotConnected => defmt::write!(f, "NotConnected"),
            Error::AlreadyConnected => defmt::write!(f, "AlreadyConnected"),
            Error::InvalidOptions => defmt::write!(f, "InvalidOptions"),
            Error::Transport(error) => defmt::write!(f, "Transport({})", error),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Malformed {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Malformed::InvalidPacketType(nibble) => {
                defmt::write!(f, "InvalidPacketType({=u8})", *nibble)
            }
            Malformed::RemainingLength => defmt::write!(f, "RemainingLength"),
            Malformed::Truncated => defmt::write!(f, "Truncated"),
            Malformed::InvalidString => defmt::write!(f, "InvalidString"),
            Malformed::InvalidFlags => defmt::write!(f, "InvalidFlags"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for Unsupported {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Unsupported::QoS => defmt::write!(f, "QoS"),
            Unsupported::WillMessage => defmt::write!(f, "WillMessage"),
            Unsupported::NonAscii => defmt::write!(f, "NonAscii"),
        }
    }
}
