//! Pure constructors for every control packet the client sends or expects.
//!
//! Expected acknowledgements are built with these same functions so that a
//! reply can be checked by comparing encoded bytes.

use super::error::{Error, Unsupported};
use super::identifier::PacketIdentifier;
use super::options::ConnectOptions;
use super::packet::{ControlPacket, ControlPacketType, Payload, VariableHeader};
use super::qos::{QoS, SubscribeReturnCode};
use heapless::Vec;

/// Protocol name carried in CONNECT.
pub const PROTOCOL_NAME: &str = "MQTT";

/// Protocol level for version 3.1.1.
pub const PROTOCOL_LEVEL: u8 = 4;

/// Flags of SUBSCRIBE and UNSUBSCRIBE, low bit first.
const REQUEST_FLAGS: [bool; 4] = [false, true, false, false];

const NO_FLAGS: [bool; 4] = [false; 4];

// Connect flag bits.
const USERNAME: u8 = 1 << 7;
const PASSWORD: u8 = 1 << 6;
const WILL_RETAIN: u8 = 1 << 5;
const WILL_QOS_SHIFT: u8 = 3;
const CLEAN_SESSION: u8 = 1 << 1;

/// Header flags of a PUBLISH packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishFlags {
    /// Redelivery flag (bit 3).
    pub dup: bool,
    /// Delivery QoS (bits 2-1). Only [`QoS::AtMostOnce`] can be built.
    pub qos: QoS,
    /// Retain flag (bit 0).
    pub retain: bool,
}

/// Append a 2-byte length prefix and the ASCII bytes of `text`.
fn put_str<const N: usize>(buf: &mut Vec<u8, N>, text: &str) -> Result<(), Error> {
    if !text.is_ascii() {
        return Err(Error::UnsupportedFeature(Unsupported::NonAscii));
    }
    let len = u16::try_from(text.len()).map_err(|_| Error::PacketTooLarge)?;
    buf.extend_from_slice(&len.to_be_bytes())
        .map_err(|_| Error::PacketTooLarge)?;
    buf.extend_from_slice(text.as_bytes())
        .map_err(|_| Error::PacketTooLarge)
}

fn put<const N: usize>(buf: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), Error> {
    buf.extend_from_slice(bytes).map_err(|_| Error::PacketTooLarge)
}

/// CONNECT: protocol name, level, connect flags and keep-alive, then the
/// client id and whichever credentials are present.
///
/// The will flag is always clear; a configured [`LastWill`](super::LastWill)
/// is refused with [`Unsupported::WillMessage`].
pub fn connect(options: &ConnectOptions<'_>) -> Result<ControlPacket, Error> {
    if options.will.is_some() {
        return Err(Error::UnsupportedFeature(Unsupported::WillMessage));
    }
    if options.will_qos > 3 {
        return Err(Error::InvalidQoS(options.will_qos));
    }
    let username = options.username();
    let password = options.password();

    let mut flags = options.will_qos << WILL_QOS_SHIFT;
    if username.is_some() {
        flags |= USERNAME;
    }
    if password.is_some() {
        flags |= PASSWORD;
    }
    if options.will_retain {
        flags |= WILL_RETAIN;
    }
    if options.clean_session {
        flags |= CLEAN_SESSION;
    }

    let mut vh = VariableHeader::new();
    put_str(&mut vh, PROTOCOL_NAME)?;
    put(&mut vh, &[PROTOCOL_LEVEL, flags])?;
    put(&mut vh, &options.keep_alive_seconds.to_be_bytes())?;

    let mut payload = Payload::new();
    put_str(&mut payload, options.client_id)?;
    for field in [username, password].into_iter().flatten() {
        put_str(&mut payload, field)?;
    }

    ControlPacket::new(ControlPacketType::Connect, NO_FLAGS, &vh, &payload)
}

/// CONNACK: session-present bit and return code. Remaining length is always 2.
pub fn connack(session_present: bool, return_code: u8) -> Result<ControlPacket, Error> {
    ControlPacket::new(
        ControlPacketType::Connack,
        NO_FLAGS,
        &[session_present as u8, return_code],
        &[],
    )
}

/// PUBLISH with a length-prefixed topic and the raw message text.
///
/// QoS 0 carries no packet identifier; QoS 1 and 2 are refused with
/// [`Unsupported::QoS`].
pub fn publish(topic: &str, message: &str, flags: PublishFlags) -> Result<ControlPacket, Error> {
    if flags.qos != QoS::AtMostOnce {
        return Err(Error::UnsupportedFeature(Unsupported::QoS));
    }
    if !message.is_ascii() {
        return Err(Error::UnsupportedFeature(Unsupported::NonAscii));
    }
    let qos = flags.qos as u8;
    let mut vh = VariableHeader::new();
    put_str(&mut vh, topic)?;
    ControlPacket::new(
        ControlPacketType::Publish,
        [flags.retain, qos & 0b01 != 0, qos & 0b10 != 0, flags.dup],
        &vh,
        message.as_bytes(),
    )
}

/// PUBACK carrying `id` as two flat big-endian bytes.
pub fn puback(id: PacketIdentifier) -> Result<ControlPacket, Error> {
    ControlPacket::new(ControlPacketType::Puback, NO_FLAGS, &id.to_bytes(), &[])
}

/// SUBSCRIBE: one length-prefixed filter and requested QoS byte per topic.
pub fn subscribe(id: PacketIdentifier, topics: &[(&str, QoS)]) -> Result<ControlPacket, Error> {
    if topics.is_empty() {
        return Err(Error::NoTopics);
    }
    let mut payload = Payload::new();
    for &(topic, qos) in topics {
        put_str(&mut payload, topic)?;
        put(&mut payload, &[qos as u8])?;
    }
    ControlPacket::new(
        ControlPacketType::Subscribe,
        REQUEST_FLAGS,
        &id.to_bytes(),
        &payload,
    )
}

/// SUBACK: one return code byte per requested topic.
pub fn suback(
    id: PacketIdentifier,
    return_codes: &[SubscribeReturnCode],
) -> Result<ControlPacket, Error> {
    let mut payload = Payload::new();
    for code in return_codes {
        put(&mut payload, &[code.to_byte()])?;
    }
    ControlPacket::new(ControlPacketType::Suback, NO_FLAGS, &id.to_bytes(), &payload)
}

/// UNSUBSCRIBE: concatenated length-prefixed topic filters.
pub fn unsubscribe(id: PacketIdentifier, topics: &[&str]) -> Result<ControlPacket, Error> {
    if topics.is_empty() {
        return Err(Error::NoTopics);
    }
    let mut payload = Payload::new();
    for topic in topics {
        put_str(&mut payload, topic)?;
    }
    ControlPacket::new(
        ControlPacketType::Unsubscribe,
        REQUEST_FLAGS,
        &id.to_bytes(),
        &payload,
    )
}

/// UNSUBACK echoing `id`.
pub fn unsuback(id: PacketIdentifier) -> Result<ControlPacket, Error> {
    ControlPacket::new(ControlPacketType::Unsuback, NO_FLAGS, &id.to_bytes(), &[])
}

/// PINGREQ.
pub fn pingreq() -> ControlPacket {
    ControlPacket::empty(ControlPacketType::Pingreq)
}

/// PINGRESP.
pub fn pingresp() -> ControlPacket {
    ControlPacket::empty(ControlPacketType::Pingresp)
}

/// DISCONNECT.
pub fn disconnect() -> ControlPacket {
    ControlPacket::empty(ControlPacketType::Disconnect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::application::mqtt::LastWill;

    fn credentials() -> ConnectOptions<'static> {
        ConnectOptions {
            username: Some("ranma1988"),
            password: Some("secret"),
            ..ConnectOptions::new("cupz")
        }
    }

    #[test]
    fn connect_with_credentials() {
        let packet = connect(&credentials()).unwrap();
        let vh = packet.variable_header();
        assert_eq!(vh.len(), 10);
        assert_eq!(&vh[..7], &[0x00, 0x04, b'M', b'Q', b'T', b'T', PROTOCOL_LEVEL]);

        let flags = vh[7];
        assert_eq!(flags & 0x80, 0x80, "username bit");
        assert_eq!(flags & 0x40, 0x40, "password bit");
        assert_eq!(flags & 0x02, 0x02, "clean session bit");
        assert_eq!(flags & 0x18, 0x00, "QoS bits");
        assert_eq!(flags & 0x04, 0x00, "will flag");
        assert_eq!(flags & 0x01, 0x00, "reserved bit");
        assert_eq!(flags, 0xC2);
        assert_eq!(&vh[8..], &[0x00, 0x0A]);

        let mut expected: Vec<u8, 64> = Vec::new();
        for field in ["cupz", "ranma1988", "secret"] {
            expected.extend_from_slice(&(field.len() as u16).to_be_bytes()).unwrap();
            expected.extend_from_slice(field.as_bytes()).unwrap();
        }
        assert_eq!(packet.payload(), &expected[..]);
        assert_eq!(packet.header().first_byte(), 0x10);
        assert_eq!(packet.header().remaining_length(), 10 + expected.len());
    }

    #[test]
    fn connect_without_credentials_sends_only_client_id() {
        let packet = connect(&ConnectOptions::new("cupz")).unwrap();
        assert_eq!(packet.variable_header()[7], 0x02);
        assert_eq!(packet.payload(), &[0x00, 0x04, b'c', b'u', b'p', b'z']);
    }

    #[test]
    fn connect_encodes_will_bits_and_rejects_out_of_range_qos() {
        let options = ConnectOptions {
            will_retain: true,
            will_qos: 3,
            clean_session: false,
            ..ConnectOptions::new("c")
        };
        assert_eq!(connect(&options).unwrap().variable_header()[7], 0x38);

        let options = ConnectOptions {
            will_qos: 4,
            ..ConnectOptions::new("c")
        };
        assert_eq!(connect(&options), Err(Error::InvalidQoS(4)));
    }

    #[test]
    fn connect_refuses_will_message() {
        let options = ConnectOptions {
            will: Some(LastWill {
                topic: "status",
                message: "offline",
            }),
            ..ConnectOptions::new("c")
        };
        assert_eq!(
            connect(&options),
            Err(Error::UnsupportedFeature(Unsupported::WillMessage))
        );
    }

    #[test]
    fn connack_is_four_bytes() {
        let packet = connack(false, 0).unwrap();
        assert_eq!(&packet.to_bytes().unwrap()[..], &[0x20, 0x02, 0x00, 0x00]);
        let packet = connack(true, 5).unwrap();
        assert_eq!(&packet.to_bytes().unwrap()[..], &[0x20, 0x02, 0x01, 0x05]);
    }

    #[test]
    fn publish_qos0_has_no_identifier() {
        let packet = publish("a/b", "ON", PublishFlags::default()).unwrap();
        assert_eq!(
            &packet.to_bytes().unwrap()[..],
            &[0x30, 0x07, 0x00, 0x03, b'a', b'/', b'b', b'O', b'N']
        );
    }

    #[test]
    fn publish_flags_land_on_protocol_bits() {
        let flags = PublishFlags {
            retain: true,
            dup: true,
            ..PublishFlags::default()
        };
        let packet = publish("t", "", flags).unwrap();
        assert_eq!(packet.header().first_byte(), 0x39);
    }

    #[test]
    fn publish_above_qos0_is_unsupported() {
        let flags = PublishFlags {
            qos: QoS::AtLeastOnce,
            ..PublishFlags::default()
        };
        assert_eq!(
            publish("t", "v", flags),
            Err(Error::UnsupportedFeature(Unsupported::QoS))
        );
    }

    #[test]
    fn non_ascii_text_is_unsupported() {
        assert_eq!(
            publish("t", "café", PublishFlags::default()),
            Err(Error::UnsupportedFeature(Unsupported::NonAscii))
        );
        assert_eq!(
            publish("tópico", "v", PublishFlags::default()),
            Err(Error::UnsupportedFeature(Unsupported::NonAscii))
        );
    }

    #[test]
    fn puback_identifier_is_flat() {
        let packet = puback(PacketIdentifier(0x0102)).unwrap();
        assert_eq!(&packet.to_bytes().unwrap()[..], &[0x40, 0x02, 0x01, 0x02]);
    }

    #[test]
    fn subscribe_carries_qos_per_topic() {
        let packet = subscribe(
            PacketIdentifier(10),
            &[("a", QoS::AtMostOnce), ("b", QoS::ExactlyOnce)],
        )
        .unwrap();
        assert_eq!(
            &packet.to_bytes().unwrap()[..],
            &[0x82, 0x0A, 0x00, 0x0A, 0x00, 0x01, b'a', 0x00, 0x00, 0x01, b'b', 0x02]
        );
    }

    #[test]
    fn requests_need_topics() {
        assert_eq!(subscribe(PacketIdentifier(1), &[]), Err(Error::NoTopics));
        assert_eq!(unsubscribe(PacketIdentifier(1), &[]), Err(Error::NoTopics));
    }

    #[test]
    fn suback_lists_return_codes() {
        let packet = suback(
            PacketIdentifier(7),
            &[
                SubscribeReturnCode::Success(QoS::AtLeastOnce),
                SubscribeReturnCode::Failure,
            ],
        )
        .unwrap();
        assert_eq!(
            &packet.to_bytes().unwrap()[..],
            &[0x90, 0x04, 0x00, 0x07, 0x01, 0x80]
        );
    }

    #[test]
    fn unsubscribe_and_unsuback() {
        let packet = unsubscribe(PacketIdentifier(3), &["a", "bc"]).unwrap();
        assert_eq!(
            &packet.to_bytes().unwrap()[..],
            &[0xA2, 0x09, 0x00, 0x03, 0x00, 0x01, b'a', 0x00, 0x02, b'b', b'c']
        );
        let packet = unsuback(PacketIdentifier(3)).unwrap();
        assert_eq!(&packet.to_bytes().unwrap()[..], &[0xB0, 0x02, 0x00, 0x03]);
    }

    #[test]
    fn empty_packets() {
        assert_eq!(&pingreq().to_bytes().unwrap()[..], &[0xC0, 0x00]);
        assert_eq!(&pingresp().to_bytes().unwrap()[..], &[0xD0, 0x00]);
        assert_eq!(&disconnect().to_bytes().unwrap()[..], &[0xE0, 0x00]);
    }

    #[test]
    fn long_topic_does_not_fit() {
        let bytes = [b'x'; 300];
        let topic = core::str::from_utf8(&bytes).unwrap();
        assert_eq!(
            publish(topic, "", PublishFlags::default()),
            Err(Error::PacketTooLarge)
        );
    }
}
