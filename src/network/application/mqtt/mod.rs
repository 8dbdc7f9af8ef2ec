//! MQTT 3.1.1 protocol implementation for embedded systems.
//!
//! Two layers live here. The codec turns control packets into exact byte
//! sequences and back; the session drives request/response exchanges with a
//! broker over a [`Transport`](crate::network::Transport).
//!
//! # Codec
//!
//! - [`remaining_length`]: the base-128 length field of the fixed header
//! - [`ControlPacket`] / [`FixedHeader`]: immutable packets with exact
//!   serialization
//! - [`decode`]: one packet out of a byte buffer, body kept opaque
//! - [`builder`]: every packet a client sends or expects to receive
//!
//! # Session
//!
//! [`Client`] (and [`AsyncClient`] with the `async` feature) keep exactly one
//! exchange in flight. Replies are matched byte-for-byte against the packet
//! the builders produce; anything else that arrives meanwhile is handed to a
//! [`MessageSink`].
//!
//! Only QoS 0 publishing is supported. Will messages, retransmission,
//! reconnection and keep-alive scheduling are left to the caller.
//!
//! ```rust
//! use libmqtt::network::application::mqtt::{builder, decode, ControlPacketType};
//!
//! let ping = builder::pingreq().to_bytes().unwrap();
//! assert_eq!(&ping[..], &[0xC0, 0x00]);
//!
//! let reply = decode(&[0xD0, 0x00]).unwrap();
//! assert_eq!(reply.packet_type(), ControlPacketType::Pingresp);
//! ```

pub mod builder;
pub mod remaining_length;

mod client;
mod decoder;
mod error;
mod identifier;
mod inbox;
mod options;
mod packet;
mod qos;
mod session;
mod sink;

#[cfg(feature = "async")]
mod async_client;

#[cfg(feature = "async")]
pub use async_client::AsyncClient;
pub use builder::PublishFlags;
pub use client::Client;
pub use decoder::{decode, Body, DecodedPacket, Publish};
pub use error::{Error, Malformed, Unsupported};
pub use identifier::{IdentifierSource, PacketIdentifier, SequentialIdentifiers};
pub use options::{ConnectOptions, LastWill, DEFAULT_KEEP_ALIVE_SECONDS};
pub use packet::{
    ControlPacket, ControlPacketType, FixedHeader, Frame, Payload, VariableHeader, MAX_BODY_SIZE,
    MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE, MAX_VARIABLE_HEADER_SIZE,
};
pub use qos::{QoS, SubscribeReturnCode};
pub use session::{State, MAX_ATTEMPTS};
pub use sink::{LogSink, MessageSink};
