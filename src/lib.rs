//! # libmqtt - MQTT 3.1.1 for small devices
//!
//! A compact MQTT 3.1.1 control-packet codec plus a blocking client session
//! that runs request/response exchanges (connect, publish, subscribe,
//! unsubscribe, ping, disconnect) over any reliable byte stream.
//!
//! ## Features
//!
//! ### Codec
//! - Bit-packed fixed headers and the variable-length "remaining length" field
//! - Typed, immutable control packets with exact byte serialization
//! - A single-packet decoder that keeps the variable header and payload opaque
//! - Pure builders for every packet a client sends or expects
//!
//! ### Session
//! - Connect handshake and acknowledged exchanges with a bounded wait loop
//! - Unsolicited traffic forwarded to a pluggable message sink
//! - Injectable packet-identifier source
//!
//! ## Usage
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! libmqtt = "0.1.0"
//! ```
//!
//! ### Client Example
//!
//! ```rust,no_run
//! use libmqtt::network::application::mqtt::{Client, ConnectOptions, QoS};
//! # use libmqtt::network::{Connection, Transport};
//! # struct MockTransport;
//! # impl Connection for MockTransport {}
//! # impl Transport for MockTransport {}
//! # impl libmqtt::network::Open for MockTransport {
//! #     type Error = ();
//! #     fn open(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libmqtt::network::Read for MockTransport {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libmqtt::network::Write for MockTransport {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libmqtt::network::Close for MockTransport {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # fn main() -> Result<(), libmqtt::network::application::mqtt::Error> {
//!
//! let mut client = Client::new(MockTransport);
//! let options = ConnectOptions {
//!     username: Some("ranma1988"),
//!     password: Some("secret"),
//!     ..ConnectOptions::new("cupz")
//! };
//!
//! client.connect(&options)?;
//! client.subscribe("ranma1988/feeds/test", QoS::AtLeastOnce)?;
//! client.publish("ranma1988/feeds/test", "ON")?;
//! client.ping()?;
//! client.disconnect()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support and the blocking TCP transport
//! - `async`: Enable async transports and the async client
//! - `defmt`: Enable defmt logging support for embedded debugging

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

// Must come first so the logging macros are visible to every module below.
#[macro_use]
mod fmt;

/// Network abstraction layer: transport traits and the MQTT protocol stack.
///
/// The transport traits describe the byte stream the client talks over; the
/// MQTT codec and session engine live under [`network::application::mqtt`].
pub mod network;
