//! Blocking MQTT 3.1.1 client session.
//!
//! The [`Client`] drives the connect handshake and every exchange after it
//! over a [`Transport`]. Exactly one exchange is outstanding at a time: each
//! method sends its request and, when the protocol defines a reply, runs the
//! wait loop until the reply is matched, rejected or given up on.
//!
//! # Wait loop
//!
//! Every acknowledged exchange builds the reply it expects with the same
//! [`builder`](super::builder) functions used for requests, then reads up to
//! [`MAX_ATTEMPTS`] packets:
//!
//! - an empty read ends the loop at once with [`Error::Timeout`];
//! - a packet of the expected type (and, for identifier-bearing replies, the
//!   same packet identifier) must encode to exactly the expected bytes,
//!   otherwise the exchange fails with [`Error::UnexpectedResponse`];
//! - anything else is unsolicited and goes to the [`MessageSink`];
//! - running out of attempts fails with [`Error::NoMatch`].
//!
//! # Examples
//!
//! ```rust,no_run
//! use libmqtt::network::application::mqtt::{Client, ConnectOptions, QoS};
//! # use libmqtt::network::{Connection, Transport};
//! # struct TcpConnection;
//! # impl Connection for TcpConnection {}
//! # impl Transport for TcpConnection {}
//! # impl libmqtt::network::Open for TcpConnection {
//! #     type Error = ();
//! #     fn open(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libmqtt::network::Read for TcpConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl libmqtt::network::Write for TcpConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl libmqtt::network::Close for TcpConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # fn main() -> Result<(), libmqtt::network::application::mqtt::Error> {
//! let mut client = Client::new(TcpConnection);
//! client.connect(&ConnectOptions::new("weather_station"))?;
//! client.subscribe("commands/#", QoS::AtLeastOnce)?;
//! client.publish("sensors/temperature", "23.5")?;
//! client.ping()?;
//! client.disconnect()?;
//! # Ok(())
//! # }
//! ```

use super::builder::{self, PublishFlags};
use super::decoder::DecodedPacket;
use super::error::Error;
use super::identifier::{IdentifierSource, SequentialIdentifiers};
use super::options::ConnectOptions;
use super::packet::ControlPacket;
use super::qos::QoS;
use super::session::{Exchange, Session, State, Step, MAX_ATTEMPTS};
use super::sink::{LogSink, MessageSink};
use crate::network::error::Error as NetworkError;
use crate::network::{write_all, Transport};

/// An MQTT 3.1.1 client session over a blocking transport.
///
/// # Type Parameters
///
/// * `T` - The transport implementing [`Transport`]
/// * `I` - Where packet identifiers come from
/// * `S` - Where unsolicited packets go
#[derive(Debug)]
pub struct Client<T: Transport, I = SequentialIdentifiers, S = LogSink> {
    transport: T,
    session: Session<I, S>,
}

impl<T: Transport> Client<T> {
    /// A session with sequential identifiers that logs unsolicited packets.
    pub fn new(transport: T) -> Self {
        Self::with_parts(transport, SequentialIdentifiers::default(), LogSink)
    }
}

impl<T, I, S> Client<T, I, S>
where
    T: Transport,
    I: IdentifierSource,
    S: MessageSink,
{
    /// A session with an explicit identifier source and message sink.
    pub fn with_parts(transport: T, identifiers: I, sink: S) -> Self {
        Self {
            transport,
            session: Session::new(identifiers, sink),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> State {
        self.session.state()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The message sink.
    pub fn sink(&self) -> &S {
        self.session.sink()
    }

    /// Open the transport, send CONNECT and wait for a CONNACK with
    /// session-present clear and return code 0.
    ///
    /// Any mismatch is fatal: the session moves to [`State::Closed`] and
    /// cannot be used again. A CONNACK carrying a non-zero return code is
    /// reported as [`Error::ConnectionRefused`].
    pub fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), Error> {
        let handshake = self.session.begin_connect(options)?;
        if self.transport.open().is_err() {
            return Err(self.session.open_failed());
        }
        info!("transport open, connecting as {=str}", options.client_id);
        let result = self.run(&handshake);
        self.session.finish_connect(result)
    }

    /// Publish `value` to `topic` with QoS 0. No reply is awaited.
    pub fn publish(&mut self, topic: &str, value: &str) -> Result<(), Error> {
        self.publish_with(topic, value, PublishFlags::default())
    }

    /// Publish with the RETAIN flag set.
    pub fn publish_retained(&mut self, topic: &str, value: &str) -> Result<(), Error> {
        let flags = PublishFlags {
            retain: true,
            ..PublishFlags::default()
        };
        self.publish_with(topic, value, flags)
    }

    fn publish_with(&mut self, topic: &str, value: &str, flags: PublishFlags) -> Result<(), Error> {
        self.session.ensure_connected()?;
        let packet = builder::publish(topic, value, flags)?;
        self.send(&packet)
    }

    /// Subscribe to `topic` and wait for a SUBACK granting exactly `qos`
    /// under the identifier that was sent.
    pub fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), Error> {
        let exchange = self.session.subscribe(topic, qos)?;
        self.run(&exchange)
    }

    /// Unsubscribe from `topic` and wait for the matching UNSUBACK.
    pub fn unsubscribe(&mut self, topic: &str) -> Result<(), Error> {
        let exchange = self.session.unsubscribe(topic)?;
        self.run(&exchange)
    }

    /// Send PINGREQ and wait for PINGRESP.
    pub fn ping(&mut self) -> Result<(), Error> {
        let exchange = self.session.ping()?;
        self.run(&exchange)
    }

    /// Return the next packet that arrived outside an exchange, if any.
    ///
    /// Reads at most until the transport comes back empty. The packet is
    /// handed to the caller, not to the sink.
    pub fn poll(&mut self) -> Result<Option<DecodedPacket>, Error> {
        self.session.ensure_connected()?;
        self.try_receive()
    }

    /// Send DISCONNECT and close the transport. No reply is expected.
    ///
    /// On a session whose handshake failed only the close is attempted.
    pub fn disconnect(mut self) -> Result<(), Error> {
        let sent = if self.session.closing()? {
            self.send(&builder::disconnect())
        } else {
            Ok(())
        };
        info!("closing transport");
        let closed = self
            .transport
            .close()
            .map_err(|_| Error::from(NetworkError::ConnectionClosed));
        sent.and(closed)
    }

    fn send(&mut self, packet: &ControlPacket) -> Result<(), Error> {
        let frame = packet.to_bytes()?;
        write_all(&mut self.transport, &frame)?;
        debug!("sent {} ({=usize} bytes)", packet.packet_type(), frame.len());
        Ok(())
    }

    fn run(&mut self, exchange: &Exchange) -> Result<(), Error> {
        self.send(&exchange.request)?;
        self.wait_for(&exchange.expected)
    }

    /// Decode the next packet, reading more until one is complete.
    /// `None` means a read came back empty first.
    fn try_receive(&mut self) -> Result<Option<DecodedPacket>, Error> {
        loop {
            if let Some(packet) = self.session.buffered()? {
                return Ok(Some(packet));
            }
            let n = self
                .transport
                .read(self.session.read_buffer())
                .map_err(|_| NetworkError::ReadError)?;
            if n == 0 {
                return Ok(None);
            }
            self.session.filled(n);
        }
    }

    fn wait_for(&mut self, expected: &ControlPacket) -> Result<(), Error> {
        for attempt in 1..=MAX_ATTEMPTS {
            let received = self.try_receive()?;
            if let Step::Done = self.session.attempt(expected, attempt, received)? {
                return Ok(());
            }
        }
        Err(self.session.give_up(expected))
    }
}
