//! Transport-independent half of a client session.
//!
//! [`Client`](super::Client) and the async client only differ in how they
//! write and read bytes. Lifecycle state, identifier
//! allocation, receive buffering and the per-attempt decision of the wait
//! loop live here.

use super::builder;
use super::decoder::DecodedPacket;
use super::error::Error;
use super::identifier::IdentifierSource;
use super::inbox::Inbox;
use super::options::ConnectOptions;
use super::packet::{ControlPacket, ControlPacketType};
use super::qos::{QoS, SubscribeReturnCode};
use super::sink::MessageSink;
use crate::network::error::Error as NetworkError;

/// Reads the wait loop makes before giving up on a reply.
pub const MAX_ATTEMPTS: usize = 4;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Transport not opened yet.
    Disconnected,
    /// CONNECT sent, waiting for CONNACK.
    Connecting,
    /// Handshake complete.
    Connected,
    /// The handshake failed; the transport is unusable.
    Closed,
}

/// A request together with the reply that completes it.
pub(crate) struct Exchange {
    pub(crate) request: ControlPacket,
    pub(crate) expected: ControlPacket,
}

/// What the wait loop does after one attempt.
pub(crate) enum Step {
    Done,
    KeepWaiting,
}

#[derive(Debug)]
pub(crate) struct Session<I, S> {
    identifiers: I,
    sink: S,
    inbox: Inbox,
    state: State,
}

impl<I, S> Session<I, S>
where
    I: IdentifierSource,
    S: MessageSink,
{
    pub(crate) fn new(identifiers: I, sink: S) -> Self {
        Self {
            identifiers,
            sink,
            inbox: Inbox::new(),
            state: State::Disconnected,
        }
    }

    pub(crate) fn state(&self) -> State {
        self.state
    }

    pub(crate) fn sink(&self) -> &S {
        &self.sink
    }

    /// Check the session may connect and build the handshake.
    ///
    /// Nothing changes state until the packets are built, so a rejected
    /// option leaves the session untouched.
    pub(crate) fn begin_connect(
        &mut self,
        options: &ConnectOptions<'_>,
    ) -> Result<Exchange, Error> {
        if self.state != State::Disconnected {
            return Err(Error::AlreadyConnected);
        }
        let exchange = Exchange {
            request: builder::connect(options)?,
            expected: builder::connack(false, 0)?,
        };
        self.state = State::Connecting;
        Ok(exchange)
    }

    pub(crate) fn open_failed(&mut self) -> Error {
        warn!("transport failed to open");
        self.state = State::Closed;
        NetworkError::ConnectionRefused.into()
    }

    pub(crate) fn finish_connect(&mut self, result: Result<(), Error>) -> Result<(), Error> {
        match result {
            Ok(()) => {
                self.state = State::Connected;
                info!("connected");
                Ok(())
            }
            Err(e) => {
                warn!("connect failed: {}", e);
                self.state = State::Closed;
                Err(e)
            }
        }
    }

    pub(crate) fn ensure_connected(&self) -> Result<(), Error> {
        match self.state {
            State::Connected => Ok(()),
            _ => Err(Error::NotConnected),
        }
    }

    pub(crate) fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<Exchange, Error> {
        self.ensure_connected()?;
        let id = self.identifiers.next_identifier();
        Ok(Exchange {
            request: builder::subscribe(id, &[(topic, qos)])?,
            expected: builder::suback(id, &[SubscribeReturnCode::Success(qos)])?,
        })
    }

    pub(crate) fn unsubscribe(&mut self, topic: &str) -> Result<Exchange, Error> {
        self.ensure_connected()?;
        let id = self.identifiers.next_identifier();
        Ok(Exchange {
            request: builder::unsubscribe(id, &[topic])?,
            expected: builder::unsuback(id)?,
        })
    }

    pub(crate) fn ping(&self) -> Result<Exchange, Error> {
        self.ensure_connected()?;
        Ok(Exchange {
            request: builder::pingreq(),
            expected: builder::pingresp(),
        })
    }

    /// Whether closing must send DISCONNECT first. A session that never
    /// tried to open its transport cannot be closed.
    pub(crate) fn closing(&self) -> Result<bool, Error> {
        match self.state {
            State::Disconnected => Err(Error::NotConnected),
            State::Connected => Ok(true),
            State::Connecting | State::Closed => Ok(false),
        }
    }

    /// The next complete packet already buffered.
    pub(crate) fn buffered(&mut self) -> Result<Option<DecodedPacket>, Error> {
        let packet = self.inbox.next_packet()?;
        if let Some(packet) = &packet {
            debug!(
                "received {} ({=usize} bytes, {=usize} buffered)",
                packet.packet_type(),
                packet.consumed(),
                self.inbox.len()
            );
        }
        Ok(packet)
    }

    /// Where the next transport read goes.
    pub(crate) fn read_buffer(&mut self) -> &mut [u8] {
        self.inbox.spare_mut()
    }

    pub(crate) fn filled(&mut self, n: usize) {
        trace!("read {=usize} bytes", n);
        self.inbox.commit(n);
    }

    /// Handle what one wait attempt produced. `None` is an empty read.
    pub(crate) fn attempt(
        &mut self,
        expected: &ControlPacket,
        attempt: usize,
        received: Option<DecodedPacket>,
    ) -> Result<Step, Error> {
        let Some(packet) = received else {
            warn!("no reply while waiting for {}", expected.packet_type());
            return Err(Error::Timeout);
        };
        match correlate(expected, &packet)? {
            Correlation::Matched => Ok(Step::Done),
            Correlation::Unsolicited => {
                debug!(
                    "attempt {=usize}: forwarding unsolicited {}",
                    attempt,
                    packet.packet_type()
                );
                self.sink.deliver(&packet);
                Ok(Step::KeepWaiting)
            }
        }
    }

    pub(crate) fn give_up(&self, expected: &ControlPacket) -> Error {
        warn!("gave up waiting for {}", expected.packet_type());
        Error::NoMatch
    }
}

/// How a received packet relates to the reply being waited for.
pub(crate) enum Correlation {
    Matched,
    Unsolicited,
}

/// Compare `packet` against the expected reply.
///
/// SUBACK and UNSUBACK only count as a response when their identifier
/// matches; a stale acknowledgement for some other identifier is unsolicited
/// traffic.
pub(crate) fn correlate(
    expected: &ControlPacket,
    packet: &DecodedPacket,
) -> Result<Correlation, Error> {
    if packet.packet_type() != expected.packet_type() || !same_identifier(expected, packet) {
        return Ok(Correlation::Unsolicited);
    }
    if packet.matches(expected)? {
        Ok(Correlation::Matched)
    } else {
        warn!("{} does not match the expected reply", packet.packet_type());
        Err(mismatch(packet))
    }
}

fn same_identifier(expected: &ControlPacket, packet: &DecodedPacket) -> bool {
    match expected.packet_type() {
        ControlPacketType::Suback | ControlPacketType::Unsuback => {
            packet.body().get(..2) == expected.variable_header().get(..2)
        }
        _ => true,
    }
}

fn mismatch(packet: &DecodedPacket) -> Error {
    match (packet.packet_type(), packet.body()) {
        (ControlPacketType::Connack, &[_, code]) if code != 0 => Error::ConnectionRefused(code),
        (kind, _) => Error::UnexpectedResponse(kind),
    }
}
