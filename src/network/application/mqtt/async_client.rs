//! Asynchronous MQTT 3.1.1 client session.
//!
//! [`AsyncClient`] runs the same exchanges and the same wait loop as the
//! blocking [`Client`](super::Client), over an [`AsyncTransport`]. It is
//! executor-agnostic: every method is a plain `async fn`.

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
use crate::network::{write_all_async, AsyncTransport};

/// An MQTT 3.1.1 client session over an asynchronous transport.
#[derive(Debug)]
pub struct AsyncClient<T: AsyncTransport, I = SequentialIdentifiers, S = LogSink> {
    transport: T,
    session: Session<I, S>,
}

impl<T: AsyncTransport> AsyncClient<T> {
    /// A session with sequential identifiers that logs unsolicited packets.
    pub fn new(transport: T) -> Self {
        Self::with_parts(transport, SequentialIdentifiers::default(), LogSink)
    }
}

impl<T, I, S> AsyncClient<T, I, S>
where
    T: AsyncTransport,
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

    /// Open the transport and complete the CONNECT / CONNACK handshake.
    pub async fn connect(&mut self, options: &ConnectOptions<'_>) -> Result<(), Error> {
        let handshake = self.session.begin_connect(options)?;
        if self.transport.open().await.is_err() {
            return Err(self.session.open_failed());
        }
        info!("transport open, connecting as {=str}", options.client_id);
        let result = self.run(&handshake).await;
        self.session.finish_connect(result)
    }

    /// Publish `value` to `topic` with QoS 0.
    pub async fn publish(&mut self, topic: &str, value: &str) -> Result<(), Error> {
        self.publish_with(topic, value, PublishFlags::default()).await
    }

    /// Publish with the RETAIN flag set.
    pub async fn publish_retained(&mut self, topic: &str, value: &str) -> Result<(), Error> {
        let flags = PublishFlags {
            retain: true,
            ..PublishFlags::default()
        };
        self.publish_with(topic, value, flags).await
    }

    async fn publish_with(
        &mut self,
        topic: &str,
        value: &str,
        flags: PublishFlags,
    ) -> Result<(), Error> {
        self.session.ensure_connected()?;
        let packet = builder::publish(topic, value, flags)?;
        self.send(&packet).await
    }

    /// Subscribe to `topic` and wait for a SUBACK granting exactly `qos`.
    pub async fn subscribe(&mut self, topic: &str, qos: QoS) -> Result<(), Error> {
        let exchange = self.session.subscribe(topic, qos)?;
        self.run(&exchange).await
    }

    /// Unsubscribe from `topic` and wait for the matching UNSUBACK.
    pub async fn unsubscribe(&mut self, topic: &str) -> Result<(), Error> {
        let exchange = self.session.unsubscribe(topic)?;
        self.run(&exchange).await
    }

    /// Send PINGREQ and wait for PINGRESP.
    pub async fn ping(&mut self) -> Result<(), Error> {
        let exchange = self.session.ping()?;
        self.run(&exchange).await
    }

    /// Return the next packet that arrived outside an exchange, if any.
    pub async fn poll(&mut self) -> Result<Option<DecodedPacket>, Error> {
        self.session.ensure_connected()?;
        self.try_receive().await
    }

    /// Send DISCONNECT and close the transport.
    pub async fn disconnect(mut self) -> Result<(), Error> {
        let sent = if self.session.closing()? {
            self.send(&builder::disconnect()).await
        } else {
            Ok(())
        };
        info!("closing transport");
        let closed = self
            .transport
            .close()
            .await
            .map_err(|_| Error::from(NetworkError::ConnectionClosed));
        sent.and(closed)
    }

    async fn send(&mut self, packet: &ControlPacket) -> Result<(), Error> {
        let frame = packet.to_bytes()?;
        write_all_async(&mut self.transport, &frame).await?;
        debug!("sent {} ({=usize} bytes)", packet.packet_type(), frame.len());
        Ok(())
    }

    async fn run(&mut self, exchange: &Exchange) -> Result<(), Error> {
        self.send(&exchange.request).await?;
        self.wait_for(&exchange.expected).await
    }

    async fn try_receive(&mut self) -> Result<Option<DecodedPacket>, Error> {
        loop {
            if let Some(packet) = self.session.buffered()? {
                return Ok(Some(packet));
            }
            let n = self
                .transport
                .read(self.session.read_buffer())
                .await
                .map_err(|_| NetworkError::ReadError)?;
            if n == 0 {
                return Ok(None);
            }
            self.session.filled(n);
        }
    }

    async fn wait_for(&mut self, expected: &ControlPacket) -> Result<(), Error> {
        for attempt in 1..=MAX_ATTEMPTS {
            let received = self.try_receive().await?;
            if let Step::Done = self.session.attempt(expected, attempt, received)? {
                return Ok(());
            }
        }
        Err(self.session.give_up(expected))
    }
}
