//! A blocking [`Transport`] over `std::net::TcpStream`.
//!
//! Reads use a socket timeout; a read that times out reports `Ok(0)`, which
//! the MQTT session treats as "no reply".

use super::error::Error;
use super::{Close, Connection, Open, Read, Transport, Write};
use std::io::{ErrorKind, Read as StdRead, Write as StdWrite};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::string::String;
use std::time::Duration;

/// Read timeout applied when none is given.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);

/// A TCP connection to a broker that is dialed on [`Open::open`].
#[derive(Debug)]
pub struct TcpTransport {
    address: String,
    read_timeout: Duration,
    stream: Option<TcpStream>,
}

impl TcpTransport {
    /// Prepare a transport for `address` (`host:port`) without dialing it.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            read_timeout: DEFAULT_READ_TIMEOUT,
            stream: None,
        }
    }

    /// Override the read timeout. A zero duration is ignored.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        if !timeout.is_zero() {
            self.read_timeout = timeout;
        }
        self
    }

    /// Whether [`Open::open`] has succeeded.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    fn stream(&mut self) -> Result<&mut TcpStream, Error> {
        self.stream.as_mut().ok_or(Error::NotOpen)
    }
}

impl Open for TcpTransport {
    type Error = Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        let addr = self
            .address
            .to_socket_addrs()
            .map_err(|_| Error::InvalidAddress)?
            .next()
            .ok_or(Error::InvalidAddress)?;
        let stream = TcpStream::connect(addr).map_err(|e| match e.kind() {
            ErrorKind::TimedOut => Error::Timeout,
            _ => Error::ConnectionRefused,
        })?;
        stream
            .set_read_timeout(Some(self.read_timeout))
            .map_err(|_| Error::ConnectionRefused)?;
        self.stream = Some(stream);
        Ok(())
    }
}

impl Read for TcpTransport {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match self.stream()?.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => Ok(0),
            Err(_) => Err(Error::ReadError),
        }
    }
}

impl Write for TcpTransport {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.stream()?.write(buf).map_err(|_| Error::WriteError)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.stream()?.flush().map_err(|_| Error::WriteError)
    }
}

impl Close for TcpTransport {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        match self.stream {
            Some(stream) => stream
                .shutdown(Shutdown::Both)
                .or_else(|e| match e.kind() {
                    ErrorKind::NotConnected => Ok(()),
                    _ => Err(Error::ConnectionClosed),
                }),
            None => Err(Error::NotOpen),
        }
    }
}

impl Connection for TcpTransport {}

impl Transport for TcpTransport {}
