//! Transport abstraction for the MQTT client.
//!
//! The client never dials sockets itself. It talks to anything implementing
//! [`Transport`]: a byte stream that can be opened, read with a bounded
//! timeout, written and closed. Both blocking and (with the `async` feature)
//! asynchronous flavours are provided.
//!

#![allow(async_fn_in_trait)]
#![deny(unsafe_code)]

/// Common error types for network operations
pub mod error;

/// Application protocols running on top of a transport.
pub mod application;

/// Blocking TCP transport backed by `std::net`.
#[cfg(feature = "std")]
pub mod tcp;

/// Re-exports of common traits
pub mod prelude {
    #[cfg(feature = "async")]
    pub use super::{AsyncClose, AsyncOpen, AsyncRead, AsyncTransport, AsyncWrite};
    pub use super::{Close, Open, Read, Transport, Write};
}

// Core synchronous traits

/// Reading side of a byte stream.
pub trait Read {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read up to `buf.len()` bytes.
    ///
    /// Implementations must not block indefinitely: when nothing arrives
    /// within their timeout they return `Ok(0)`.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Writing side of a byte stream.
pub trait Write {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection, returning how many bytes were accepted
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer
    fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Releases the underlying connection.
pub trait Close {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection
    fn close(self) -> Result<(), Self::Error>;
}

/// Establishes the underlying connection.
pub trait Open {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open the connection. Called once, before the first write.
    fn open(&mut self) -> Result<(), Self::Error>;
}

/// A synchronous connection
pub trait Connection: Read + Write + Close {}

/// A connection the client can open on its own, as the MQTT session expects.
pub trait Transport: Connection + Open {}

/// Write all of `buf`, looping over short writes.
///
/// A write that accepts zero bytes means the peer went away.
pub(crate) fn write_all<W: Write>(writer: &mut W, mut buf: &[u8]) -> Result<(), error::Error> {
    while !buf.is_empty() {
        match writer.write(buf) {
            Ok(0) => return Err(error::Error::ConnectionClosed),
            Ok(n) => buf = &buf[n.min(buf.len())..],
            Err(_) => return Err(error::Error::WriteError),
        }
    }
    writer.flush().map_err(|_| error::Error::WriteError)
}

// Core async traits

/// Reading side of an asynchronous byte stream.
#[cfg(feature = "async")]
pub trait AsyncRead {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Read data from the connection asynchronously; `Ok(0)` on timeout.
    async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error>;
}

/// Writing side of an asynchronous byte stream.
#[cfg(feature = "async")]
pub trait AsyncWrite {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Write data to the connection asynchronously
    async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error>;
    /// Flush the write buffer asynchronously
    async fn flush(&mut self) -> Result<(), Self::Error>;
}

/// Releases an asynchronous connection.
#[cfg(feature = "async")]
pub trait AsyncClose {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Close the connection asynchronously
    async fn close(self) -> Result<(), Self::Error>;
}

/// Establishes an asynchronous connection.
#[cfg(feature = "async")]
pub trait AsyncOpen {
    /// Associated error type
    type Error: core::fmt::Debug;
    /// Open the connection asynchronously
    async fn open(&mut self) -> Result<(), Self::Error>;
}

/// An asynchronous connection
#[cfg(feature = "async")]
pub trait AsyncConnection: AsyncRead + AsyncWrite + AsyncClose {}

/// An asynchronous connection the client can open on its own.
#[cfg(feature = "async")]
pub trait AsyncTransport: AsyncConnection + AsyncOpen {}

#[cfg(feature = "async")]
pub(crate) async fn write_all_async<W: AsyncWrite>(
    writer: &mut W,
    mut buf: &[u8],
) -> Result<(), error::Error> {
    while !buf.is_empty() {
        match writer.write(buf).await {
            Ok(0) => return Err(error::Error::ConnectionClosed),
            Ok(n) => buf = &buf[n.min(buf.len())..],
            Err(_) => return Err(error::Error::WriteError),
        }
    }
    writer.flush().await.map_err(|_| error::Error::WriteError)
}
