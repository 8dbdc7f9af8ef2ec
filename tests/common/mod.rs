#![allow(dead_code)]

use libmqtt::network::application::mqtt::remaining_length;
use libmqtt::network::error::Error;
use libmqtt::network::*;
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// What the broker side of a [`ScriptedTransport`] saw and will say.
#[derive(Debug, Default)]
pub struct Wire {
    /// Chunks handed out one per read. An empty chunk reads as a timeout.
    pub replies: VecDeque<Vec<u8>>,
    /// Every byte the client wrote, in order.
    pub written: Vec<u8>,
    pub opened: bool,
    pub closed: bool,
    pub refuse_open: bool,
    pub fail_reads: bool,
}

/// A transport that replays canned broker replies.
///
/// The wire is shared so tests can still inspect it after the client has
/// consumed the transport on disconnect.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    wire: Rc<RefCell<Wire>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wire(&self) -> Rc<RefCell<Wire>> {
        Rc::clone(&self.wire)
    }

    /// Queue one read's worth of bytes.
    pub fn reply(&self, bytes: &[u8]) -> &Self {
        self.wire.borrow_mut().replies.push_back(bytes.to_vec());
        self
    }

    /// Queue a read that comes back empty.
    pub fn silence(&self) -> &Self {
        self.reply(&[])
    }

    pub fn refuse_open(&self) {
        self.wire.borrow_mut().refuse_open = true;
    }

    pub fn fail_reads(&self) {
        self.wire.borrow_mut().fail_reads = true;
    }

    pub fn written(&self) -> Vec<u8> {
        self.wire.borrow().written.clone()
    }

    pub fn clear_written(&self) {
        self.wire.borrow_mut().written.clear();
    }
}

impl Open for ScriptedTransport {
    type Error = Error;

    fn open(&mut self) -> Result<(), Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if wire.refuse_open {
            return Err(Error::ConnectionRefused);
        }
        wire.opened = true;
        Ok(())
    }
}

impl Read for ScriptedTransport {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if !wire.opened {
            return Err(Error::NotOpen);
        }
        if wire.fail_reads {
            return Err(Error::ReadError);
        }
        let Some(mut chunk) = wire.replies.pop_front() else {
            return Ok(0);
        };
        let n = chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&chunk[..n]);
        if n < chunk.len() {
            wire.replies.push_front(chunk.split_off(n));
        }
        Ok(n)
    }
}

impl Write for ScriptedTransport {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if !wire.opened || wire.closed {
            return Err(Error::NotOpen);
        }
        wire.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for ScriptedTransport {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        let mut wire = self.wire.borrow_mut();
        if !wire.opened {
            return Err(Error::NotOpen);
        }
        wire.closed = true;
        Ok(())
    }
}

impl Connection for ScriptedTransport {}
impl Transport for ScriptedTransport {}

#[cfg(feature = "async")]
mod async_impls {
    use super::*;

    impl AsyncOpen for ScriptedTransport {
        type Error = Error;
        async fn open(&mut self) -> Result<(), Self::Error> {
            Open::open(self)
        }
    }

    impl AsyncRead for ScriptedTransport {
        type Error = Error;
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            Read::read(self, buf)
        }
    }

    impl AsyncWrite for ScriptedTransport {
        type Error = Error;
        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            Write::write(self, buf)
        }
        async fn flush(&mut self) -> Result<(), Self::Error> {
            Write::flush(self)
        }
    }

    impl AsyncClose for ScriptedTransport {
        type Error = Error;
        async fn close(self) -> Result<(), Self::Error> {
            Close::close(self)
        }
    }

    impl AsyncConnection for ScriptedTransport {}
    impl AsyncTransport for ScriptedTransport {}
}

/// CONNACK accepting a clean session.
pub const CONNACK_OK: [u8; 4] = [0x20, 0x02, 0x00, 0x00];

/// PINGRESP.
pub const PINGRESP: [u8; 2] = [0xD0, 0x00];

/// A QoS 0 PUBLISH of `payload` on `topic`, as a broker would forward it.
pub fn publish_frame(topic: &str, payload: &[u8]) -> Vec<u8> {
    let remaining = 2 + topic.len() + payload.len();
    assert!(remaining < 128);
    let mut frame = vec![0x30, remaining as u8];
    frame.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    frame.extend_from_slice(topic.as_bytes());
    frame.extend_from_slice(payload);
    frame
}

/// A PUBLISH whose body is too large for the client's buffers.
pub fn oversized_publish(topic: &str, payload_len: usize) -> Vec<u8> {
    let remaining = 2 + topic.len() + payload_len;
    let mut frame = vec![0x30];
    let length = remaining_length::encode(remaining).unwrap();
    frame.extend_from_slice(&length);
    frame.extend_from_slice(&(topic.len() as u16).to_be_bytes());
    frame.extend_from_slice(topic.as_bytes());
    frame.resize(frame.len() + payload_len, b'x');
    frame
}
