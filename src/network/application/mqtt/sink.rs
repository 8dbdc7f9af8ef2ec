//! Destination for packets that arrive while no exchange wants them.

use super::decoder::DecodedPacket;

/// Receives unsolicited packets seen during a wait loop, such as PUBLISH
/// deliveries for an existing subscription.
///
/// Any `FnMut(&DecodedPacket)` closure is a sink.
pub trait MessageSink {
    /// Take one unsolicited packet.
    fn deliver(&mut self, packet: &DecodedPacket);
}

impl<F> MessageSink for F
where
    F: FnMut(&DecodedPacket),
{
    fn deliver(&mut self, packet: &DecodedPacket) {
        self(packet)
    }
}

/// Default sink: logs the packet and drops it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl MessageSink for LogSink {
    fn deliver(&mut self, packet: &DecodedPacket) {
        match packet.publish() {
            Ok(Some(publish)) => info!(
                "message on {=str}: {=[u8]}",
                publish.topic,
                publish.payload
            ),
            _ => info!(
                "unsolicited {} ({=usize} bytes)",
                packet.packet_type(),
                packet.consumed()
            ),
        }
    }
}
