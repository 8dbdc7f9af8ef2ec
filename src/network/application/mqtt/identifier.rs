//! Packet identifiers and where they come from.

/// A 16-bit value correlating SUBSCRIBE/UNSUBSCRIBE with their acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketIdentifier(pub u16);

impl PacketIdentifier {
    /// Big-endian wire form.
    pub fn to_bytes(self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for PacketIdentifier {
    fn from(id: u16) -> Self {
        PacketIdentifier(id)
    }
}

/// Supplies a fresh identifier for each acknowledged exchange.
///
/// The client asks for one identifier per SUBSCRIBE/UNSUBSCRIBE and never
/// has two exchanges outstanding, so sources need no bookkeeping of
/// identifiers in use.
///
/// Any `FnMut() -> PacketIdentifier` closure is a source, which makes it
/// easy to plug in a seeded random generator.
pub trait IdentifierSource {
    /// Return the identifier for the next exchange.
    fn next_identifier(&mut self) -> PacketIdentifier;
}

impl<F> IdentifierSource for F
where
    F: FnMut() -> PacketIdentifier,
{
    fn next_identifier(&mut self) -> PacketIdentifier {
        self()
    }
}

/// Counts 1, 2, ... 65535 and wraps back to 1. Zero is never handed out.
#[derive(Debug, Clone)]
pub struct SequentialIdentifiers {
    next: u16,
}

impl SequentialIdentifiers {
    /// Start counting from `first` (0 is bumped to 1).
    pub fn starting_at(first: u16) -> Self {
        Self { next: first.max(1) }
    }
}

impl Default for SequentialIdentifiers {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdentifierSource for SequentialIdentifiers {
    fn next_identifier(&mut self) -> PacketIdentifier {
        let id = self.next;
        self.next = self.next.checked_add(1).unwrap_or(1);
        PacketIdentifier(id)
    }
}
