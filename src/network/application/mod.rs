//! # Application Layer Network Protocols
//!
//! Protocols that run on top of a [`Transport`](crate::network::Transport).
//!
//! ## Available Protocols
//!
//! - **[`mqtt`]**: MQTT 3.1.1 codec and client session
//!
//! ## Design Principles
//!
//! - **Connection Agnostic**: Work with any type implementing [`Transport`](crate::network::Transport)
//! - **No-std Compatible**: Designed for embedded systems without heap allocation
//! - **Resource Conscious**: Use fixed-size buffers and minimal memory

/// MQTT codec and client implementation.
///
/// Provides the MQTT 3.1.1 packet codec and a blocking client session for
/// lightweight publish-subscribe messaging, commonly used in IoT applications.
pub mod mqtt;
