//! Device transport layer for midipatchrs
//!
//! The core never talks to a platform MIDI stack directly; everything goes
//! through the [`Transport`] trait and its per-device port handles:
//! - [`Transport`] for access acquisition and endpoint enumeration
//! - [`InputPort`] / [`OutputPort`] for the device lifecycle and raw bytes
//! - [`MidirTransport`] for real devices via midir
//! - [`MockTransport`] for testing
//!
//! Listings hand out *stable* handles: the same device id yields the same
//! shared port across repeated enumerations within a session, so a close
//! issued after a directory rebuild still reaches a connection opened
//! before it.

pub mod midir_transport;
pub mod mock_transport;

pub use midir_transport::MidirTransport;
pub use mock_transport::{MockTransport, TransportLog};

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};

// Set default transport type
pub type DefaultTransport = MidirTransport;

/// Custom error type for transport operations
#[derive(Debug)]
pub enum TransportError {
    /// Access to the platform MIDI capability was refused
    AccessDenied(String),
    /// Error while opening a device or creating a client
    ConnectionFailed(String),
    /// Error while sending raw bytes to an output
    SendFailed(String),
    /// Error while closing a device
    CloseFailed(String),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::AccessDenied(msg) => write!(f, "MIDI access denied: {}", msg),
            TransportError::ConnectionFailed(msg) => write!(f, "MIDI connection error: {}", msg),
            TransportError::SendFailed(msg) => write!(f, "MIDI send error: {}", msg),
            TransportError::CloseFailed(msg) => write!(f, "MIDI close error: {}", msg),
        }
    }
}

impl Error for TransportError {}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// A raw message delivered by an active input, carrying the transport's
/// own metadata (timestamp, originating device) alongside the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub device_id: String,
    pub timestamp_us: u64,
    pub data: Vec<u8>,
}

/// Callback bound into input ports; delivery may happen on a transport
/// thread, so it has to be shareable and thread-safe.
pub type InboundCallback = Arc<dyn Fn(InboundMessage) + Send + Sync>;

/// An open-able destination for raw MIDI bytes.
///
/// `open` on an already-open port and `close` on an already-closed port
/// are no-ops, so repeated selection of the same device id is safe.
pub trait OutputPort: Send {
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn send(&mut self, data: &[u8]) -> Result<()>;
}

/// A source of inbound MIDI messages.
///
/// The handler must be bound with [`InputPort::set_handler`] before
/// `open`; clearing it stops delivery even if the platform keeps the
/// connection alive.
pub trait InputPort: Send {
    fn open(&mut self) -> Result<()>;
    fn close(&mut self) -> Result<()>;
    fn set_handler(&mut self, handler: Option<InboundCallback>);
}

pub type SharedOutputPort = Arc<Mutex<dyn OutputPort>>;
pub type SharedInputPort = Arc<Mutex<dyn InputPort>>;

/// An enumerated input endpoint: descriptor fields plus its stable handle.
pub struct InputDevice {
    pub id: String,
    pub name: String,
    pub port: SharedInputPort,
}

/// An enumerated output endpoint: descriptor fields plus its stable handle.
pub struct OutputDevice {
    pub id: String,
    pub name: String,
    pub port: SharedOutputPort,
}

/// Trait defining the interface to a platform MIDI stack.
///
/// Before [`Transport::request_access`] succeeds, the listings are empty;
/// enumeration failures also degrade to empty lists rather than erroring.
pub trait Transport {
    /// One-shot capability acquisition. Blocks until granted or denied.
    fn request_access(&mut self) -> Result<()>;

    /// Whether access has been granted.
    fn has_access(&self) -> bool;

    /// Current input endpoints, in platform order.
    fn list_inputs(&mut self) -> Vec<InputDevice>;

    /// Current output endpoints, in platform order.
    fn list_outputs(&mut self) -> Vec<OutputDevice>;
}
