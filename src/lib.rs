//! MIDI device routing and message dispatch core
//!
//! midipatchrs manages a dynamic set of MIDI endpoints and routes
//! channel-voice messages between an application and every active device,
//! including a virtual "internal" device that redirects standard MIDI
//! semantics into a [`Synthesizer`](synth::Synthesizer) implementation.
//!
//! The main components are:
//! - [`MidiHub`] — the owned context tying everything together
//! - [`directory::DeviceDirectory`] — enumerated endpoints, internal first
//! - [`selection::SelectionManager`] — active sets and open/close lifecycle
//! - [`dispatch::Dispatcher`] — fan-out sends with optional delay
//! - [`router::InboundRouter`] — single-consumer inbound funnel
//! - [`transport`] — the platform seam, real (midir) and mock

pub mod cli;
pub mod codec;
pub mod directory;
pub mod dispatch;
pub mod hub;
pub mod logging;
pub mod router;
pub mod scheduler;
pub mod selection;
pub mod synth;
pub mod transport;

pub use directory::{DeviceDescriptor, INTERNAL_ID};
pub use hub::{BootstrapState, MidiHub};
pub use scheduler::{Scheduler, ThreadScheduler};
pub use synth::Synthesizer;
pub use transport::{DefaultTransport, InboundMessage, Transport};
