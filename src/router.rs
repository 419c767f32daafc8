//! Inbound routing: every active input funnels into one handler slot.
//!
//! Messages are forwarded unchanged, metadata included; with no handler
//! registered they are dropped. The slot is re-checked on every delivery,
//! so a transport that keeps calling back after its input was closed hits
//! an empty slot instead of a stale consumer.

use crate::transport::{InboundCallback, InboundMessage};
use std::sync::{Arc, Mutex};

type Handler = Box<dyn FnMut(InboundMessage) + Send>;

#[derive(Clone, Default)]
pub struct InboundRouter {
    handler: Arc<Mutex<Option<Handler>>>,
}

impl InboundRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the single consumer, replacing any previous one.
    pub fn set_handler<F>(&self, handler: F)
    where
        F: FnMut(InboundMessage) + Send + 'static,
    {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = Some(Box::new(handler));
        }
    }

    pub fn clear_handler(&self) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = None;
        }
    }

    pub fn has_handler(&self) -> bool {
        self.handler
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }

    /// Forward a message to the registered handler, if any.
    pub fn deliver(&self, message: InboundMessage) {
        if let Ok(mut slot) = self.handler.lock() {
            if let Some(handler) = slot.as_mut() {
                handler(message);
            }
        }
    }

    /// The transport-facing callback bound into each active input.
    pub fn callback(&self) -> InboundCallback {
        let router = self.clone();
        Arc::new(move |message| router.deliver(message))
    }
}
