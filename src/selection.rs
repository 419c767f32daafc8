//! Active device sets and the open/close lifecycle.
//!
//! The selection is the only writer of the active sets; replacing a set
//! always releases the previous one first, and releases are best-effort:
//! a transport that rejects a close is logged and ignored, never a reason
//! to abort selecting the rest.

use crate::directory::{DeviceDirectory, InputEndpoint, OutputEndpoint};
use crate::transport::{InboundCallback, Transport};
use std::sync::{Arc, Mutex};

pub struct SelectionManager {
    active_outputs: Arc<Mutex<Vec<OutputEndpoint>>>,
    active_inputs: Vec<InputEndpoint>,
}

impl SelectionManager {
    pub fn new() -> Self {
        SelectionManager {
            active_outputs: Arc::new(Mutex::new(Vec::new())),
            active_inputs: Vec::new(),
        }
    }

    /// Shared handle onto the active output set, read by the dispatch
    /// engine (including its delayed send threads).
    pub fn active_outputs(&self) -> Arc<Mutex<Vec<OutputEndpoint>>> {
        Arc::clone(&self.active_outputs)
    }

    /// Replace the active output set with the endpoints named by `ids`,
    /// in order. Unknown ids are skipped silently; duplicates fan out
    /// twice by design. Previously open outputs are released first.
    pub fn set_outputs<T: Transport>(
        &mut self,
        directory: &mut DeviceDirectory,
        transport: &mut T,
        ids: &[&str],
    ) -> bool {
        self.close_all_outputs(directory, transport);

        let mut next = Vec::new();
        for id in ids {
            match directory.output_endpoint(id) {
                Some(OutputEndpoint::Internal) => next.push(OutputEndpoint::Internal),
                Some(OutputEndpoint::External(port)) => {
                    if let Ok(mut guard) = port.lock() {
                        if let Err(err) = guard.open() {
                            log::warn!("could not open output {:?}: {}", id, err);
                        }
                    }
                    next.push(OutputEndpoint::External(Arc::clone(port)));
                }
                None => log::debug!("output id {:?} not in directory, skipping", id),
            }
        }

        if let Ok(mut active) = self.active_outputs.lock() {
            *active = next;
        }
        true
    }

    /// Replace the active input set. Each external endpoint gets the
    /// router callback bound before the transport is asked to open it.
    pub fn set_inputs<T: Transport>(
        &mut self,
        directory: &mut DeviceDirectory,
        transport: &mut T,
        ids: &[&str],
        callback: InboundCallback,
    ) -> bool {
        self.close_all_inputs(directory, transport);

        let mut next = Vec::new();
        for id in ids {
            match directory.input_endpoint(id) {
                Some(InputEndpoint::Internal) => next.push(InputEndpoint::Internal),
                Some(InputEndpoint::External(port)) => {
                    if let Ok(mut guard) = port.lock() {
                        guard.set_handler(Some(callback.clone()));
                        if let Err(err) = guard.open() {
                            log::warn!("could not open input {:?}: {}", id, err);
                        }
                    }
                    next.push(InputEndpoint::External(Arc::clone(port)));
                }
                None => log::debug!("input id {:?} not in directory, skipping", id),
            }
        }

        self.active_inputs = next;
        log::debug!("{} active inputs after selection", self.active_inputs.len());
        true
    }

    /// Re-enumerate, then release every non-internal output the directory
    /// knows about, not just the active ones. Close failures are
    /// discarded: devices are released best-effort.
    pub fn close_all_outputs<T: Transport>(
        &mut self,
        directory: &mut DeviceDirectory,
        transport: &mut T,
    ) {
        directory.refresh_outputs(transport);
        for descriptor in directory.outputs() {
            if let Some(OutputEndpoint::External(port)) = directory.output_endpoint(&descriptor.id)
            {
                if let Ok(mut guard) = port.lock() {
                    if let Err(err) = guard.close() {
                        log::debug!("close of output {:?} failed, ignoring: {}", descriptor.id, err);
                    }
                }
            }
        }
    }

    /// Re-enumerate, then unbind and release every non-internal input the
    /// directory knows about. Clearing the handler first means a transport
    /// that keeps delivering after a rejected close no longer reaches the
    /// router.
    pub fn close_all_inputs<T: Transport>(
        &mut self,
        directory: &mut DeviceDirectory,
        transport: &mut T,
    ) {
        directory.refresh_inputs(transport);
        for descriptor in directory.inputs() {
            if let Some(InputEndpoint::External(port)) = directory.input_endpoint(&descriptor.id) {
                if let Ok(mut guard) = port.lock() {
                    guard.set_handler(None);
                    if let Err(err) = guard.close() {
                        log::debug!("close of input {:?} failed, ignoring: {}", descriptor.id, err);
                    }
                }
            }
        }
    }
}

impl Default for SelectionManager {
    fn default() -> Self {
        Self::new()
    }
}
