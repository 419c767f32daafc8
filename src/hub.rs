//! The owned routing context: one hub holds the transport, the device
//! directory, the active selection, the dispatch engine and the inbound
//! router, and exposes the whole application surface.

use crate::directory::{DeviceDescriptor, DeviceDirectory};
use crate::dispatch::Dispatcher;
use crate::router::InboundRouter;
use crate::selection::SelectionManager;
use crate::synth::Synthesizer;
use crate::transport::{InboundMessage, Transport};
use std::sync::Arc;
use std::time::Duration;

/// Capability acquisition progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapState {
    Uninitialized,
    Acquiring,
    Ready,
}

pub struct MidiHub<T: Transport> {
    transport: T,
    directory: DeviceDirectory,
    selection: SelectionManager,
    dispatcher: Dispatcher,
    router: InboundRouter,
    state: BootstrapState,
}

impl<T: Transport> MidiHub<T> {
    pub fn new(transport: T, synth: Arc<dyn Synthesizer>) -> Self {
        let selection = SelectionManager::new();
        let dispatcher = Dispatcher::new(selection.active_outputs(), synth);
        MidiHub {
            transport,
            directory: DeviceDirectory::new(),
            selection,
            dispatcher,
            router: InboundRouter::new(),
            state: BootstrapState::Uninitialized,
        }
    }

    /// Acquire MIDI access and populate both directories.
    ///
    /// `after` runs when the attempt settles, on the granted path and on
    /// the denied path alike, so a caller can chain the rest of its
    /// startup (load the audio engine, then report success) without
    /// racing the acquisition. A denial leaves the hub retryable: call
    /// `connect` again to ask once more.
    pub fn connect<F: FnOnce()>(&mut self, after: F) {
        if self.state == BootstrapState::Ready {
            self.directory.refresh_inputs(&mut self.transport);
            self.directory.refresh_outputs(&mut self.transport);
            after();
            return;
        }

        self.state = BootstrapState::Acquiring;
        match self.transport.request_access() {
            Ok(()) => {
                self.state = BootstrapState::Ready;
                self.directory.refresh_inputs(&mut self.transport);
                self.directory.refresh_outputs(&mut self.transport);
                log::info!(
                    "MIDI ready: {} inputs, {} outputs",
                    self.directory.inputs().len(),
                    self.directory.outputs().len()
                );
            }
            Err(err) => {
                self.state = BootstrapState::Uninitialized;
                log::warn!(
                    "MIDI access unavailable, continuing with the internal device only: {}",
                    err
                );
            }
        }
        after();
    }

    pub fn state(&self) -> BootstrapState {
        self.state
    }

    /// Re-enumerate input devices; returns the rebuilt list.
    pub fn refresh_inputs(&mut self) -> &[DeviceDescriptor] {
        self.directory.refresh_inputs(&mut self.transport)
    }

    /// Re-enumerate output devices; returns the rebuilt list.
    pub fn refresh_outputs(&mut self) -> &[DeviceDescriptor] {
        self.directory.refresh_outputs(&mut self.transport)
    }

    /// Most recently enumerated input devices, internal entry first.
    pub fn inputs(&self) -> &[DeviceDescriptor] {
        self.directory.inputs()
    }

    /// Most recently enumerated output devices, internal entry first.
    pub fn outputs(&self) -> &[DeviceDescriptor] {
        self.directory.outputs()
    }

    /// Select the outputs all subsequent sends fan out to. Ids not in the
    /// directory are skipped; an empty list is a valid selection that
    /// makes sends no-ops.
    pub fn set_outputs(&mut self, ids: &[&str]) -> bool {
        self.selection
            .set_outputs(&mut self.directory, &mut self.transport, ids)
    }

    /// Select the inputs whose messages reach the inbound handler.
    pub fn set_inputs(&mut self, ids: &[&str]) -> bool {
        let callback = self.router.callback();
        self.selection
            .set_inputs(&mut self.directory, &mut self.transport, ids, callback)
    }

    pub fn close_all_outputs(&mut self) {
        self.selection
            .close_all_outputs(&mut self.directory, &mut self.transport);
    }

    pub fn close_all_inputs(&mut self) {
        self.selection
            .close_all_inputs(&mut self.directory, &mut self.transport);
    }

    /// Register the single inbound consumer, replacing any previous one.
    pub fn set_message_handler<F>(&self, handler: F)
    where
        F: FnMut(InboundMessage) + Send + 'static,
    {
        self.router.set_handler(handler);
    }

    pub fn clear_message_handler(&self) {
        self.router.clear_handler();
    }

    pub fn send(&self, data: &[u8], delay: Duration) {
        self.dispatcher.send(data, delay);
    }

    pub fn set_controller(&self, channel: u8, controller: u8, value: u8, delay: Duration) {
        self.dispatcher.set_controller(channel, controller, value, delay);
    }

    pub fn set_volume(&self, channel: u8, volume: u8, delay: Duration) {
        self.dispatcher.set_volume(channel, volume, delay);
    }

    pub fn program_change(&self, channel: u8, program: u8, delay: Duration) {
        self.dispatcher.program_change(channel, program, delay);
    }

    pub fn pitch_bend(&self, channel: u8, value: i32, delay: Duration) {
        self.dispatcher.pitch_bend(channel, value, delay);
    }

    pub fn note_on(&self, channel: u8, note: u8, velocity: u8, delay: Duration) {
        self.dispatcher.note_on(channel, note, velocity, delay);
    }

    pub fn note_off(&self, channel: u8, note: u8, delay: Duration) {
        self.dispatcher.note_off(channel, note, delay);
    }

    pub fn chord_on(&self, channel: u8, chord: &[u8], velocity: u8, delay: Duration) {
        self.dispatcher.chord_on(channel, chord, velocity, delay);
    }

    pub fn chord_off(&self, channel: u8, chord: &[u8], delay: Duration) {
        self.dispatcher.chord_off(channel, chord, delay);
    }

    pub fn stop_all_notes(&self) {
        self.dispatcher.stop_all_notes();
    }
}
