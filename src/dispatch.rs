//! Multi-destination send with optional delayed scheduling.
//!
//! A send fans out to every endpoint in the active output set, in
//! selection order. External destinations get the raw bytes; the internal
//! destination gets the message translated into synthesizer calls. Every
//! destination is independent and best-effort: a dead transport on one
//! never blocks the others, and nothing is reported back to the caller.

use crate::codec::{self, SynthCommand};
use crate::directory::OutputEndpoint;
use crate::scheduler::{Scheduler, ThreadScheduler};
use crate::synth::Synthesizer;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub struct Dispatcher {
    outputs: Arc<Mutex<Vec<OutputEndpoint>>>,
    synth: Arc<dyn Synthesizer>,
    scheduler: ThreadScheduler,
}

impl Dispatcher {
    pub fn new(outputs: Arc<Mutex<Vec<OutputEndpoint>>>, synth: Arc<dyn Synthesizer>) -> Self {
        Dispatcher {
            outputs,
            synth,
            scheduler: ThreadScheduler::new(),
        }
    }

    /// Send raw bytes to every active output. With a non-zero delay the
    /// whole send is rescheduled, and the active set is read when it
    /// fires, so a selection change in the meantime redirects the message
    /// and a since-closed destination becomes a swallowed send failure.
    pub fn send(&self, data: &[u8], delay: Duration) {
        if delay > Duration::ZERO {
            let outputs = Arc::clone(&self.outputs);
            let synth = Arc::clone(&self.synth);
            let data = data.to_vec();
            self.scheduler
                .schedule(delay, move || fan_out(&outputs, synth.as_ref(), &data));
        } else {
            fan_out(&self.outputs, self.synth.as_ref(), data);
        }
    }

    pub fn set_controller(&self, channel: u8, controller: u8, value: u8, delay: Duration) {
        self.send(&codec::control_change(channel, controller, value), delay);
    }

    pub fn set_volume(&self, channel: u8, volume: u8, delay: Duration) {
        self.send(&codec::volume(channel, volume), delay);
    }

    pub fn program_change(&self, channel: u8, program: u8, delay: Duration) {
        self.send(&codec::program_change(channel, program), delay);
    }

    pub fn pitch_bend(&self, channel: u8, value: i32, delay: Duration) {
        self.send(&codec::pitch_bend(channel, value), delay);
    }

    pub fn note_on(&self, channel: u8, note: u8, velocity: u8, delay: Duration) {
        self.send(&codec::note_on(channel, note, velocity), delay);
    }

    pub fn note_off(&self, channel: u8, note: u8, delay: Duration) {
        self.send(&codec::note_off(channel, note), delay);
    }

    /// Note-on for every note in the chord, as independent sends sharing
    /// channel, velocity and delay.
    pub fn chord_on(&self, channel: u8, chord: &[u8], velocity: u8, delay: Duration) {
        for &note in chord {
            self.note_on(channel, note, velocity, delay);
        }
    }

    pub fn chord_off(&self, channel: u8, chord: &[u8], delay: Duration) {
        for &note in chord {
            self.note_off(channel, note, delay);
        }
    }

    /// All-notes-off on every channel, immediately.
    pub fn stop_all_notes(&self) {
        for channel in 0..16 {
            self.send(&codec::all_notes_off(channel), Duration::ZERO);
        }
    }
}

fn fan_out(outputs: &Mutex<Vec<OutputEndpoint>>, synth: &dyn Synthesizer, data: &[u8]) {
    // Snapshot the set so transport sends happen outside the set lock.
    let destinations = match outputs.lock() {
        Ok(active) => active.clone(),
        Err(_) => return,
    };
    for destination in &destinations {
        match destination {
            OutputEndpoint::Internal => dispatch_internal(synth, data),
            OutputEndpoint::External(port) => {
                if let Ok(mut guard) = port.lock() {
                    if let Err(err) = guard.send(data) {
                        log::debug!("send failed, continuing with other outputs: {}", err);
                    }
                }
            }
        }
    }
}

fn dispatch_internal(synth: &dyn Synthesizer, data: &[u8]) {
    match codec::decode(data) {
        Some(SynthCommand::NoteOff { channel, note }) => {
            synth.note_off(channel, note, Duration::ZERO)
        }
        Some(SynthCommand::NoteOn { channel, note, velocity }) => {
            synth.note_on(channel, note, velocity, Duration::ZERO)
        }
        Some(SynthCommand::ProgramChange { channel, program }) => {
            synth.program_change(channel, program, Duration::ZERO)
        }
        Some(SynthCommand::PitchBend { channel, value }) => {
            synth.pitch_bend(channel, value, Duration::ZERO)
        }
        Some(SynthCommand::StopAllNotes) => synth.stop_all_notes(),
        None => {}
    }
}
