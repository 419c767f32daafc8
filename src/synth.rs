//! The consumed synthesizer interface.
//!
//! Sound generation lives outside this crate; the dispatch engine only
//! ever reaches it through [`Synthesizer`]. Calls may arrive from delayed
//! send threads, so implementations take `&self` and handle their own
//! interior mutability.

use std::sync::Mutex;
use std::time::Duration;

/// Trait defining the high-level call surface of the embedded synthesizer.
///
/// The `delay` argument mirrors the synthesizer's own interface; the
/// dispatch engine always passes zero because any requested delay has
/// already elapsed by the time the message is translated.
pub trait Synthesizer: Send + Sync {
    fn note_on(&self, channel: u8, note: u8, velocity: u8, delay: Duration);
    fn note_off(&self, channel: u8, note: u8, delay: Duration);
    fn program_change(&self, channel: u8, program: u8, delay: Duration);
    fn pitch_bend(&self, channel: u8, value: u16, delay: Duration);
    fn stop_all_notes(&self);
}

/// Synthesizer stand-in for the CLI: logs every call it receives.
#[derive(Default)]
pub struct LogSynth;

impl LogSynth {
    pub fn new() -> Self {
        LogSynth
    }
}

impl Synthesizer for LogSynth {
    fn note_on(&self, channel: u8, note: u8, velocity: u8, _delay: Duration) {
        log::info!("synth: note on ch={} note={} vel={}", channel, note, velocity);
    }

    fn note_off(&self, channel: u8, note: u8, _delay: Duration) {
        log::info!("synth: note off ch={} note={}", channel, note);
    }

    fn program_change(&self, channel: u8, program: u8, _delay: Duration) {
        log::info!("synth: program change ch={} program={}", channel, program);
    }

    fn pitch_bend(&self, channel: u8, value: u16, _delay: Duration) {
        log::info!("synth: pitch bend ch={} value={}", channel, value);
    }

    fn stop_all_notes(&self) {
        log::info!("synth: stop all notes");
    }
}

/// One recorded call on a [`MockSynth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthCall {
    NoteOn { channel: u8, note: u8, velocity: u8, delay: Duration },
    NoteOff { channel: u8, note: u8, delay: Duration },
    ProgramChange { channel: u8, program: u8, delay: Duration },
    PitchBend { channel: u8, value: u16, delay: Duration },
    StopAllNotes,
}

/// Recording synthesizer for tests.
#[derive(Default)]
pub struct MockSynth {
    calls: Mutex<Vec<SynthCall>>,
}

impl MockSynth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SynthCall> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.clear();
        }
    }

    fn record(&self, call: SynthCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl Synthesizer for MockSynth {
    fn note_on(&self, channel: u8, note: u8, velocity: u8, delay: Duration) {
        self.record(SynthCall::NoteOn { channel, note, velocity, delay });
    }

    fn note_off(&self, channel: u8, note: u8, delay: Duration) {
        self.record(SynthCall::NoteOff { channel, note, delay });
    }

    fn program_change(&self, channel: u8, program: u8, delay: Duration) {
        self.record(SynthCall::ProgramChange { channel, program, delay });
    }

    fn pitch_bend(&self, channel: u8, value: u16, delay: Duration) {
        self.record(SynthCall::PitchBend { channel, value, delay });
    }

    fn stop_all_notes(&self) {
        self.record(SynthCall::StopAllNotes);
    }
}
