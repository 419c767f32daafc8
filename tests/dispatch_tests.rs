use midipatchrs::synth::{MockSynth, SynthCall};
use midipatchrs::transport::{MockTransport, TransportLog};
use midipatchrs::MidiHub;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn hub_with_outputs(
    outputs: &[(&str, &str)],
) -> (MidiHub<MockTransport>, TransportLog, Arc<MockSynth>) {
    let transport = MockTransport::with_devices(&[], outputs);
    let log = transport.log();
    let synth = Arc::new(MockSynth::new());
    let mut hub = MidiHub::new(transport, synth.clone());
    hub.connect(|| {});
    (hub, log, synth)
}

#[test]
fn test_internal_note_on_calls_synth_and_skips_transport() {
    let (mut hub, log, synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    assert!(hub.set_outputs(&["internal"]));

    hub.note_on(0, 60, 100, Duration::ZERO);

    assert_eq!(
        synth.calls(),
        vec![SynthCall::NoteOn {
            channel: 0,
            note: 60,
            velocity: 100,
            delay: Duration::ZERO
        }]
    );
    assert!(log.sends().is_empty());
}

#[test]
fn test_stop_all_notes_covers_all_channels_on_every_destination() {
    let (mut hub, log, synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    assert!(hub.set_outputs(&["internal", "out-a"]));

    hub.stop_all_notes();

    let calls = synth.calls();
    assert_eq!(calls.len(), 16);
    assert!(calls.iter().all(|call| *call == SynthCall::StopAllNotes));

    let sends = log.sends_to("out-a");
    assert_eq!(sends.len(), 16);
    for (channel, data) in sends.iter().enumerate() {
        assert_eq!(data, &vec![0xB0 | channel as u8, 0x7B, 0]);
    }
}

#[test]
fn test_chord_on_sends_one_note_on_per_note() {
    let (mut hub, log, _synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    hub.set_outputs(&["out-a"]);

    hub.chord_on(0, &[60, 64, 67], 100, Duration::ZERO);

    assert_eq!(
        log.sends_to("out-a"),
        vec![
            vec![0x90, 60, 100],
            vec![0x90, 64, 100],
            vec![0x90, 67, 100],
        ]
    );
}

#[test]
fn test_chord_off_releases_every_note() {
    let (mut hub, log, _synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    hub.set_outputs(&["out-a"]);

    hub.chord_off(1, &[60, 64], Duration::ZERO);

    assert_eq!(
        log.sends_to("out-a"),
        vec![vec![0x81, 60, 0], vec![0x81, 64, 0]]
    );
}

#[test]
fn test_empty_selection_makes_sends_a_no_op() {
    let (mut hub, log, synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    assert!(hub.set_outputs(&[]));

    hub.note_on(0, 60, 100, Duration::ZERO);
    hub.stop_all_notes();

    assert!(log.sends().is_empty());
    assert!(synth.calls().is_empty());
    // Selection and directory are independent: the directory is intact
    assert_eq!(hub.outputs().len(), 2);
}

#[test]
fn test_duplicate_selection_fans_out_twice() {
    let (mut hub, log, _synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    hub.set_outputs(&["out-a", "out-a"]);

    hub.note_on(0, 60, 100, Duration::ZERO);

    assert_eq!(
        log.sends_to("out-a"),
        vec![vec![0x90, 60, 100], vec![0x90, 60, 100]]
    );
}

#[test]
fn test_internal_ignores_untranslatable_messages() {
    let (mut hub, _log, synth) = hub_with_outputs(&[]);
    hub.set_outputs(&["internal"]);

    // Polyphonic pressure and a bare volume controller have no synth call
    hub.send(&[0xA0, 60, 50], Duration::ZERO);
    hub.set_volume(0, 90, Duration::ZERO);

    assert!(synth.calls().is_empty());
}

#[test]
fn test_internal_translates_program_change_and_pitch_bend() {
    let (mut hub, _log, synth) = hub_with_outputs(&[]);
    hub.set_outputs(&["internal"]);

    hub.program_change(2, 19, Duration::ZERO);
    hub.pitch_bend(3, 8192, Duration::ZERO);

    assert_eq!(
        synth.calls(),
        vec![
            SynthCall::ProgramChange {
                channel: 2,
                program: 19,
                delay: Duration::ZERO
            },
            SynthCall::PitchBend {
                channel: 3,
                value: 8192,
                delay: Duration::ZERO
            },
        ]
    );
}

#[test]
fn test_delayed_send_fires_after_the_delay() {
    let (mut hub, log, _synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    hub.set_outputs(&["out-a"]);

    hub.send(&[0x90, 60, 100], Duration::from_millis(100));
    assert!(log.sends().is_empty());

    // Generous margin for scheduler jitter
    thread::sleep(Duration::from_millis(300));
    assert_eq!(log.sends_to("out-a"), vec![vec![0x90, 60, 100]]);
}

#[test]
fn test_delayed_internal_send_reaches_synth_with_zero_delay() {
    let (mut hub, _log, synth) = hub_with_outputs(&[]);
    hub.set_outputs(&["internal"]);

    hub.note_on(5, 72, 64, Duration::from_millis(50));
    assert!(synth.calls().is_empty());

    thread::sleep(Duration::from_millis(250));
    assert_eq!(
        synth.calls(),
        vec![SynthCall::NoteOn {
            channel: 5,
            note: 72,
            velocity: 64,
            delay: Duration::ZERO
        }]
    );
}

#[test]
fn test_delayed_send_uses_selection_at_fire_time() {
    let (mut hub, log, _synth) =
        hub_with_outputs(&[("out-a", "Synth A"), ("out-b", "Synth B")]);
    hub.set_outputs(&["out-a"]);

    hub.send(&[0x90, 60, 100], Duration::from_millis(100));
    hub.set_outputs(&["out-b"]);

    thread::sleep(Duration::from_millis(300));
    assert!(log.sends_to("out-a").is_empty());
    assert_eq!(log.sends_to("out-b"), vec![vec![0x90, 60, 100]]);
}

#[test]
fn test_dead_destination_does_not_block_the_others() {
    let (mut hub, log, _synth) =
        hub_with_outputs(&[("out-a", "Synth A"), ("out-b", "Synth B")]);
    hub.set_outputs(&["out-a", "out-b"]);

    log.force_close_output("out-a");
    hub.note_on(0, 60, 100, Duration::ZERO);

    assert!(log.sends_to("out-a").is_empty());
    assert_eq!(log.sends_to("out-b"), vec![vec![0x90, 60, 100]]);
}

#[test]
fn test_channel_is_masked_on_the_way_out() {
    let (mut hub, log, _synth) = hub_with_outputs(&[("out-a", "Synth A")]);
    hub.set_outputs(&["out-a"]);

    // Channel 17 behaves as channel 1
    hub.note_on(17, 60, 100, Duration::ZERO);

    assert_eq!(log.sends_to("out-a"), vec![vec![0x91, 60, 100]]);
}
