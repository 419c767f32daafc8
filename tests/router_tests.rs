use midipatchrs::synth::MockSynth;
use midipatchrs::transport::{MockTransport, TransportLog};
use midipatchrs::{InboundMessage, MidiHub};
use std::sync::{Arc, Mutex};

fn hub_with_inputs(
    inputs: &[(&str, &str)],
) -> (MidiHub<MockTransport>, TransportLog) {
    let transport = MockTransport::with_devices(inputs, &[]);
    let log = transport.log();
    let mut hub = MidiHub::new(transport, Arc::new(MockSynth::new()));
    hub.connect(|| {});
    (hub, log)
}

fn collecting_handler(
    hub: &MidiHub<MockTransport>,
) -> Arc<Mutex<Vec<InboundMessage>>> {
    let received = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&received);
    hub.set_message_handler(move |message| sink.lock().unwrap().push(message));
    received
}

#[test]
fn test_inbound_message_reaches_the_handler_unchanged() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A")]);
    hub.set_inputs(&["in-a"]);
    let received = collecting_handler(&hub);

    assert!(log.deliver("in-a", &[0x90, 60, 100]));

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].device_id, "in-a");
    assert_eq!(received[0].data, vec![0x90, 60, 100]);
}

#[test]
fn test_all_active_inputs_funnel_into_one_handler() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A"), ("in-b", "Keys B")]);
    hub.set_inputs(&["in-a", "in-b"]);
    let received = collecting_handler(&hub);

    log.deliver("in-a", &[0x90, 60, 100]);
    log.deliver("in-b", &[0x80, 60, 0]);

    let received = received.lock().unwrap();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].device_id, "in-a");
    assert_eq!(received[1].device_id, "in-b");
}

#[test]
fn test_without_a_registered_handler_messages_are_dropped() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A")]);
    hub.set_inputs(&["in-a"]);

    // The port is bound to the router, so delivery happens, but the
    // router has no consumer and drops silently.
    assert!(log.deliver("in-a", &[0x90, 60, 100]));
}

#[test]
fn test_clearing_the_handler_stops_forwarding() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A")]);
    hub.set_inputs(&["in-a"]);
    let received = collecting_handler(&hub);

    log.deliver("in-a", &[0x90, 60, 100]);
    hub.clear_message_handler();
    log.deliver("in-a", &[0x90, 62, 100]);

    assert_eq!(received.lock().unwrap().len(), 1);
}

#[test]
fn test_stray_messages_after_close_are_not_delivered() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A")]);
    hub.set_inputs(&["in-a"]);
    let received = collecting_handler(&hub);

    hub.set_inputs(&[]);
    // The mock still delivers, as some transports do after a close; the
    // cleared port binding has to drop it.
    assert!(!log.deliver("in-a", &[0x90, 60, 100]));
    assert!(received.lock().unwrap().is_empty());
}

#[test]
fn test_replacing_the_handler_redirects_messages() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A")]);
    hub.set_inputs(&["in-a"]);

    let first = collecting_handler(&hub);
    log.deliver("in-a", &[0xF8]);
    let second = collecting_handler(&hub);
    log.deliver("in-a", &[0xF8]);

    assert_eq!(first.lock().unwrap().len(), 1);
    assert_eq!(second.lock().unwrap().len(), 1);
}

#[test]
fn test_timestamps_arrive_with_the_message() {
    let (mut hub, log) = hub_with_inputs(&[("in-a", "Keys A")]);
    hub.set_inputs(&["in-a"]);
    let received = collecting_handler(&hub);

    log.deliver("in-a", &[0x90, 60, 100]);
    log.deliver("in-a", &[0x80, 60, 0]);

    let received = received.lock().unwrap();
    assert!(received[0].timestamp_us < received[1].timestamp_us);
}
