use clap::Parser;
use crossbeam::channel;
use indicatif::{ProgressBar, ProgressStyle};
use midipatchrs::{
    cli::{prompt_selection, validate_device, Args},
    codec, logging,
    synth::LogSynth,
    DefaultTransport, DeviceDescriptor, InboundMessage, MidiHub,
};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() {
    initialize_logging();
    let args = Args::parse();

    let transport = DefaultTransport::new("midipatchrs");
    let mut hub = MidiHub::new(transport, Arc::new(LogSynth::new()));
    hub.connect(|| log::info!("MIDI bootstrap finished"));

    if args.device_list {
        list_available_devices(&hub);
        return;
    }

    let output_ids = pick_devices(&args.outputs, hub.outputs(), args.test_note, "output");
    if !output_ids.is_empty() {
        let ids: Vec<&str> = output_ids.iter().map(String::as_str).collect();
        hub.set_outputs(&ids);
        println!("Sending to: {}", output_ids.join(", "));
    }

    if args.test_note {
        send_test_note(&hub);
    }

    let input_ids = pick_devices(&args.inputs, hub.inputs(), args.monitor, "input");
    if !input_ids.is_empty() {
        let ids: Vec<&str> = input_ids.iter().map(String::as_str).collect();
        hub.set_inputs(&ids);
        println!("Listening on: {}", input_ids.join(", "));
        run_monitor(&hub);
    }
}

fn initialize_logging() {
    logging::init_logger().expect("Logger initialization failed");
    log::info!("Application starting");
}

fn list_available_devices<T: midipatchrs::Transport>(hub: &MidiHub<T>) {
    println!("Available MIDI inputs:");
    for device in hub.inputs() {
        println!("  - {} ({})", device.name, device.id);
    }
    println!("Available MIDI outputs:");
    for device in hub.outputs() {
        println!("  - {} ({})", device.name, device.id);
    }
}

/// Explicit ids are validated against the directory; with none given, an
/// interactive pick runs when the id set is actually needed.
fn pick_devices(
    requested: &[String],
    devices: &[DeviceDescriptor],
    wanted: bool,
    kind: &str,
) -> Vec<String> {
    if !requested.is_empty() {
        for id in requested {
            if let Err(error_msg) = validate_device(id, devices) {
                log::error!("{}", error_msg);
                eprintln!("{}", error_msg);
                std::process::exit(1);
            }
        }
        return requested.to_vec();
    }
    if wanted {
        return prompt_selection(kind, devices);
    }
    Vec::new()
}

fn send_test_note<T: midipatchrs::Transport>(hub: &MidiHub<T>) {
    log::info!("Sending test note (Middle C)");
    println!("Sending test note...");
    hub.note_on(0, 60, 100, Duration::ZERO);
    hub.note_off(0, 60, Duration::from_millis(500));
    // Keep the process alive until the delayed note-off has fired
    thread::sleep(Duration::from_millis(700));
}

fn run_monitor<T: midipatchrs::Transport>(hub: &MidiHub<T>) {
    let (sender, receiver) = channel::unbounded();
    hub.set_message_handler(move |message: InboundMessage| {
        let _ = sender.send(message);
    });

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message("Listening for MIDI input. Press Ctrl+C to exit...");
    spinner.enable_steady_tick(Duration::from_millis(120));

    for message in receiver.iter() {
        let stamp = chrono::Local::now().format("%H:%M:%S%.3f");
        spinner.println(format!(
            "[{}] {} | {}",
            stamp,
            message.device_id,
            codec::format_hex(&message.data)
        ));
        log::debug!("inbound from {}: {:?}", message.device_id, message.data);
    }
}
