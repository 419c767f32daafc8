use crate::directory::DeviceDescriptor;
use clap::Parser;
use dialoguer::MultiSelect;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// List available MIDI devices
    #[arg(long)]
    pub device_list: bool,

    /// Output device id to send to (repeat for multiple destinations)
    #[arg(long = "output", value_name = "ID")]
    pub outputs: Vec<String>,

    /// Input device id to listen on (repeat for multiple sources)
    #[arg(long = "input", value_name = "ID")]
    pub inputs: Vec<String>,

    /// Send a test note (middle C) to the selected outputs
    #[arg(long)]
    pub test_note: bool,

    /// Print inbound messages from the selected inputs
    #[arg(long)]
    pub monitor: bool,
}

pub fn validate_device(device_id: &str, devices: &[DeviceDescriptor]) -> Result<(), String> {
    if !devices.iter().any(|device| device.id == device_id) {
        let mut error_msg = format!(
            "Error: Device '{}' not found in available devices:\n",
            device_id
        );
        for device in devices {
            error_msg.push_str(&format!("  - {} ({})\n", device.id, device.name));
        }
        return Err(error_msg);
    }
    Ok(())
}

/// Interactive multi-select over the directory; returns the picked ids.
/// A non-interactive terminal yields an empty pick.
pub fn prompt_selection(kind: &str, devices: &[DeviceDescriptor]) -> Vec<String> {
    let labels: Vec<String> = devices
        .iter()
        .map(|device| format!("{} ({})", device.name, device.id))
        .collect();
    let picks = MultiSelect::new()
        .with_prompt(format!("Select {} devices", kind))
        .items(&labels)
        .interact()
        .unwrap_or_default();
    picks
        .into_iter()
        .filter_map(|index| devices.get(index).map(|device| device.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptors() -> Vec<DeviceDescriptor> {
        vec![
            DeviceDescriptor {
                id: "internal".to_string(),
                name: "Internal Synthesizer".to_string(),
            },
            DeviceDescriptor {
                id: "out-a".to_string(),
                name: "Synth A".to_string(),
            },
        ]
    }

    #[test]
    fn test_validate_device_accepts_known_id() {
        assert!(validate_device("out-a", &descriptors()).is_ok());
        assert!(validate_device("internal", &descriptors()).is_ok());
    }

    #[test]
    fn test_validate_device_lists_alternatives_for_unknown_id() {
        let err = validate_device("out-z", &descriptors()).unwrap_err();
        assert!(err.contains("out-z"));
        assert!(err.contains("out-a"));
    }
}
