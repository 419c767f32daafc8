//! Enumerated device lists with the synthetic internal entry.
//!
//! Each refresh rebuilds the list and the id lookup wholesale; nothing is
//! patched incrementally, and refreshing never touches the active
//! selection. Without transport access the directory degrades to the
//! internal entry alone.

use crate::transport::{SharedInputPort, SharedOutputPort, Transport};
use std::collections::HashMap;

/// Reserved id of the internal pseudo-device, always first in both lists.
pub const INTERNAL_ID: &str = "internal";

const INTERNAL_INPUT_NAME: &str = "On-Screen Keyboard";
const INTERNAL_OUTPUT_NAME: &str = "Internal Synthesizer";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    pub id: String,
    pub name: String,
}

/// An output destination: the internal synthesizer or a transport handle.
#[derive(Clone)]
pub enum OutputEndpoint {
    Internal,
    External(SharedOutputPort),
}

/// An inbound source: the internal on-screen keyboard or a transport handle.
#[derive(Clone)]
pub enum InputEndpoint {
    Internal,
    External(SharedInputPort),
}

pub struct DeviceDirectory {
    inputs: Vec<DeviceDescriptor>,
    outputs: Vec<DeviceDescriptor>,
    input_lookup: HashMap<String, InputEndpoint>,
    output_lookup: HashMap<String, OutputEndpoint>,
}

impl DeviceDirectory {
    pub fn new() -> Self {
        let mut directory = DeviceDirectory {
            inputs: Vec::new(),
            outputs: Vec::new(),
            input_lookup: HashMap::new(),
            output_lookup: HashMap::new(),
        };
        directory.reset_inputs();
        directory.reset_outputs();
        directory
    }

    fn reset_inputs(&mut self) {
        self.inputs = vec![DeviceDescriptor {
            id: INTERNAL_ID.to_string(),
            name: INTERNAL_INPUT_NAME.to_string(),
        }];
        self.input_lookup = HashMap::new();
        self.input_lookup
            .insert(INTERNAL_ID.to_string(), InputEndpoint::Internal);
    }

    fn reset_outputs(&mut self) {
        self.outputs = vec![DeviceDescriptor {
            id: INTERNAL_ID.to_string(),
            name: INTERNAL_OUTPUT_NAME.to_string(),
        }];
        self.output_lookup = HashMap::new();
        self.output_lookup
            .insert(INTERNAL_ID.to_string(), OutputEndpoint::Internal);
    }

    /// Rebuild the input list and lookup from the transport.
    pub fn refresh_inputs<T: Transport>(&mut self, transport: &mut T) -> &[DeviceDescriptor] {
        self.reset_inputs();
        for device in transport.list_inputs() {
            if device.id == INTERNAL_ID || self.input_lookup.contains_key(&device.id) {
                log::debug!("skipping input with reserved or duplicate id {:?}", device.id);
                continue;
            }
            self.inputs.push(DeviceDescriptor {
                id: device.id.clone(),
                name: device.name,
            });
            self.input_lookup
                .insert(device.id, InputEndpoint::External(device.port));
        }
        log::debug!("input directory rebuilt: {} entries", self.inputs.len());
        &self.inputs
    }

    /// Rebuild the output list and lookup from the transport.
    pub fn refresh_outputs<T: Transport>(&mut self, transport: &mut T) -> &[DeviceDescriptor] {
        self.reset_outputs();
        for device in transport.list_outputs() {
            if device.id == INTERNAL_ID || self.output_lookup.contains_key(&device.id) {
                log::debug!("skipping output with reserved or duplicate id {:?}", device.id);
                continue;
            }
            self.outputs.push(DeviceDescriptor {
                id: device.id.clone(),
                name: device.name,
            });
            self.output_lookup
                .insert(device.id, OutputEndpoint::External(device.port));
        }
        log::debug!("output directory rebuilt: {} entries", self.outputs.len());
        &self.outputs
    }

    /// Most recently built input list.
    pub fn inputs(&self) -> &[DeviceDescriptor] {
        &self.inputs
    }

    /// Most recently built output list.
    pub fn outputs(&self) -> &[DeviceDescriptor] {
        &self.outputs
    }

    pub fn input_endpoint(&self, id: &str) -> Option<&InputEndpoint> {
        self.input_lookup.get(id)
    }

    pub fn output_endpoint(&self, id: &str) -> Option<&OutputEndpoint> {
        self.output_lookup.get(id)
    }
}

impl Default for DeviceDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    #[test]
    fn test_new_directory_contains_only_internal() {
        let directory = DeviceDirectory::new();
        assert_eq!(directory.inputs().len(), 1);
        assert_eq!(directory.outputs().len(), 1);
        assert_eq!(directory.inputs()[0].id, INTERNAL_ID);
        assert_eq!(directory.outputs()[0].id, INTERNAL_ID);
    }

    #[test]
    fn test_refresh_prepends_internal_entry() {
        let mut transport = MockTransport::with_devices(
            &[("in-a", "Keys A")],
            &[("out-a", "Synth A"), ("out-b", "Synth B")],
        );
        transport.request_access().unwrap();
        let mut directory = DeviceDirectory::new();

        let outputs = directory.refresh_outputs(&mut transport).to_vec();
        assert_eq!(outputs[0].id, INTERNAL_ID);
        assert_eq!(outputs[1].id, "out-a");
        assert_eq!(outputs[2].id, "out-b");

        let inputs = directory.refresh_inputs(&mut transport).to_vec();
        assert_eq!(inputs[0].id, INTERNAL_ID);
        assert_eq!(inputs[1].name, "Keys A");
    }

    #[test]
    fn test_refresh_without_access_degrades_to_internal_only() {
        let mut transport =
            MockTransport::with_devices(&[("in-a", "Keys A")], &[("out-a", "Synth A")]);
        let mut directory = DeviceDirectory::new();

        directory.refresh_inputs(&mut transport);
        directory.refresh_outputs(&mut transport);
        assert_eq!(directory.inputs().len(), 1);
        assert_eq!(directory.outputs().len(), 1);
    }

    #[test]
    fn test_refresh_replaces_previous_list() {
        let mut transport = MockTransport::with_devices(&[], &[("out-a", "Synth A")]);
        transport.request_access().unwrap();
        let mut directory = DeviceDirectory::new();
        directory.refresh_outputs(&mut transport);
        assert_eq!(directory.outputs().len(), 2);

        transport.add_output_device("out-b", "Synth B");
        directory.refresh_outputs(&mut transport);
        assert_eq!(directory.outputs().len(), 3);
        assert!(directory.output_endpoint("out-b").is_some());
    }

    #[test]
    fn test_reserved_id_from_transport_is_skipped() {
        let mut transport =
            MockTransport::with_devices(&[], &[(INTERNAL_ID, "Impostor"), ("out-a", "Synth A")]);
        transport.request_access().unwrap();
        let mut directory = DeviceDirectory::new();
        let outputs = directory.refresh_outputs(&mut transport);
        assert_eq!(outputs.len(), 2);
        assert_eq!(outputs[0].name, "Internal Synthesizer");
        assert!(matches!(
            directory.output_endpoint(INTERNAL_ID),
            Some(OutputEndpoint::Internal)
        ));
    }
}
