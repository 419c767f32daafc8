use crate::transport::{
    InboundCallback, InboundMessage, InputDevice, InputPort, OutputDevice, OutputPort, Result,
    Transport, TransportError,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Scripted transport for tests: fixed device lists, optional access
/// denial, and a shared [`TransportLog`] that records opens, closes and
/// sends and can inject inbound traffic.
pub struct MockTransport {
    grant_access: bool,
    acquired: bool,
    input_order: Vec<String>,
    output_order: Vec<String>,
    names: HashMap<String, String>,
    log: TransportLog,
}

impl MockTransport {
    pub fn new() -> Self {
        MockTransport {
            grant_access: true,
            acquired: false,
            input_order: Vec::new(),
            output_order: Vec::new(),
            names: HashMap::new(),
            log: TransportLog::default(),
        }
    }

    /// Transport with scripted `(id, name)` devices.
    pub fn with_devices(inputs: &[(&str, &str)], outputs: &[(&str, &str)]) -> Self {
        let mut transport = MockTransport::new();
        for (id, name) in inputs {
            transport.add_input_device(id, name);
        }
        for (id, name) in outputs {
            transport.add_output_device(id, name);
        }
        transport
    }

    /// Transport whose access request is refused.
    pub fn denied() -> Self {
        let mut transport = MockTransport::new();
        transport.grant_access = false;
        transport
    }

    /// Handle onto the shared recording; clone it out before moving the
    /// transport into the hub.
    pub fn log(&self) -> TransportLog {
        self.log.clone()
    }

    pub fn add_input_device(&mut self, id: &str, name: &str) {
        self.input_order.push(id.to_string());
        self.names.insert(id.to_string(), name.to_string());
        let port = Arc::new(Mutex::new(MockInputPort {
            id: id.to_string(),
            open: false,
            handler: None,
            records: self.log.records.clone(),
        }));
        if let Ok(mut ports) = self.log.input_ports.lock() {
            ports.insert(id.to_string(), port);
        }
    }

    pub fn add_output_device(&mut self, id: &str, name: &str) {
        self.output_order.push(id.to_string());
        self.names.insert(id.to_string(), name.to_string());
        let port = Arc::new(Mutex::new(MockOutputPort {
            id: id.to_string(),
            open: false,
            fail_close: false,
            records: self.log.records.clone(),
        }));
        if let Ok(mut ports) = self.log.output_ports.lock() {
            ports.insert(id.to_string(), port);
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for MockTransport {
    fn request_access(&mut self) -> Result<()> {
        if !self.grant_access {
            return Err(TransportError::AccessDenied(
                "mock access refused".to_string(),
            ));
        }
        self.acquired = true;
        Ok(())
    }

    fn has_access(&self) -> bool {
        self.acquired
    }

    fn list_inputs(&mut self) -> Vec<InputDevice> {
        if !self.acquired {
            return Vec::new();
        }
        let ports = match self.log.input_ports.lock() {
            Ok(ports) => ports,
            Err(_) => return Vec::new(),
        };
        self.input_order
            .iter()
            .filter_map(|id| {
                ports.get(id).map(|port| InputDevice {
                    id: id.clone(),
                    name: self.names.get(id).cloned().unwrap_or_default(),
                    port: port.clone() as crate::transport::SharedInputPort,
                })
            })
            .collect()
    }

    fn list_outputs(&mut self) -> Vec<OutputDevice> {
        if !self.acquired {
            return Vec::new();
        }
        let ports = match self.log.output_ports.lock() {
            Ok(ports) => ports,
            Err(_) => return Vec::new(),
        };
        self.output_order
            .iter()
            .filter_map(|id| {
                ports.get(id).map(|port| OutputDevice {
                    id: id.clone(),
                    name: self.names.get(id).cloned().unwrap_or_default(),
                    port: port.clone() as crate::transport::SharedOutputPort,
                })
            })
            .collect()
    }
}

/// Shared side-channel of a [`MockTransport`]: recorded activity plus
/// hooks for injecting inbound messages and scripting close failures.
#[derive(Clone, Default)]
pub struct TransportLog {
    records: Arc<Mutex<Records>>,
    input_ports: Arc<Mutex<HashMap<String, Arc<Mutex<MockInputPort>>>>>,
    output_ports: Arc<Mutex<HashMap<String, Arc<Mutex<MockOutputPort>>>>>,
}

#[derive(Default)]
struct Records {
    sends: Vec<(String, Vec<u8>)>,
    opens: Vec<String>,
    closes: Vec<String>,
    timestamp_us: u64,
}

impl TransportLog {
    /// All successful sends, in order, as `(device id, bytes)`.
    pub fn sends(&self) -> Vec<(String, Vec<u8>)> {
        self.records
            .lock()
            .map(|records| records.sends.clone())
            .unwrap_or_default()
    }

    /// Bytes successfully sent to one device, in order.
    pub fn sends_to(&self, id: &str) -> Vec<Vec<u8>> {
        self.sends()
            .into_iter()
            .filter(|(device, _)| device == id)
            .map(|(_, data)| data)
            .collect()
    }

    /// Device ids whose ports were opened, in order.
    pub fn opens(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.opens.clone())
            .unwrap_or_default()
    }

    /// Device ids on which a close was attempted, in order.
    pub fn closes(&self) -> Vec<String> {
        self.records
            .lock()
            .map(|records| records.closes.clone())
            .unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.sends.clear();
            records.opens.clear();
            records.closes.clear();
        }
    }

    /// Inject an inbound message on an input device. Delivery ignores the
    /// open flag on purpose: real transports may keep delivering after a
    /// close, and the core has to drop those via the cleared handler.
    /// Returns whether a handler saw the message.
    pub fn deliver(&self, id: &str, data: &[u8]) -> bool {
        let port = match self.input_ports.lock() {
            Ok(ports) => ports.get(id).cloned(),
            Err(_) => None,
        };
        let port = match port {
            Some(port) => port,
            None => return false,
        };
        let (handler, timestamp_us) = {
            let guard = match port.lock() {
                Ok(guard) => guard,
                Err(_) => return false,
            };
            let timestamp_us = self
                .records
                .lock()
                .map(|mut records| {
                    records.timestamp_us += 1;
                    records.timestamp_us
                })
                .unwrap_or_default();
            (guard.handler.clone(), timestamp_us)
        };
        match handler {
            Some(handler) => {
                handler(InboundMessage {
                    device_id: id.to_string(),
                    timestamp_us,
                    data: data.to_vec(),
                });
                true
            }
            None => false,
        }
    }

    /// Whether an input currently has a bound inbound handler.
    pub fn input_handler_bound(&self, id: &str) -> bool {
        self.input_ports
            .lock()
            .ok()
            .and_then(|ports| ports.get(id).cloned())
            .and_then(|port| port.lock().ok().map(|guard| guard.handler.is_some()))
            .unwrap_or(false)
    }

    pub fn input_open(&self, id: &str) -> bool {
        self.input_ports
            .lock()
            .ok()
            .and_then(|ports| ports.get(id).cloned())
            .and_then(|port| port.lock().ok().map(|guard| guard.open))
            .unwrap_or(false)
    }

    pub fn output_open(&self, id: &str) -> bool {
        self.output_ports
            .lock()
            .ok()
            .and_then(|ports| ports.get(id).cloned())
            .and_then(|port| port.lock().ok().map(|guard| guard.open))
            .unwrap_or(false)
    }

    /// Yank the named output: mark it closed without going through the
    /// core, so the next send to it fails.
    pub fn force_close_output(&self, id: &str) {
        if let Ok(ports) = self.output_ports.lock() {
            if let Some(port) = ports.get(id) {
                if let Ok(mut guard) = port.lock() {
                    guard.open = false;
                }
            }
        }
    }

    /// Script the named output to reject close calls.
    pub fn fail_close_on(&self, id: &str) {
        if let Ok(ports) = self.output_ports.lock() {
            if let Some(port) = ports.get(id) {
                if let Ok(mut guard) = port.lock() {
                    guard.fail_close = true;
                }
            }
        }
    }
}

struct MockInputPort {
    id: String,
    open: bool,
    handler: Option<InboundCallback>,
    records: Arc<Mutex<Records>>,
}

impl InputPort for MockInputPort {
    fn open(&mut self) -> Result<()> {
        if !self.open {
            self.open = true;
            if let Ok(mut records) = self.records.lock() {
                records.opens.push(self.id.clone());
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Ok(mut records) = self.records.lock() {
            records.closes.push(self.id.clone());
        }
        self.open = false;
        Ok(())
    }

    fn set_handler(&mut self, handler: Option<InboundCallback>) {
        self.handler = handler;
    }
}

struct MockOutputPort {
    id: String,
    open: bool,
    fail_close: bool,
    records: Arc<Mutex<Records>>,
}

impl OutputPort for MockOutputPort {
    fn open(&mut self) -> Result<()> {
        if !self.open {
            self.open = true;
            if let Ok(mut records) = self.records.lock() {
                records.opens.push(self.id.clone());
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Ok(mut records) = self.records.lock() {
            records.closes.push(self.id.clone());
        }
        if self.fail_close {
            return Err(TransportError::CloseFailed(format!(
                "mock output {:?} refuses to close",
                self.id
            )));
        }
        self.open = false;
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.open {
            return Err(TransportError::SendFailed(format!(
                "mock output {:?} is not open",
                self.id
            )));
        }
        if let Ok(mut records) = self.records.lock() {
            records.sends.push((self.id.clone(), data.to_vec()));
        }
        Ok(())
    }
}
