use crate::transport::{
    InboundCallback, InboundMessage, InputDevice, InputPort, OutputDevice, OutputPort, Result,
    Transport, TransportError,
};
use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort, MidiOutput, MidiOutputConnection, MidiOutputPort};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Real transport over midir.
///
/// Device ids are port names; midir addresses ports by name, and names are
/// what the platform exposes as the stable identifier for a session. A
/// duplicate name keeps its first occurrence. Port wrappers are cached per
/// id so repeated listings return the same shared handle.
pub struct MidirTransport {
    client_name: String,
    acquired: bool,
    inputs: HashMap<String, Arc<Mutex<MidirInputPort>>>,
    outputs: HashMap<String, Arc<Mutex<MidirOutputPort>>>,
}

impl MidirTransport {
    pub fn new(client_name: &str) -> Self {
        MidirTransport {
            client_name: client_name.to_string(),
            acquired: false,
            inputs: HashMap::new(),
            outputs: HashMap::new(),
        }
    }
}

impl Transport for MidirTransport {
    fn request_access(&mut self) -> Result<()> {
        if self.acquired {
            return Ok(());
        }
        // Probe both client directions once; a refused client is the
        // denial path.
        MidiInput::new(&self.client_name)
            .map_err(|err| TransportError::AccessDenied(err.to_string()))?;
        MidiOutput::new(&self.client_name)
            .map_err(|err| TransportError::AccessDenied(err.to_string()))?;
        self.acquired = true;
        log::info!("MIDI access granted for client {:?}", self.client_name);
        Ok(())
    }

    fn has_access(&self) -> bool {
        self.acquired
    }

    fn list_inputs(&mut self) -> Vec<InputDevice> {
        if !self.acquired {
            return Vec::new();
        }
        let midi_in = match MidiInput::new(&self.client_name) {
            Ok(client) => client,
            Err(err) => {
                log::warn!("MIDI input enumeration failed: {}", err);
                return Vec::new();
            }
        };

        let client_name = self.client_name.clone();
        let mut devices: Vec<InputDevice> = Vec::new();
        for port in midi_in.ports() {
            let name = match midi_in.port_name(&port) {
                Ok(name) => name,
                Err(_) => continue,
            };
            let id = name.clone();
            if devices.iter().any(|device| device.id == id) {
                log::debug!("duplicate input port name {:?}, keeping the first", id);
                continue;
            }
            let wrapper = self
                .inputs
                .entry(id.clone())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(MidirInputPort::new(
                        id.clone(),
                        client_name.clone(),
                        port.clone(),
                    )))
                });
            if let Ok(mut guard) = wrapper.lock() {
                guard.port = port.clone();
            }
            devices.push(InputDevice {
                id,
                name,
                port: wrapper.clone(),
            });
        }
        devices
    }

    fn list_outputs(&mut self) -> Vec<OutputDevice> {
        if !self.acquired {
            return Vec::new();
        }
        let midi_out = match MidiOutput::new(&self.client_name) {
            Ok(client) => client,
            Err(err) => {
                log::warn!("MIDI output enumeration failed: {}", err);
                return Vec::new();
            }
        };

        let client_name = self.client_name.clone();
        let mut devices: Vec<OutputDevice> = Vec::new();
        for port in midi_out.ports() {
            let name = match midi_out.port_name(&port) {
                Ok(name) => name,
                Err(_) => continue,
            };
            let id = name.clone();
            if devices.iter().any(|device| device.id == id) {
                log::debug!("duplicate output port name {:?}, keeping the first", id);
                continue;
            }
            let wrapper = self
                .outputs
                .entry(id.clone())
                .or_insert_with(|| {
                    Arc::new(Mutex::new(MidirOutputPort::new(
                        id.clone(),
                        client_name.clone(),
                        port.clone(),
                    )))
                });
            if let Ok(mut guard) = wrapper.lock() {
                guard.port = port.clone();
            }
            devices.push(OutputDevice {
                id,
                name,
                port: wrapper.clone(),
            });
        }
        devices
    }
}

struct MidirInputPort {
    id: String,
    client_name: String,
    port: MidiInputPort,
    handler: Arc<Mutex<Option<InboundCallback>>>,
    connection: Option<MidiInputConnection<()>>,
}

impl MidirInputPort {
    fn new(id: String, client_name: String, port: MidiInputPort) -> Self {
        MidirInputPort {
            id,
            client_name,
            port,
            handler: Arc::new(Mutex::new(None)),
            connection: None,
        }
    }
}

impl InputPort for MidirInputPort {
    fn open(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }
        let mut midi_in = MidiInput::new(&self.client_name)?;
        midi_in.ignore(Ignore::None);

        let handler = Arc::clone(&self.handler);
        let device_id = self.id.clone();
        let connection = midi_in.connect(
            &self.port,
            &self.client_name,
            move |timestamp_us, bytes, _| {
                // Clone the callback out of the slot so delivery does not
                // hold the lock; a cleared slot drops the message.
                let callback = match handler.lock() {
                    Ok(slot) => slot.clone(),
                    Err(_) => None,
                };
                if let Some(callback) = callback {
                    callback(InboundMessage {
                        device_id: device_id.clone(),
                        timestamp_us,
                        data: bytes.to_vec(),
                    });
                }
            },
            (),
        )?;
        self.connection = Some(connection);
        log::debug!("opened MIDI input {:?}", self.id);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
            log::debug!("closed MIDI input {:?}", self.id);
        }
        Ok(())
    }

    fn set_handler(&mut self, handler: Option<InboundCallback>) {
        if let Ok(mut slot) = self.handler.lock() {
            *slot = handler;
        }
    }
}

struct MidirOutputPort {
    id: String,
    client_name: String,
    port: MidiOutputPort,
    connection: Option<MidiOutputConnection>,
}

impl MidirOutputPort {
    fn new(id: String, client_name: String, port: MidiOutputPort) -> Self {
        MidirOutputPort {
            id,
            client_name,
            port,
            connection: None,
        }
    }
}

impl OutputPort for MidirOutputPort {
    fn open(&mut self) -> Result<()> {
        if self.connection.is_some() {
            return Ok(());
        }
        let midi_out = MidiOutput::new(&self.client_name)?;
        self.connection = Some(midi_out.connect(&self.port, &self.client_name)?);
        log::debug!("opened MIDI output {:?}", self.id);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if let Some(connection) = self.connection.take() {
            let _ = connection.close();
            log::debug!("closed MIDI output {:?}", self.id);
        }
        Ok(())
    }

    fn send(&mut self, data: &[u8]) -> Result<()> {
        match self.connection.as_mut() {
            Some(connection) => connection
                .send(data)
                .map_err(|err| TransportError::SendFailed(err.to_string())),
            None => Err(TransportError::SendFailed(format!(
                "output {:?} is not open",
                self.id
            ))),
        }
    }
}

impl From<midir::InitError> for TransportError {
    fn from(err: midir::InitError) -> Self {
        TransportError::ConnectionFailed(err.to_string())
    }
}

impl From<midir::ConnectError<MidiInput>> for TransportError {
    fn from(err: midir::ConnectError<MidiInput>) -> Self {
        TransportError::ConnectionFailed(err.to_string())
    }
}

impl From<midir::ConnectError<MidiOutput>> for TransportError {
    fn from(err: midir::ConnectError<MidiOutput>) -> Self {
        TransportError::ConnectionFailed(err.to_string())
    }
}
