//! Abstraction over the raw MIDI output port, so the dispatcher's logic can
//! be tested without an OS MIDI device.

use crate::error::{Error, Result};

/// A sink for raw 3-byte MIDI messages. Implemented by [`MidirPort`] for
/// real hardware and by a recording stub in tests.
pub trait MidiPort: Send {
    fn send(&mut self, message: &[u8; 3]) -> Result<()>;
}

/// Enumerate the names of available MIDI output ports.
pub fn list_output_ports() -> Result<Vec<String>> {
    let output = midir::MidiOutput::new("lumen-midi-list").map_err(|e| Error::PortOpenFailed(e.to_string()))?;
    Ok(output
        .ports()
        .iter()
        .map(|p| output.port_name(p).unwrap_or_else(|_| "unknown".to_string()))
        .collect())
}

/// A [`MidiPort`] backed by a real `midir` output connection.
pub struct MidirPort {
    connection: midir::MidiOutputConnection,
}

impl MidirPort {
    /// Open the output port at `index`. Fatal (§7) if the index is out of
    /// range or the underlying connection fails.
    pub fn open(index: usize) -> Result<Self> {
        let output = midir::MidiOutput::new("lumen-midi").map_err(|e| Error::PortOpenFailed(e.to_string()))?;
        let ports = output.ports();
        let port = ports.get(index).ok_or(Error::InvalidPortIndex(index))?;
        let name = output.port_name(port).unwrap_or_else(|_| format!("port {index}"));
        let connection = output
            .connect(port, "lumen-midi")
            .map_err(|e| Error::PortOpenFailed(e.to_string()))?;
        tracing::info!(port = index, name, "MIDI output port opened");
        Ok(Self { connection })
    }
}

impl MidiPort for MidirPort {
    fn send(&mut self, message: &[u8; 3]) -> Result<()> {
        self.connection
            .send(message)
            .map_err(|e| Error::SendFailed(e.to_string()))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Records every message sent to it, for dispatcher unit tests. Shares
    /// its log with a cloneable handle so tests can inspect it after the
    /// port has been moved into a `Box<dyn MidiPort>`.
    #[derive(Clone, Default)]
    pub struct RecordingPort {
        sent: Arc<Mutex<Vec<[u8; 3]>>>,
    }

    impl RecordingPort {
        pub fn messages(&self) -> Vec<[u8; 3]> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MidiPort for RecordingPort {
        fn send(&mut self, message: &[u8; 3]) -> Result<()> {
            self.sent.lock().unwrap().push(*message);
            Ok(())
        }
    }
}
