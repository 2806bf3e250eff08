//! Audio device enumeration via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::Device;

/// Audio device information.
#[derive(Debug, Clone)]
pub struct AudioDevice {
    pub name: String,
    pub is_input: bool,
    pub is_output: bool,
    pub default_sample_rate: u32,
}

/// Read a cpal device's name, wrapped in this crate's error type.
pub(crate) fn device_name(device: &Device) -> Result<String> {
    device.name().map_err(|e| Error::Stream(e.to_string()))
}

/// List all available audio devices.
pub fn list_devices() -> Result<Vec<AudioDevice>> {
    let host = cpal::default_host();
    let mut devices = Vec::new();

    if let Ok(inputs) = host.input_devices() {
        for device in inputs {
            if let Ok(name) = device_name(&device) {
                let sample_rate = device.default_input_config().map(|c| c.sample_rate().0).unwrap_or(44100);
                let is_output = device.default_output_config().is_ok();
                devices.push(AudioDevice { name, is_input: true, is_output, default_sample_rate: sample_rate });
            }
        }
    }

    if let Ok(outputs) = host.output_devices() {
        for device in outputs {
            if let Ok(name) = device_name(&device) {
                if devices.iter().any(|d| d.name == name) {
                    continue;
                }
                let sample_rate = device.default_output_config().map(|c| c.sample_rate().0).unwrap_or(44100);
                devices.push(AudioDevice { name, is_input: false, is_output: true, default_sample_rate: sample_rate });
            }
        }
    }

    Ok(devices)
}

/// Get the default input/output device info.
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();

    let input = host.default_input_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: true,
            is_output: false,
            default_sample_rate: d.default_input_config().map(|c| c.sample_rate().0).unwrap_or(44100),
        })
    });

    let output = host.default_output_device().and_then(|d| {
        device_name(&d).ok().map(|name| AudioDevice {
            name,
            is_input: false,
            is_output: true,
            default_sample_rate: d.default_output_config().map(|c| c.sample_rate().0).unwrap_or(44100),
        })
    });

    Ok((input, output))
}

/// Find an input device by its position in [`list_devices`]'s input-capable
/// entries.
pub fn find_device_by_index(index: usize) -> Result<AudioDevice> {
    list_devices()?
        .into_iter()
        .filter(|d| d.is_input)
        .nth(index)
        .ok_or_else(|| Error::DeviceNotFound(format!("input device index {index}")))
}

/// Find an input device whose name contains `query` (case-insensitive).
pub fn find_device_fuzzy(query: &str) -> Result<AudioDevice> {
    let query_lower = query.to_lowercase();
    list_devices()?
        .into_iter()
        .filter(|d| d.is_input)
        .find(|d| d.name.to_lowercase().contains(&query_lower))
        .ok_or_else(|| Error::DeviceNotFound(format!("no input device matching '{query}'")))
}
