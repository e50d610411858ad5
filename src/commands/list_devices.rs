//! List available audio input devices.

use crate::error::MurmurError;
use crate::recording::audio::suppress_alsa_warnings;
use cpal::traits::{DeviceTrait, HostTrait};

/// One input device as shown to the user.
struct DeviceInfo {
    name: String,
    config: Option<(u32, u16)>,
    is_default: bool,
}

/// Lists all audio input devices with the index usable as `[audio] device`.
///
/// # Errors
/// - If the audio host cannot enumerate devices
pub fn handle_list_devices() -> anyhow::Result<()> {
    let devices = suppress_alsa_warnings(|| {
        let host = cpal::default_host();
        let default_name = host.default_input_device().and_then(|d| d.name().ok());

        let devices = host
            .input_devices()
            .map_err(|e| MurmurError::CaptureUnavailable(format!("Failed to enumerate audio devices: {e}")))?
            .filter_map(|device| {
                let name = device.name().ok()?;
                let config = device
                    .default_input_config()
                    .ok()
                    .map(|c| (c.sample_rate().0, c.channels()));
                Some(DeviceInfo {
                    is_default: default_name.as_ref() == Some(&name),
                    name,
                    config,
                })
            })
            .collect::<Vec<_>>();
        Ok(devices)
    })?;

    if devices.is_empty() {
        println!("No audio input devices found on this system.");
        return Ok(());
    }

    println!();
    println!("Audio input devices (use the ID or name as [audio] device in murmur.toml):");
    println!();

    for (index, device) in devices.iter().enumerate() {
        let default_indicator = if device.is_default { " [DEFAULT]" } else { "" };
        let config_info = match device.config {
            Some((rate, channels)) => format!("{rate}Hz, {channels} channels"),
            None => "configuration unavailable".to_string(),
        };

        println!("  ID: {index}");
        println!("    Name: {}{}", device.name, default_indicator);
        println!("    Config: {config_info}");
        println!();
    }

    Ok(())
}
