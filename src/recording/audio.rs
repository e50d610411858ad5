//! Microphone backend built on cpal.
//!
//! Captures from the configured input device at its native rate, downmixes to
//! mono 16-bit PCM, and pushes each callback's worth of samples as a chunk.
//! The finished clip is wrapped in a WAV container with hound.

use super::capture::{AudioInput, Chunk, InputStream};
use crate::error::{MurmurError, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use hound::{SampleFormat, WavSpec, WavWriter};
use std::io::Cursor;
use tokio::sync::mpsc::UnboundedSender;

#[cfg(target_os = "linux")]
use std::fs::OpenOptions;
#[cfg(target_os = "linux")]
use std::os::unix::io::AsRawFd;

/// Media type of every clip produced by this backend.
pub const WAV_MIME_TYPE: &str = "audio/wav";

/// Opens cpal input streams on a named or default device.
pub struct CpalInput {
    /// Requested sample rate; the device's native rate wins if they differ
    requested_sample_rate: u32,
    /// Device name, index, or "default"
    device_name: String,
}

impl CpalInput {
    /// Creates an input that will open `device_name` ("default" for the system default).
    pub fn new(requested_sample_rate: u32, device_name: String) -> Self {
        Self {
            requested_sample_rate,
            device_name,
        }
    }
}

impl AudioInput for CpalInput {
    fn open(&mut self, chunks: UnboundedSender<Chunk>) -> Result<Box<dyn InputStream>> {
        let device = suppress_alsa_warnings(|| {
            let host = cpal::default_host();

            if self.device_name == "default" {
                host.default_input_device().ok_or_else(|| {
                    MurmurError::CaptureUnavailable("No audio input device available".to_string())
                })
            } else {
                find_device_by_name(&host, &self.device_name)
            }
        })?;

        let device_name = device
            .name()
            .unwrap_or_else(|_| "Unknown device".to_string());
        tracing::info!("Recording device: {}", device_name);

        let supported = device
            .default_input_config()
            .map_err(|e| MurmurError::CaptureUnavailable(format!("{device_name}: {e}")))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();

        if sample_rate != self.requested_sample_rate {
            tracing::warn!(
                "Requested sample rate {}Hz but device uses {}Hz. Recording at device rate.",
                self.requested_sample_rate,
                sample_rate
            );
        }
        tracing::debug!(
            "Device configuration: {}Hz, {} channels, {:?}",
            sample_rate,
            channels,
            sample_format
        );

        let config: cpal::StreamConfig = supported.into();
        let stream = match sample_format {
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, channels, chunks),
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, channels, chunks),
            cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, channels, chunks),
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, channels, chunks),
            other => Err(MurmurError::CaptureUnavailable(format!(
                "Unsupported sample format {other:?} on {device_name}"
            ))),
        }?;

        stream
            .play()
            .map_err(|e| MurmurError::CaptureUnavailable(format!("Failed to start stream: {e}")))?;

        tracing::debug!("Audio stream started");
        Ok(Box::new(CpalStream {
            stream: Some(stream),
            sample_rate,
        }))
    }
}

/// Live cpal stream owned by the active session.
struct CpalStream {
    /// Dropping the stream closes the device and the callback with it
    stream: Option<cpal::Stream>,
    sample_rate: u32,
}

impl InputStream for CpalStream {
    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::debug!("Failed to pause stream before release: {}", e);
            }
            drop(stream);
            tracing::debug!("Audio stream released");
        }
    }

    fn assemble(&self, raw: &[u8]) -> Result<Vec<u8>> {
        encode_wav(raw, self.sample_rate)
    }

    fn mime_type(&self) -> &'static str {
        WAV_MIME_TYPE
    }
}

impl Drop for CpalStream {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    chunks: UnboundedSender<Chunk>,
) -> Result<cpal::Stream>
where
    T: SizedSample + Send + 'static,
    i16: FromSample<T>,
{
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data.iter().map(|s| s.to_sample::<i16>()).collect();
                let mono = downmix_to_mono(&samples, channels);
                // The receiver is gone once the session stops; late callbacks are dropped.
                let _ = chunks.send(pcm_bytes(&mono));
            },
            |err| {
                tracing::error!("Audio stream error: {}", err);
            },
            None,
        )
        .map_err(|e| MurmurError::CaptureUnavailable(format!("Failed to build input stream: {e}")))
}

/// Converts interleaved multi-channel samples to mono by averaging channels.
pub fn downmix_to_mono(data: &[i16], num_channels: usize) -> Vec<i16> {
    match num_channels {
        0 | 1 => data.to_vec(),
        _ => data
            .chunks_exact(num_channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                (sum / num_channels as i32) as i16
            })
            .collect(),
    }
}

/// Serializes samples as little-endian PCM bytes.
fn pcm_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

/// Wraps little-endian mono 16-bit PCM in an in-memory WAV container.
///
/// A trailing odd byte is ignored.
///
/// # Errors
/// - If hound fails to write the header or samples
pub fn encode_wav(raw: &[u8], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::with_capacity(raw.len() + 44));
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| MurmurError::Capture(format!("WAV header: {e}")))?;

    for pair in raw.chunks_exact(2) {
        writer
            .write_sample(i16::from_le_bytes([pair[0], pair[1]]))
            .map_err(|e| MurmurError::Capture(format!("WAV samples: {e}")))?;
    }

    writer
        .finalize()
        .map_err(|e| MurmurError::Capture(format!("WAV finalize: {e}")))?;

    tracing::debug!(
        "Assembled WAV: {} samples at {}Hz",
        raw.len() / 2,
        sample_rate
    );
    Ok(cursor.into_inner())
}

/// Finds an audio input device by name or numeric index.
///
/// # Errors
/// - If no device with the specified name/index is found
fn find_device_by_name(host: &cpal::Host, device_spec: &str) -> Result<cpal::Device> {
    let devices: Vec<cpal::Device> = host
        .input_devices()
        .map_err(|e| MurmurError::CaptureUnavailable(format!("Failed to enumerate devices: {e}")))?
        .collect();

    if let Ok(index) = device_spec.parse::<usize>() {
        let count = devices.len();
        return devices.into_iter().nth(index).ok_or_else(|| {
            MurmurError::CaptureUnavailable(format!(
                "Device index {} is out of range (0-{})",
                index,
                count.saturating_sub(1)
            ))
        });
    }

    devices
        .into_iter()
        .find(|device| device.name().is_ok_and(|name| name == device_spec))
        .ok_or_else(|| {
            MurmurError::CaptureUnavailable(format!(
                "Audio input device '{device_spec}' not found. Use 'murmur list-devices' to see available devices."
            ))
        })
}

/// Temporarily redirects stderr to /dev/null to suppress ALSA library warnings on Linux.
#[cfg(target_os = "linux")]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let dev_null = OpenOptions::new().write(true).open("/dev/null")?;
    let dev_null_fd = dev_null.as_raw_fd();

    let old_stderr = unsafe { libc::dup(libc::STDERR_FILENO) };
    if old_stderr == -1 {
        return Err(std::io::Error::last_os_error().into());
    }

    let redirect_result = unsafe { libc::dup2(dev_null_fd, libc::STDERR_FILENO) };
    if redirect_result == -1 {
        unsafe { libc::close(old_stderr) };
        return Err(std::io::Error::last_os_error().into());
    }

    let result = f();

    unsafe {
        libc::dup2(old_stderr, libc::STDERR_FILENO);
        libc::close(old_stderr);
    }

    result
}

/// No ALSA outside Linux.
#[cfg(not(target_os = "linux"))]
pub(crate) fn suppress_alsa_warnings<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    f()
}
