//! Headless output: a queue device that records to a WAV file.
//!
//! Queue depth drains in real time while the device is unpaused, so the pull cadence paces
//! itself the same way it does against real hardware.

use super::{AudioBackend, AudioDevice, AudioError, AudioSpec, PushFeed, SAMPLE_BYTES};
use hound::{SampleFormat, WavSpec, WavWriter};
use log::{info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Backend with a single named output: the capture file.
pub struct WavCaptureBackend {
    path: PathBuf,
}

impl WavCaptureBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn device_label(&self) -> String {
        format!("WAV capture ({})", self.path.display())
    }
}

impl AudioBackend for WavCaptureBackend {
    type Device = WavCaptureDevice;

    fn output_device_names(&self) -> Vec<String> {
        vec![self.device_label()]
    }

    fn open_queue(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<WavCaptureDevice, AudioError> {
        if let Some(name) = name {
            if name != self.device_label() {
                return Err(AudioError::DeviceOpen {
                    name: name.to_string(),
                    reason: "no such device".to_string(),
                });
            }
        }
        let spec = WavSpec {
            channels: desired.channels,
            sample_rate: desired.mix_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let writer = WavWriter::create(&self.path, spec)?;
        info!("capturing audio to {}", self.path.display());
        Ok(WavCaptureDevice {
            writer: Some(writer),
            spec: *desired,
            written_bytes: 0,
            consumed_bytes: 0,
            running_since: None,
        })
    }

    fn open_callback(
        &mut self,
        _name: Option<&str>,
        _desired: &AudioSpec,
        _feed: PushFeed,
    ) -> Result<WavCaptureDevice, AudioError> {
        Err(AudioError::Unsupported("callback mode"))
    }
}

/// Open capture file plus a real-time model of how much of it has been "played".
pub struct WavCaptureDevice {
    writer: Option<WavWriter<BufWriter<File>>>,
    spec: AudioSpec,
    written_bytes: usize,
    consumed_bytes: usize,
    running_since: Option<Instant>,
}

impl WavCaptureDevice {
    fn bytes_per_second(&self) -> f64 {
        f64::from(self.spec.mix_rate) * f64::from(self.spec.channels) * SAMPLE_BYTES as f64
    }

    fn consumed_now(&self) -> usize {
        let running = self
            .running_since
            .map(|since| (since.elapsed().as_secs_f64() * self.bytes_per_second()) as usize)
            .unwrap_or(0);
        self.consumed_bytes.saturating_add(running)
    }
}

impl AudioDevice for WavCaptureDevice {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn queued_bytes(&self) -> usize {
        self.written_bytes.saturating_sub(self.consumed_now())
    }

    fn queue(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        let Some(writer) = self.writer.as_mut() else {
            return Err(AudioError::Queue("capture file already closed".into()));
        };
        for &sample in samples {
            writer.write_sample(sample)?;
        }
        // Playback cannot run ahead of what was written.
        self.consumed_bytes = self.consumed_now().min(self.written_bytes);
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
        self.written_bytes += samples.len() * SAMPLE_BYTES;
        Ok(())
    }

    fn clear(&mut self) {
        self.consumed_bytes = self.written_bytes;
        if self.running_since.is_some() {
            self.running_since = Some(Instant::now());
        }
    }

    fn set_paused(&mut self, paused: bool) {
        match (paused, self.running_since) {
            (true, Some(_)) => {
                self.consumed_bytes = self.consumed_now().min(self.written_bytes);
                self.running_since = None;
            }
            (false, None) => self.running_since = Some(Instant::now()),
            _ => {}
        }
    }
}

impl Drop for WavCaptureDevice {
    fn drop(&mut self) {
        if let Some(writer) = self.writer.take() {
            if let Err(err) = writer.finalize() {
                warn!("failed to finalize WAV capture: {err}");
            }
        }
    }
}
