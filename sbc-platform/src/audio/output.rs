//! Output device boundary.

use super::AudioError;
use std::sync::Weak;

/// Stream parameters, requested and negotiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioSpec {
    pub mix_rate: u32,
    pub channels: u16,
    /// Frames per cycle.
    pub latency_frames: u16,
}

impl AudioSpec {
    pub fn samples_per_cycle(&self) -> usize {
        usize::from(self.latency_frames) * usize::from(self.channels)
    }
}

/// How samples reach the device.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamMode {
    /// The native layer calls back for each block.
    #[default]
    Push,
    /// A background cadence mixes and enqueues.
    Pull,
}

/// Producer side of a callback device.
pub trait PushFill: Send + Sync {
    fn fill(&self, out: &mut [i16]);
}

/// Handle a callback device keeps to its producer.
///
/// Holds the producer weakly; once the driver is gone every fill is silence.
#[derive(Clone)]
pub struct PushFeed(Weak<dyn PushFill>);

impl PushFeed {
    pub fn new(source: Weak<dyn PushFill>) -> Self {
        Self(source)
    }

    pub fn fill(&self, out: &mut [i16]) {
        match self.0.upgrade() {
            Some(source) => source.fill(out),
            None => out.fill(0),
        }
    }
}

/// Native audio subsystem.
pub trait AudioBackend: Send + 'static {
    type Device: AudioDevice;

    /// Names of the native output devices, without the "Default" entry.
    fn output_device_names(&self) -> Vec<String>;

    /// Open a queue device. `name == None` selects the default device.
    fn open_queue(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<Self::Device, AudioError>;

    /// Open a callback device that pulls from `feed` once unpaused.
    fn open_callback(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
        feed: PushFeed,
    ) -> Result<Self::Device, AudioError>;
}

/// An open output device. Dropping it closes it.
pub trait AudioDevice: Send + 'static {
    /// Negotiated parameters.
    fn spec(&self) -> AudioSpec;

    /// Bytes waiting in the device queue. Always 0 for callback devices.
    fn queued_bytes(&self) -> usize;

    fn queue(&mut self, samples: &[i16]) -> Result<(), AudioError>;

    fn clear(&mut self);

    fn set_paused(&mut self, paused: bool);
}
