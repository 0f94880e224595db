//! Audio streaming engine.
//!
//! This module moves mixed audio from the host mixer to a native output device.
//!
//! - Push mode: the native layer calls back for each block; the callback mixes, narrows and
//!   returns under the stream lock.
//! - Pull mode: a dedicated thread runs a ~1 ms cadence. Each cycle checks queue depth, and
//!   when the queue holds less than two cycles' worth it mixes one block, narrows it and
//!   enqueues it.
//!
//! Notes / constraints:
//! - One mutex guards the scratch buffers, the device handle, the mixer and any pending
//!   device change. It is not re-entrant: never call back into the driver from the mixer.
//! - Scratch buffers are sized `latency_frames * channels` and only resized when a device
//!   is (re)opened.
//! - Device changes are recorded under the lock and applied by the owner of the stream:
//!   the pull thread in pull mode, [`AudioDriver::update`] on the main loop in push mode.
//! - Callback devices are always closed outside the lock, so a close that waits for an
//!   in-flight callback cannot deadlock against it.

mod convert;
mod output;
mod wav;

#[cfg(test)]
mod tests;

pub use convert::{SAMPLE_BYTES, cycle_bytes, narrow_into, narrow_sample, should_enqueue};
pub use output::{AudioBackend, AudioDevice, AudioSpec, PushFeed, PushFill, StreamMode};
pub use wav::{WavCaptureBackend, WavCaptureDevice};

use crate::abi::AudioMixer;
use crate::config::{AudioConfig, DEFAULT_OUTPUT_DEVICE};
use log::{debug, error, info, warn};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

/// Pull-mode cadence.
pub const PULL_INTERVAL: Duration = Duration::from_millis(1);

/// Errors from the audio engine and its devices.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio device {name:?}: {reason}")]
    DeviceOpen { name: String, reason: String },
    #[error("failed to queue audio: {0}")]
    Queue(String),
    #[error("{0} is not supported by this audio backend")]
    Unsupported(&'static str),
    #[error("failed to spawn audio thread: {0}")]
    Thread(#[from] std::io::Error),
    #[error("WAV capture failed: {0}")]
    Wav(#[from] hound::Error),
}

/// Speaker layout derived from the negotiated channel count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpeakerMode {
    Stereo,
    Surround31,
    Surround51,
    Surround71,
}

impl SpeakerMode {
    pub fn from_channels(channels: u16) -> Self {
        match channels {
            4 => SpeakerMode::Surround31,
            6 => SpeakerMode::Surround51,
            8 => SpeakerMode::Surround71,
            _ => SpeakerMode::Stereo,
        }
    }
}

/// What one pull cycle did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CycleOutcome {
    Enqueued,
    Saturated,
    NoDevice,
    QueueFailed,
}

/// Everything the stream lock guards.
struct StreamState<B: AudioBackend> {
    backend: B,
    device: Option<B::Device>,
    mixer: Box<dyn AudioMixer>,
    mode: StreamMode,
    requested: AudioSpec,
    spec: AudioSpec,
    samples_in: Vec<i32>,
    samples_out: Vec<i16>,
    active: bool,
    device_name: String,
    pending_device: Option<String>,
}

impl<B: AudioBackend> StreamState<B> {
    /// Open `self.device_name` and adopt the negotiated spec.
    fn open(&mut self, feed: Option<PushFeed>) -> Result<(), AudioError> {
        let name = (self.device_name != DEFAULT_OUTPUT_DEVICE)
            .then_some(self.device_name.as_str());
        let mut device = match (self.mode, feed) {
            (StreamMode::Push, Some(feed)) => {
                self.backend.open_callback(name, &self.requested, feed)?
            }
            _ => self.backend.open_queue(name, &self.requested)?,
        };
        self.spec = device.spec();
        let samples = self.spec.samples_per_cycle();
        self.samples_in = vec![0; samples];
        self.samples_out = vec![0; samples];
        info!(
            "audio device {:?} opened: {} Hz, {} channel(s), {} frame cycle",
            self.device_name, self.spec.mix_rate, self.spec.channels, self.spec.latency_frames
        );
        if self.active {
            device.set_paused(false);
        }
        self.device = Some(device);
        Ok(())
    }

    /// Fill the first `frames` frames of the scratch buffer.
    fn render(&mut self, frames: usize) {
        let samples = frames * usize::from(self.spec.channels);
        let block = &mut self.samples_in[..samples];
        if self.active {
            self.mixer.mix(frames, block);
        } else {
            block.fill(0);
        }
    }

    /// One queue-path cycle.
    fn pull_cycle(&mut self) -> CycleOutcome {
        if let Some(name) = self.pending_device.take() {
            self.device = None;
            self.device_name = name;
            if let Err(err) = self.open(None) {
                error!("audio output device change failed: {err}");
            }
        }

        let queued = match self.device.as_ref() {
            Some(device) => device.queued_bytes(),
            None => return CycleOutcome::NoDevice,
        };
        let cycle = self.samples_out.len() * SAMPLE_BYTES;
        if !should_enqueue(queued, cycle) {
            return CycleOutcome::Saturated;
        }

        self.render(usize::from(self.spec.latency_frames));
        narrow_into(&self.samples_in, &mut self.samples_out);
        let Some(device) = self.device.as_mut() else {
            return CycleOutcome::NoDevice;
        };
        match device.queue(&self.samples_out) {
            Ok(()) => CycleOutcome::Enqueued,
            Err(err) => {
                warn!("{err}");
                CycleOutcome::QueueFailed
            }
        }
    }

    /// One callback-path block. Whatever does not fit the scratch buffer is silence.
    fn push_block(&mut self, out: &mut [i16]) {
        let channels = usize::from(self.spec.channels).max(1);
        let frames = out.len().min(self.samples_in.len()) / channels;
        let samples = frames * channels;
        self.render(frames);
        narrow_into(&self.samples_in[..samples], &mut out[..samples]);
        out[samples..].fill(0);
    }
}

struct Shared<B: AudioBackend> {
    state: Mutex<StreamState<B>>,
    exit: Mutex<bool>,
    wake: Condvar,
}

impl<B: AudioBackend> Shared<B> {
    fn lock_state(&self) -> MutexGuard<'_, StreamState<B>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn set_exit(&self, exit: bool) {
        *self.exit.lock().unwrap_or_else(PoisonError::into_inner) = exit;
        self.wake.notify_all();
    }
}

impl<B: AudioBackend> PushFill for Shared<B> {
    fn fill(&self, out: &mut [i16]) {
        self.lock_state().push_block(out);
    }
}

fn pull_loop<B: AudioBackend>(shared: Arc<Shared<B>>) {
    debug!("audio pull thread started");
    loop {
        shared.lock_state().pull_cycle();

        let exit = shared.exit.lock().unwrap_or_else(PoisonError::into_inner);
        let (exit, _) = shared
            .wake
            .wait_timeout_while(exit, PULL_INTERVAL, |exit| !*exit)
            .unwrap_or_else(PoisonError::into_inner);
        if *exit {
            break;
        }
    }
    debug!("audio pull thread exiting");
}

/// Held stream lock. The mixer may be touched safely while it is alive.
pub struct AudioLock<'a, B: AudioBackend> {
    guard: MutexGuard<'a, StreamState<B>>,
}

impl<B: AudioBackend> AudioLock<'_, B> {
    pub fn mixer(&mut self) -> &mut dyn AudioMixer {
        self.guard.mixer.as_mut()
    }
}

/// Audio driver: owns the stream state, the device and (in pull mode) the cadence thread.
pub struct AudioDriver<B: AudioBackend> {
    shared: Arc<Shared<B>>,
    thread: Option<JoinHandle<()>>,
    mode: StreamMode,
}

impl<B: AudioBackend> AudioDriver<B> {
    pub fn new(backend: B, mixer: Box<dyn AudioMixer>, config: &AudioConfig) -> Self {
        let requested = AudioSpec {
            mix_rate: config.mix_rate,
            channels: config.channels,
            latency_frames: config.latency_frames,
        };
        let state = StreamState {
            backend,
            device: None,
            mixer,
            mode: config.mode,
            requested,
            spec: requested,
            samples_in: Vec::new(),
            samples_out: Vec::new(),
            active: false,
            device_name: config.output_device.clone(),
            pending_device: None,
        };
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                exit: Mutex::new(false),
                wake: Condvar::new(),
            }),
            thread: None,
            mode: config.mode,
        }
    }

    pub fn name(&self) -> &'static str {
        "SBC"
    }

    pub fn mode(&self) -> StreamMode {
        self.mode
    }

    fn feed(&self) -> Option<PushFeed> {
        if self.mode != StreamMode::Push {
            return None;
        }
        let weak: Weak<dyn PushFill> = Arc::downgrade(&self.shared) as Weak<dyn PushFill>;
        Some(PushFeed::new(weak))
    }

    /// Open the configured device (paused) and, in pull mode, start the cadence thread.
    pub fn init(&mut self) -> Result<(), AudioError> {
        let feed = self.feed();
        self.shared.lock_state().open(feed)?;

        if self.mode == StreamMode::Pull && self.thread.is_none() {
            self.shared.set_exit(false);
            let shared = Arc::clone(&self.shared);
            let handle = std::thread::Builder::new()
                .name("sbc-audio".into())
                .spawn(move || pull_loop(shared))?;
            self.thread = Some(handle);
        }
        Ok(())
    }

    /// Mark the stream active and unpause the device.
    pub fn start(&self) {
        let mut state = self.shared.lock_state();
        state.active = true;
        if let Some(device) = state.device.as_mut() {
            device.set_paused(false);
        }
    }

    /// Stop the cadence, then pause, clear and close the device.
    pub fn finish(&mut self) {
        if let Some(handle) = self.thread.take() {
            self.shared.set_exit(true);
            if handle.join().is_err() {
                error!("audio pull thread panicked");
            }
        }
        let device = {
            let mut state = self.shared.lock_state();
            state.active = false;
            state.device.take()
        };
        if let Some(mut device) = device {
            device.set_paused(true);
            device.clear();
            drop(device);
            info!("audio device closed");
        }
    }

    /// Apply a pending device change. Push mode only; the pull thread applies its own.
    pub fn update(&self) {
        if self.mode != StreamMode::Push {
            return;
        }
        let old = {
            let mut state = self.shared.lock_state();
            let Some(name) = state.pending_device.take() else {
                return;
            };
            state.device_name = name;
            state.device.take()
        };
        if let Some(mut old) = old {
            old.set_paused(true);
            drop(old);
        }
        let feed = self.feed();
        if let Err(err) = self.shared.lock_state().open(feed) {
            error!("audio output device change failed: {err}");
        }
    }

    pub fn lock(&self) -> AudioLock<'_, B> {
        AudioLock {
            guard: self.shared.lock_state(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.shared.lock_state().active
    }

    pub fn mix_rate(&self) -> u32 {
        self.shared.lock_state().spec.mix_rate
    }

    pub fn latency_frames(&self) -> u16 {
        self.shared.lock_state().spec.latency_frames
    }

    pub fn speaker_mode(&self) -> SpeakerMode {
        SpeakerMode::from_channels(self.shared.lock_state().spec.channels)
    }

    /// "Default" followed by the native device names.
    pub fn output_device_list(&self) -> Vec<String> {
        let state = self.shared.lock_state();
        std::iter::once(DEFAULT_OUTPUT_DEVICE.to_string())
            .chain(state.backend.output_device_names())
            .collect()
    }

    /// Currently requested device (the pending one, if a change is in flight).
    pub fn output_device(&self) -> String {
        let state = self.shared.lock_state();
        state
            .pending_device
            .clone()
            .unwrap_or_else(|| state.device_name.clone())
    }

    /// Request a device change; applied by the stream owner.
    pub fn set_output_device(&self, name: &str) {
        self.shared.lock_state().pending_device = Some(name.to_string());
    }
}

impl<B: AudioBackend> Drop for AudioDriver<B> {
    fn drop(&mut self) {
        self.finish();
    }
}
