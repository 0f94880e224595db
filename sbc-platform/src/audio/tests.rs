use super::*;
use crate::config::AudioConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

#[derive(Default)]
struct Probe {
    opened: Vec<Option<String>>,
    closed: usize,
    queued: Vec<Vec<i16>>,
    queued_bytes: usize,
    paused: bool,
    cleared: usize,
    feed: Option<PushFeed>,
}

struct FakeBackend {
    probe: Arc<Mutex<Probe>>,
}

struct FakeDevice {
    probe: Arc<Mutex<Probe>>,
    spec: AudioSpec,
}

impl FakeBackend {
    fn open(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<FakeDevice, AudioError> {
        if name == Some("Broken") {
            return Err(AudioError::DeviceOpen {
                name: "Broken".into(),
                reason: "unplugged".into(),
            });
        }
        let mut spec = *desired;
        if name == Some("Small") {
            spec.latency_frames = 256;
            spec.channels = 1;
        }
        let mut probe = self.probe.lock().unwrap();
        probe.opened.push(name.map(str::to_string));
        probe.paused = true;
        Ok(FakeDevice {
            probe: Arc::clone(&self.probe),
            spec,
        })
    }
}

impl AudioBackend for FakeBackend {
    type Device = FakeDevice;

    fn output_device_names(&self) -> Vec<String> {
        vec!["HDMI".into(), "Small".into()]
    }

    fn open_queue(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
    ) -> Result<FakeDevice, AudioError> {
        self.open(name, desired)
    }

    fn open_callback(
        &mut self,
        name: Option<&str>,
        desired: &AudioSpec,
        feed: PushFeed,
    ) -> Result<FakeDevice, AudioError> {
        let device = self.open(name, desired)?;
        self.probe.lock().unwrap().feed = Some(feed);
        Ok(device)
    }
}

impl AudioDevice for FakeDevice {
    fn spec(&self) -> AudioSpec {
        self.spec
    }

    fn queued_bytes(&self) -> usize {
        self.probe.lock().unwrap().queued_bytes
    }

    fn queue(&mut self, samples: &[i16]) -> Result<(), AudioError> {
        let mut probe = self.probe.lock().unwrap();
        probe.queued_bytes += samples.len() * SAMPLE_BYTES;
        probe.queued.push(samples.to_vec());
        Ok(())
    }

    fn clear(&mut self) {
        let mut probe = self.probe.lock().unwrap();
        probe.queued_bytes = 0;
        probe.cleared += 1;
    }

    fn set_paused(&mut self, paused: bool) {
        self.probe.lock().unwrap().paused = paused;
    }
}

impl Drop for FakeDevice {
    fn drop(&mut self) {
        self.probe.lock().unwrap().closed += 1;
    }
}

/// Writes a fixed value into every sample and counts calls.
struct ConstMixer {
    value: i32,
    calls: Arc<AtomicUsize>,
}

impl AudioMixer for ConstMixer {
    fn mix(&mut self, frames: usize, out: &mut [i32]) {
        assert_eq!(out.len() % frames.max(1), 0);
        out.fill(self.value);
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

fn config(mode: StreamMode) -> AudioConfig {
    AudioConfig {
        mix_rate: 48_000,
        channels: 2,
        latency_frames: 4,
        output_device: DEFAULT_OUTPUT_DEVICE.to_string(),
        mode,
    }
}

type Rig = (AudioDriver<FakeBackend>, Arc<Mutex<Probe>>, Arc<AtomicUsize>);

fn make_driver(mode: StreamMode, value: i32) -> Rig {
    let probe = Arc::new(Mutex::new(Probe::default()));
    let calls = Arc::new(AtomicUsize::new(0));
    let mixer = ConstMixer {
        value,
        calls: Arc::clone(&calls),
    };
    let backend = FakeBackend {
        probe: Arc::clone(&probe),
    };
    (
        AudioDriver::new(backend, Box::new(mixer), &config(mode)),
        probe,
        calls,
    )
}

/// Open the device without spawning the cadence thread, so cycles can be stepped by hand.
fn open_for_stepping(driver: &AudioDriver<FakeBackend>) {
    driver.shared.lock_state().open(None).unwrap();
}

#[test]
fn init_opens_default_device_paused() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 0);
    driver.init().unwrap();
    let p = probe.lock().unwrap();
    assert_eq!(p.opened, vec![None]);
    assert!(p.paused);
    assert!(p.feed.is_some());
    drop(p);
    assert!(!driver.is_active());
    assert_eq!(driver.mix_rate(), 48_000);
    assert_eq!(driver.speaker_mode(), SpeakerMode::Stereo);
}

#[test]
fn start_activates_and_unpauses() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 0);
    driver.init().unwrap();
    driver.start();
    assert!(driver.is_active());
    assert!(!probe.lock().unwrap().paused);
}

#[test]
fn pull_cycle_enqueues_narrowed_mixer_output() {
    let (driver, probe, calls) = make_driver(StreamMode::Pull, i32::MAX);
    open_for_stepping(&driver);
    driver.shared.lock_state().active = true;

    assert_eq!(driver.shared.lock_state().pull_cycle(), CycleOutcome::Enqueued);
    let p = probe.lock().unwrap();
    assert_eq!(p.queued.len(), 1);
    assert_eq!(p.queued[0], vec![i16::MAX; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn inactive_stream_enqueues_silence_without_mixing() {
    let (driver, probe, calls) = make_driver(StreamMode::Pull, 1 << 20);
    open_for_stepping(&driver);

    assert_eq!(driver.shared.lock_state().pull_cycle(), CycleOutcome::Enqueued);
    assert_eq!(probe.lock().unwrap().queued[0], vec![0; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn backpressure_skips_at_two_cycles() {
    let (driver, probe, calls) = make_driver(StreamMode::Pull, 0);
    open_for_stepping(&driver);
    driver.shared.lock_state().active = true;
    // 4 frames * 2 channels * 2 bytes.
    let cycle = 16;

    probe.lock().unwrap().queued_bytes = 2 * cycle;
    assert_eq!(driver.shared.lock_state().pull_cycle(), CycleOutcome::Saturated);
    assert!(probe.lock().unwrap().queued.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    probe.lock().unwrap().queued_bytes = 2 * cycle - 1;
    assert_eq!(driver.shared.lock_state().pull_cycle(), CycleOutcome::Enqueued);
    assert_eq!(probe.lock().unwrap().queued.len(), 1);
}

#[test]
fn queue_fills_to_two_cycles_then_stalls() {
    let (driver, probe, _) = make_driver(StreamMode::Pull, 0);
    open_for_stepping(&driver);
    let outcomes: Vec<_> = (0..4)
        .map(|_| driver.shared.lock_state().pull_cycle())
        .collect();
    assert_eq!(
        outcomes,
        vec![
            CycleOutcome::Enqueued,
            CycleOutcome::Enqueued,
            CycleOutcome::Saturated,
            CycleOutcome::Saturated,
        ]
    );
    assert_eq!(probe.lock().unwrap().queued.len(), 2);
}

#[test]
fn pull_cycle_applies_pending_device_and_resizes() {
    let (driver, probe, _) = make_driver(StreamMode::Pull, 0);
    open_for_stepping(&driver);
    driver.set_output_device("Small");
    assert_eq!(driver.output_device(), "Small");

    driver.shared.lock_state().pull_cycle();
    let p = probe.lock().unwrap();
    assert_eq!(p.opened, vec![None, Some("Small".to_string())]);
    assert_eq!(p.closed, 1);
    // 256 frames, mono.
    assert_eq!(p.queued[0].len(), 256);
    drop(p);
    assert_eq!(driver.latency_frames(), 256);
    assert_eq!(driver.output_device(), "Small");
}

#[test]
fn failed_device_change_leaves_no_device() {
    let (driver, probe, _) = make_driver(StreamMode::Pull, 0);
    open_for_stepping(&driver);
    driver.set_output_device("Broken");
    assert_eq!(driver.shared.lock_state().pull_cycle(), CycleOutcome::NoDevice);
    assert_eq!(probe.lock().unwrap().closed, 1);
}

#[test]
fn push_feed_mixes_and_narrows() {
    let (mut driver, probe, calls) = make_driver(StreamMode::Push, -(3 << 16));
    driver.init().unwrap();
    driver.start();
    let feed = probe.lock().unwrap().feed.clone().unwrap();

    let mut out = [7i16; 8];
    feed.fill(&mut out);
    assert_eq!(out, [-3; 8]);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn push_feed_pads_oversized_requests_with_silence() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 1 << 16);
    driver.init().unwrap();
    driver.start();
    let feed = probe.lock().unwrap().feed.clone().unwrap();

    let mut out = [7i16; 12];
    feed.fill(&mut out);
    assert_eq!(&out[..8], &[1; 8]);
    assert_eq!(&out[8..], &[0; 4]);
}

#[test]
fn push_feed_is_silent_after_driver_drop() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 1 << 16);
    driver.init().unwrap();
    driver.start();
    let feed = probe.lock().unwrap().feed.clone().unwrap();
    drop(driver);

    let mut out = [7i16; 8];
    feed.fill(&mut out);
    assert_eq!(out, [0; 8]);
    assert_eq!(probe.lock().unwrap().closed, 1);
}

#[test]
fn push_mode_applies_device_change_on_update() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 0);
    driver.init().unwrap();
    driver.start();
    driver.set_output_device("HDMI");
    assert_eq!(probe.lock().unwrap().opened.len(), 1);

    driver.update();
    let p = probe.lock().unwrap();
    assert_eq!(p.opened, vec![None, Some("HDMI".to_string())]);
    assert_eq!(p.closed, 1);
    // Reopened while active, so it plays straight away.
    assert!(!p.paused);
}

#[test]
fn update_without_pending_change_is_noop() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 0);
    driver.init().unwrap();
    driver.update();
    assert_eq!(probe.lock().unwrap().opened.len(), 1);
}

#[test]
fn device_list_starts_with_default() {
    let (driver, _, _) = make_driver(StreamMode::Push, 0);
    assert_eq!(
        driver.output_device_list(),
        vec!["Default".to_string(), "HDMI".to_string(), "Small".to_string()]
    );
    assert_eq!(driver.output_device(), "Default");
    assert_eq!(driver.name(), "SBC");
}

#[test]
fn finish_pauses_clears_and_closes() {
    let (mut driver, probe, _) = make_driver(StreamMode::Push, 0);
    driver.init().unwrap();
    driver.start();
    driver.finish();
    let p = probe.lock().unwrap();
    assert!(p.paused);
    assert_eq!(p.cleared, 1);
    assert_eq!(p.closed, 1);
    drop(p);
    assert!(!driver.is_active());
    // Dropping after finish must not close twice.
    drop(driver);
    assert_eq!(probe.lock().unwrap().closed, 1);
}

#[test]
fn pull_thread_feeds_queue_and_stops_on_finish() {
    let (mut driver, probe, _) = make_driver(StreamMode::Pull, 5 << 16);
    driver.init().unwrap();
    driver.start();

    let deadline = Instant::now() + Duration::from_secs(5);
    while probe.lock().unwrap().queued.len() < 2 && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(2));
    }
    driver.finish();

    let p = probe.lock().unwrap();
    // The queue never drains in this fake, so the cadence stalls at two cycles.
    assert_eq!(p.queued.len(), 2);
    assert!(p.queued.iter().flatten().all(|&s| s == 5 || s == 0));
    assert_eq!(p.closed, 1);
}

#[test]
fn lock_exposes_mixer() {
    let (driver, _, calls) = make_driver(StreamMode::Push, 0);
    {
        let mut lock = driver.lock();
        let mut buf = [0i32; 2];
        lock.mixer().mix(1, &mut buf);
    }
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn speaker_mode_follows_channel_count() {
    assert_eq!(SpeakerMode::from_channels(2), SpeakerMode::Stereo);
    assert_eq!(SpeakerMode::from_channels(4), SpeakerMode::Surround31);
    assert_eq!(SpeakerMode::from_channels(6), SpeakerMode::Surround51);
    assert_eq!(SpeakerMode::from_channels(8), SpeakerMode::Surround71);
    assert_eq!(SpeakerMode::from_channels(1), SpeakerMode::Stereo);
}

#[test]
fn wav_capture_records_queued_samples() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("capture.wav");
    let mut backend = WavCaptureBackend::new(&path);
    let spec = AudioSpec {
        mix_rate: 22_050,
        channels: 2,
        latency_frames: 4,
    };
    {
        let mut device = backend.open_queue(None, &spec).unwrap();
        device.queue(&[1, -1, 2, -2]).unwrap();
        // Paused devices do not drain.
        assert_eq!(device.queued_bytes(), 8);
        device.queue(&[3, -3]).unwrap();
        device.clear();
        assert_eq!(device.queued_bytes(), 0);
    }

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, 22_050);
    let samples: Vec<i16> = reader.into_samples::<i16>().map(Result::unwrap).collect();
    assert_eq!(samples, vec![1, -1, 2, -2, 3, -3]);
}

#[test]
fn wav_capture_rejects_unknown_device_and_callbacks() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = WavCaptureBackend::new(dir.path().join("out.wav"));
    let spec = AudioSpec {
        mix_rate: 48_000,
        channels: 2,
        latency_frames: 2048,
    };
    assert!(matches!(
        backend.open_queue(Some("HDMI"), &spec),
        Err(AudioError::DeviceOpen { .. })
    ));
    let name = backend.output_device_names().remove(0);
    assert!(backend.open_queue(Some(&name), &spec).is_ok());
}

#[test]
fn wav_capture_drains_in_real_time_when_unpaused() {
    let dir = tempfile::tempdir().unwrap();
    let mut backend = WavCaptureBackend::new(dir.path().join("paced.wav"));
    let spec = AudioSpec {
        mix_rate: 48_000,
        channels: 2,
        latency_frames: 2048,
    };
    let mut device = backend.open_queue(None, &spec).unwrap();
    device.queue(&vec![0i16; 4096]).unwrap();
    device.set_paused(false);
    std::thread::sleep(Duration::from_millis(100));
    // 100 ms at 192000 B/s is well past the 8192 queued bytes.
    assert_eq!(device.queued_bytes(), 0);
}
