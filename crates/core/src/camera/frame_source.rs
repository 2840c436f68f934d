use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;

use crate::shared::frame::Frame;
use crate::video::domain::capture_device::{CameraOpener, CaptureDevice, CaptureError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CameraState {
    Stopped,
    Running,
}

#[derive(Error, Debug)]
pub enum CameraError {
    #[error("camera already running")]
    AlreadyRunning,
    #[error("camera already stopped")]
    AlreadyStopped,
    #[error(transparent)]
    Open(#[from] CaptureError),
    #[error("failed to spawn capture thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl CameraError {
    /// True for start-while-running / stop-while-stopped.
    pub fn is_conflict(&self) -> bool {
        matches!(self, CameraError::AlreadyRunning | CameraError::AlreadyStopped)
    }
}

struct Slot {
    camera: CameraState,
    latest: Option<Frame>,
    /// Bumped on every start so a lingering loop never publishes into a
    /// later session.
    generation: u64,
}

struct Shared {
    slot: Mutex<Slot>,
    wake: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns one camera device and publishes its newest frame.
///
/// State and the frame slot sit behind a single mutex. Readers always get
/// a private copy; the slot is overwritten on each capture, never queued.
/// Start and stop are additionally serialized so a stop has joined the
/// previous capture thread (and released the device) before the next start
/// can open it again.
pub struct FrameSource {
    opener: Arc<dyn CameraOpener>,
    device_index: i32,
    interval: Duration,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl FrameSource {
    pub fn new(opener: Arc<dyn CameraOpener>, device_index: i32, interval: Duration) -> Self {
        Self {
            opener,
            device_index,
            interval,
            shared: Arc::new(Shared {
                slot: Mutex::new(Slot {
                    camera: CameraState::Stopped,
                    latest: None,
                    generation: 0,
                }),
                wake: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    /// Opens the device and starts the capture thread.
    ///
    /// Fails with [`CameraError::AlreadyRunning`] when running, or with the
    /// device error when it cannot be opened (state stays `Stopped`).
    pub fn start(&self) -> Result<(), CameraError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        if self.shared.lock().camera == CameraState::Running {
            log::warn!("Camera already started");
            return Err(CameraError::AlreadyRunning);
        }

        let device = self.opener.open(self.device_index).map_err(|e| {
            log::error!("Failed to open webcam: {e}");
            e
        })?;

        let generation = {
            let mut slot = self.shared.lock();
            slot.camera = CameraState::Running;
            slot.latest = None;
            slot.generation += 1;
            slot.generation
        };

        let shared = self.shared.clone();
        let interval = self.interval;
        let spawned = thread::Builder::new()
            .name("frame-capture".into())
            .spawn(move || capture_loop(&shared, device, generation, interval));

        match spawned {
            Ok(handle) => {
                *worker = Some(handle);
                log::info!("Camera {} started", self.device_index);
                Ok(())
            }
            Err(e) => {
                // The device moved into the failed closure and is dropped with it.
                self.shared.lock().camera = CameraState::Stopped;
                log::error!("Failed to spawn capture thread: {e}");
                Err(CameraError::Spawn(e))
            }
        }
    }

    /// Stops capture, releases the device and clears the published frame.
    ///
    /// Returns after the capture thread has finished its current iteration.
    pub fn stop(&self) -> Result<(), CameraError> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);

        {
            let mut slot = self.shared.lock();
            if slot.camera == CameraState::Stopped {
                log::info!("Camera already stopped");
                return Err(CameraError::AlreadyStopped);
            }
            slot.camera = CameraState::Stopped;
            slot.latest = None;
        }
        self.shared.wake.notify_all();

        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                log::error!("Capture thread panicked");
            }
        }
        log::info!("Camera stopped and resources released");
        Ok(())
    }

    /// Copy of the newest frame, or `None` before the first successful read
    /// and after a failed one.
    pub fn latest_frame(&self) -> Option<Frame> {
        self.shared.lock().latest.clone()
    }

    pub fn is_running(&self) -> bool {
        self.state() == CameraState::Running
    }

    pub fn state(&self) -> CameraState {
        self.shared.lock().camera
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.stop();
        }
    }
}

fn capture_loop(
    shared: &Shared,
    mut device: Box<dyn CaptureDevice>,
    generation: u64,
    interval: Duration,
) {
    let is_current =
        |slot: &Slot| slot.camera == CameraState::Running && slot.generation == generation;
    let mut sequence = 0u64;

    loop {
        if !is_current(&shared.lock()) {
            break;
        }

        // Read without holding the lock; readers keep seeing the old frame.
        let result = device.read();

        let mut slot = shared.lock();
        if !is_current(&slot) {
            break;
        }
        match result {
            Ok(frame) => {
                sequence += 1;
                slot.latest = Some(frame.with_sequence(sequence));
            }
            Err(e) => {
                log::warn!("{e}");
                slot.latest = None;
            }
        }

        let _ = shared
            .wake
            .wait_timeout_while(slot, interval, |s| is_current(s))
            .unwrap_or_else(PoisonError::into_inner);
    }

    device.release();
    log::debug!("Capture loop for session {generation} exited");
}
