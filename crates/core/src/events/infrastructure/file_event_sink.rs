use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Local};

use crate::events::domain::event_sink::{DetectionEvent, EventSink, SinkError};
use crate::shared::bounding_box::BoundingBox;
use crate::shared::config::EventsConfig;

/// Appends events as JSON lines and stores one image file per detection.
pub struct FileEventSink {
    log_path: PathBuf,
    image_dir: PathBuf,
    /// Serializes appends and file-name selection across request threads.
    write_lock: Mutex<()>,
}

impl FileEventSink {
    pub fn new(log_path: impl Into<PathBuf>, image_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_path: log_path.into(),
            image_dir: image_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &EventsConfig) -> Self {
        Self::new(&config.log_path, &config.image_dir)
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> SinkError + '_ {
    move |source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn create_parent(path: &Path) -> Result<(), SinkError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(io_error(parent))
        }
        _ => Ok(()),
    }
}

/// `smile_YYYYmmdd_HHMMSS_ffffff.jpg`
fn image_file_name(now: &DateTime<Local>) -> String {
    format!("smile_{}.jpg", now.format("%Y%m%d_%H%M%S_%6f"))
}

impl EventSink for FileEventSink {
    fn log_detection(&self, boxes: &[BoundingBox]) -> Result<(), SinkError> {
        let event = DetectionEvent {
            timestamp: Local::now().to_rfc3339(),
            coords: boxes.to_vec(),
        };
        let mut line = serde_json::to_string(&event)?;
        line.push('\n');

        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        create_parent(&self.log_path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .map_err(io_error(&self.log_path))?;
        file.write_all(line.as_bytes())
            .map_err(io_error(&self.log_path))?;
        log::debug!("Logged detection of {} box(es)", boxes.len());
        Ok(())
    }

    fn save_image(&self, bytes: &[u8]) -> Result<Option<PathBuf>, SinkError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        fs::create_dir_all(&self.image_dir).map_err(io_error(&self.image_dir))?;

        let name = image_file_name(&Local::now());
        let mut path = self.image_dir.join(&name);
        let mut suffix = 1;
        while path.exists() {
            path = self
                .image_dir
                .join(format!("{}_{suffix}.jpg", name.trim_end_matches(".jpg")));
            suffix += 1;
        }

        fs::write(&path, bytes).map_err(io_error(&path))?;
        log::info!("Saved detection image to {}", path.display());
        Ok(Some(path))
    }
}
