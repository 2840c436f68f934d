use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::bounding_box::BoundingBox;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize detection event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// One persisted detection: when it happened and the accepted boxes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionEvent {
    /// RFC 3339 local time.
    pub timestamp: String,
    pub coords: Vec<BoundingBox>,
}

/// Persists detections. Failures are reported to the caller, which logs
/// them; they never abort a detection request.
pub trait EventSink: Send + Sync {
    fn log_detection(&self, boxes: &[BoundingBox]) -> Result<(), SinkError>;

    /// Stores an encoded image, returning where it went if anywhere.
    fn save_image(&self, bytes: &[u8]) -> Result<Option<PathBuf>, SinkError>;
}

/// Discards everything.
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn log_detection(&self, _boxes: &[BoundingBox]) -> Result<(), SinkError> {
        Ok(())
    }

    fn save_image(&self, _bytes: &[u8]) -> Result<Option<PathBuf>, SinkError> {
        Ok(None)
    }
}
