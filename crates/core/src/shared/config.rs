use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::detection::domain::candidate_detector::ScanParams;
use crate::detection::domain::candidate_filter::{RegionHeuristics, SearchArea};
use crate::detection::domain::mouth_geometry::SmileThresholds;
use crate::shared::constants::{
    DEFAULT_CASCADE_DIR, DEFAULT_DEVICE_INDEX, DEFAULT_EVENT_LOG, DEFAULT_FACE_CONFIDENCE,
    DEFAULT_FRAME_INTERVAL_MS, DEFAULT_IMAGE_DIR, EVENT_LOG_ENV, FACE_CASCADE_FILE,
    FACE_MODEL_NAME, FACE_MODEL_URL, IMAGE_DIR_ENV, LANDMARK_MODEL_NAME, SMILE_CASCADE_FILE,
};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Which smile decision procedure to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// Face cascade plus smile-candidate cascade.
    #[default]
    Region,
    /// Face detector plus 68-point landmark geometry.
    Landmark,
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Region => write!(f, "region"),
            Strategy::Landmark => write!(f, "landmark"),
        }
    }
}

impl std::str::FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "region" => Ok(Strategy::Region),
            "landmark" => Ok(Strategy::Landmark),
            other => Err(ConfigError::Invalid(format!(
                "unknown strategy '{other}' (expected region or landmark)"
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    pub device_index: i32,
    pub frame_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: DEFAULT_DEVICE_INDEX,
            frame_interval_ms: DEFAULT_FRAME_INTERVAL_MS,
        }
    }
}

impl CaptureConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionConfig {
    /// Scan used by the cascade face detector.
    pub face_scan: ScanParams,
    #[serde(flatten)]
    pub heuristics: RegionHeuristics,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            face_scan: ScanParams::new(1.3, 5, 30),
            heuristics: RegionHeuristics::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventsConfig {
    pub log_path: PathBuf,
    pub image_dir: PathBuf,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from(DEFAULT_EVENT_LOG),
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    pub face_model: String,
    pub face_model_url: Option<String>,
    pub face_confidence: f64,
    pub landmark_model: String,
    pub landmark_model_url: Option<String>,
    /// Extra directory searched for model files after the user cache.
    pub bundled_dir: Option<PathBuf>,
    pub cascade_dir: PathBuf,
    pub face_cascade: String,
    pub smile_cascade: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            face_model: FACE_MODEL_NAME.to_string(),
            face_model_url: Some(FACE_MODEL_URL.to_string()),
            face_confidence: DEFAULT_FACE_CONFIDENCE,
            landmark_model: LANDMARK_MODEL_NAME.to_string(),
            landmark_model_url: None,
            bundled_dir: None,
            cascade_dir: PathBuf::from(DEFAULT_CASCADE_DIR),
            face_cascade: FACE_CASCADE_FILE.to_string(),
            smile_cascade: SMILE_CASCADE_FILE.to_string(),
        }
    }
}

impl ModelsConfig {
    pub fn face_cascade_path(&self) -> PathBuf {
        self.cascade_dir.join(&self.face_cascade)
    }

    pub fn smile_cascade_path(&self) -> PathBuf {
        self.cascade_dir.join(&self.smile_cascade)
    }
}

/// Application configuration. Every key is optional in the JSON file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmileGuardConfig {
    pub strategy: Strategy,
    pub capture: CaptureConfig,
    pub region: RegionConfig,
    pub landmark: SmileThresholds,
    pub events: EventsConfig,
    pub models: ModelsConfig,
}

impl SmileGuardConfig {
    /// Defaults, overlaid with `path` when given, then with the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Applies the event-location overrides found through `lookup`.
    pub fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, lookup: F) {
        if let Some(p) = lookup(EVENT_LOG_ENV).filter(|v| !v.is_empty()) {
            self.events.log_path = PathBuf::from(p);
        }
        if let Some(p) = lookup(IMAGE_DIR_ENV).filter(|v| !v.is_empty()) {
            self.events.image_dir = PathBuf::from(p);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        for (name, scan) in [
            ("region.face_scan", &self.region.face_scan),
            ("region.smile_scan", &self.region.heuristics.smile_scan),
        ] {
            if scan.scale_factor <= 1.0 {
                return invalid(format!("{name}.scale_factor must be > 1.0"));
            }
            if scan.max_size.is_some_and(|max| max < scan.min_size) {
                return invalid(format!("{name}.max_size must be >= min_size"));
            }
        }

        let fraction_ok = |f: f64| (0.0..1.0).contains(&f);
        match self.region.heuristics.search_area {
            SearchArea::FullFace {
                min_center_fraction: f,
            }
            | SearchArea::LowerFace { start_fraction: f }
                if !fraction_ok(f) =>
            {
                return invalid(format!("region.search_area fraction {f} must be in [0, 1)"));
            }
            _ => {}
        }

        if self.landmark.min_score > 3 {
            return invalid("landmark.min_score must be at most 3".into());
        }
        if !(0.0..=1.0).contains(&self.models.face_confidence) {
            return invalid("models.face_confidence must be in [0, 1]".into());
        }
        Ok(())
    }
}
