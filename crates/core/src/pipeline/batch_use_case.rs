//! Offline smile sorting for a directory of still images.
//!
//! Layout: `reader → detector → main [write outputs, count]`, stages joined
//! by bounded channels so decoding, detection and file output overlap.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender};

use crate::detection::domain::smile_detector::{SmileDetection, SmileDetector};
use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::video::domain::image_reader::ImageReader;
use crate::video::domain::image_writer::ImageWriter;

const DEFAULT_CHANNEL_CAPACITY: usize = 8;

pub const SMILE_DIR: &str = "smile";
pub const NO_SMILE_DIR: &str = "no_smile";

/// Counts for one batch run. `failed` files also count toward `total` and
/// are sorted as non-smiles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub smiles: usize,
    pub failed: usize,
}

impl std::fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} of {} images detected as smiles",
            self.smiles, self.total
        )?;
        if self.failed > 0 {
            write!(f, " ({} could not be processed)", self.failed)?;
        }
        Ok(())
    }
}

enum Outcome {
    Smile(SmileDetection),
    NoSmile,
    Failed(String),
}

pub struct BatchSmileUseCase {
    reader: Arc<dyn ImageReader>,
    detector: Arc<dyn SmileDetector>,
    writer: Arc<dyn ImageWriter>,
    on_progress: Option<Box<dyn Fn(usize, usize) + Send>>,
    channel_capacity: usize,
}

impl BatchSmileUseCase {
    pub fn new(
        reader: Arc<dyn ImageReader>,
        detector: Arc<dyn SmileDetector>,
        writer: Arc<dyn ImageWriter>,
        on_progress: Option<Box<dyn Fn(usize, usize) + Send>>,
    ) -> Self {
        Self {
            reader,
            detector,
            writer,
            on_progress,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }

    /// Sorts every image in `input_dir` into `<output_dir>/smile/`
    /// (annotated JPEG) or `<output_dir>/no_smile/` (original file).
    pub fn execute(
        &self,
        input_dir: &Path,
        output_dir: &Path,
    ) -> Result<BatchSummary, Box<dyn std::error::Error>> {
        let inputs = list_images(input_dir)?;
        let total = inputs.len();
        log::info!("Found {total} images in {}", input_dir.display());

        let cap = self.channel_capacity;
        let (frame_tx, frame_rx) = crossbeam_channel::bounded(cap);
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(cap);

        let reader_handle = spawn_reader(self.reader.clone(), inputs, frame_tx);
        let detect_handle = spawn_detector(self.detector.clone(), frame_rx, outcome_tx);

        let result = self.write_outcomes(outcome_rx, output_dir, total);

        join(reader_handle, "reader")?;
        join(detect_handle, "detector")?;
        let summary = result?;
        log::info!("Summary: {summary}");
        Ok(summary)
    }

    fn write_outcomes(
        &self,
        outcome_rx: Receiver<(PathBuf, Outcome)>,
        output_dir: &Path,
        total: usize,
    ) -> Result<BatchSummary, Box<dyn std::error::Error>> {
        let mut summary = BatchSummary::default();
        let mut smile_names = HashSet::new();

        for (path, outcome) in outcome_rx {
            let name = path.file_name().ok_or("input without file name")?;
            let label = match outcome {
                Outcome::Smile(detection) => {
                    let dest = output_dir
                        .join(SMILE_DIR)
                        .join(unique_name(smile_file_name(name), &mut smile_names));
                    self.writer.write(&dest, &detection.image)?;
                    summary.smiles += 1;
                    "SMILE"
                }
                Outcome::NoSmile => {
                    self.writer
                        .copy(&path, &output_dir.join(NO_SMILE_DIR).join(name))?;
                    "NO SMILE"
                }
                Outcome::Failed(reason) => {
                    log::warn!("{}: {reason}", path.display());
                    self.writer
                        .copy(&path, &output_dir.join(NO_SMILE_DIR).join(name))?;
                    summary.failed += 1;
                    "NO SMILE"
                }
            };
            summary.total += 1;
            log::info!("{}: {label}", name.to_string_lossy());
            if let Some(ref cb) = self.on_progress {
                cb(summary.total, total);
            }
        }
        Ok(summary)
    }
}

/// Annotated outputs are JPEG. Names already ending in `.jpg`/`.jpeg` are
/// kept, anything else gets `.jpg` appended so `a.png` and `a.jpeg` stay apart.
fn smile_file_name(name: &OsStr) -> String {
    let name = name.to_string_lossy();
    let is_jpeg = Path::new(name.as_ref())
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| matches!(e.to_ascii_lowercase().as_str(), "jpg" | "jpeg"))
        .unwrap_or(false);
    if is_jpeg {
        name.into_owned()
    } else {
        format!("{name}.jpg")
    }
}

/// Adds a `_N` suffix before the extension until `name` is unused.
fn unique_name(name: String, taken: &mut HashSet<String>) -> String {
    let path = Path::new(&name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut candidate = name.clone();
    let mut n = 1;
    while taken.contains(&candidate.to_ascii_lowercase()) {
        candidate = format!("{stem}_{n}.{ext}");
        n += 1;
    }
    taken.insert(candidate.to_ascii_lowercase());
    candidate
}

/// Image files directly inside `dir`, matched by extension
/// case-insensitively, in name order.
pub fn list_images(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && is_image(p))
        .collect();
    paths.sort();
    Ok(paths)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

fn spawn_reader(
    reader: Arc<dyn ImageReader>,
    inputs: Vec<PathBuf>,
    frame_tx: Sender<(PathBuf, Result<Frame, String>)>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for path in inputs {
            let frame = reader.read(&path).map_err(|e| e.to_string());
            if frame_tx.send((path, frame)).is_err() {
                break;
            }
        }
    })
}

fn spawn_detector(
    detector: Arc<dyn SmileDetector>,
    frame_rx: Receiver<(PathBuf, Result<Frame, String>)>,
    outcome_tx: Sender<(PathBuf, Outcome)>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        for (path, frame) in frame_rx {
            let outcome = match frame {
                Ok(frame) => match detector.detect(&frame) {
                    Ok(Some(detection)) => Outcome::Smile(detection),
                    Ok(None) => Outcome::NoSmile,
                    Err(e) => Outcome::Failed(e.to_string()),
                },
                Err(e) => Outcome::Failed(format!("unreadable image: {e}")),
            };
            if outcome_tx.send((path, outcome)).is_err() {
                break;
            }
        }
    })
}

fn join(handle: JoinHandle<()>, stage: &str) -> Result<(), Box<dyn std::error::Error>> {
    handle
        .join()
        .map_err(|_| format!("batch {stage} thread panicked").into())
}
