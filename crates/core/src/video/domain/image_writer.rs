use std::path::Path;

/// Persists images produced by the pipeline.
pub trait ImageWriter: Send + Sync {
    /// Writes already-encoded image bytes verbatim.
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>>;

    /// Copies an existing image file unchanged.
    fn copy(&self, from: &Path, to: &Path) -> Result<(), Box<dyn std::error::Error>>;
}
