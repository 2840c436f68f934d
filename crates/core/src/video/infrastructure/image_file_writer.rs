use std::path::Path;

use crate::video::domain::image_writer::ImageWriter;

/// Writes images to the local filesystem, creating parent directories.
pub struct ImageFileWriter;

impl ImageFileWriter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ImageFileWriter {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_parent(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

impl ImageWriter for ImageFileWriter {
    fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        ensure_parent(path)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), Box<dyn std::error::Error>> {
        ensure_parent(to)?;
        std::fs::copy(from, to)?;
        Ok(())
    }
}
