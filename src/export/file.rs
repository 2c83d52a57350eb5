use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use tracing::info;

use crate::foundation::error::PhotoboothResult;

/// Prefix shared by every exported file name.
pub const FILE_PREFIX: &str = "photobooth";

/// An encoded export ready to be handed to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportedFile {
    /// Suggested download name, e.g. `photobooth-1718000000000.png`.
    pub file_name: String,
    /// MIME type of `bytes`.
    pub media_type: &'static str,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

impl ExportedFile {
    pub(crate) fn new(
        stem: &str,
        extension: &str,
        media_type: &'static str,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: format!("{stem}-{}.{extension}", Utc::now().timestamp_millis()),
            media_type,
            bytes,
        }
    }

    /// Write the file into `dir`, creating the directory if needed. Returns the full path.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> PhotoboothResult<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create output directory '{}'", dir.display()))?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)
            .with_context(|| format!("write export '{}'", path.display()))?;
        info!(path = %path.display(), bytes = self.bytes.len(), "export written");
        Ok(path)
    }
}
