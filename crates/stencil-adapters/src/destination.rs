//! Destination reads, one rendered path at a time.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use stencil_core::{
    application::ports::DestinationReader, domain::DestinationEntry, error::StencilResult,
};
use tracing::{instrument, trace};

use crate::filesystem::map_io_error;

/// Reads what a project root holds at a given relative path.
///
/// Symlinks are followed, so a linked directory or file reads as its
/// target. Anything the template does not render is never looked at.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsDestinationReader;

impl FsDestinationReader {
    pub fn new() -> Self {
        Self
    }
}

impl DestinationReader for FsDestinationReader {
    #[instrument(level = "trace", skip(self), fields(root = %root.display(), path = %path.display()))]
    fn read_entry(&self, root: &Path, path: &Path) -> StencilResult<Option<DestinationEntry>> {
        let full = root.join(path);
        let metadata = match fs::metadata(&full) {
            Ok(metadata) => metadata,
            // A file where a parent directory should be shows up as a
            // conflict on that parent instead.
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                trace!("absent");
                return Ok(None);
            }
            Err(e) => return Err(map_io_error(&full, e, "read destination")),
        };

        if metadata.is_dir() {
            return Ok(Some(DestinationEntry::Directory));
        }
        let bytes = fs::read(&full).map_err(|e| map_io_error(&full, e, "read file"))?;
        trace!(bytes = bytes.len(), "file");
        Ok(Some(DestinationEntry::File(bytes)))
    }
}
