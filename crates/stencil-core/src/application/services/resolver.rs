//! Source resolution: descriptor → template root + manifest path.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        ports::{Filesystem, TemplateFetcher},
    },
    domain::{MANIFEST_FILE, SourceDescriptor},
    error::StencilResult,
};

/// Location of a template on local disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub root: PathBuf,
    pub manifest_path: PathBuf,
}

/// Turns a [`SourceDescriptor`] into a local template root.
///
/// Local sources may name the manifest file itself or the directory that
/// contains it. Remote sources are handed to the injected fetcher.
pub struct SourceResolver {
    fetcher: Box<dyn TemplateFetcher>,
}

impl SourceResolver {
    pub fn new(fetcher: Box<dyn TemplateFetcher>) -> Self {
        Self { fetcher }
    }

    #[instrument(skip_all, fields(source = %source))]
    pub fn resolve(
        &self,
        source: &SourceDescriptor,
        fs: &dyn Filesystem,
    ) -> StencilResult<ResolvedTemplate> {
        let resolved = match source {
            SourceDescriptor::Local { path, .. } => locate(path, fs)?,
            SourceDescriptor::Remote(remote) => {
                let dir = self.fetcher.fetch(remote)?;
                debug!(dir = %dir.display(), "remote template fetched");
                locate(&dir, fs)?
            }
        };

        debug!(
            root = %resolved.root.display(),
            manifest = %resolved.manifest_path.display(),
            "template resolved"
        );
        Ok(resolved)
    }
}

fn locate(path: &Path, fs: &dyn Filesystem) -> StencilResult<ResolvedTemplate> {
    if fs.is_file(path) {
        let root = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        return Ok(ResolvedTemplate {
            root,
            manifest_path: path.to_path_buf(),
        });
    }

    let manifest_path = path.join(MANIFEST_FILE);
    if fs.is_dir(path) && fs.is_file(&manifest_path) {
        return Ok(ResolvedTemplate {
            root: path.to_path_buf(),
            manifest_path,
        });
    }

    Err(ApplicationError::ManifestMissing {
        path: if fs.is_dir(path) {
            manifest_path
        } else {
            path.to_path_buf()
        },
    }
    .into())
}
