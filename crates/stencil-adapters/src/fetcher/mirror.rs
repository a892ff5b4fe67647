use std::path::PathBuf;

use stencil_core::{application::ports::TemplateFetcher, domain::RemoteSource, error::StencilResult};
use tracing::{debug, instrument};

use super::unreachable;

/// Serves `gh://owner/repo/sub` from `<root>/owner/repo/sub`.
#[derive(Debug, Clone)]
pub struct MirrorFetcher {
    root: PathBuf,
}

impl MirrorFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TemplateFetcher for MirrorFetcher {
    #[instrument(skip_all, fields(source = %source.as_str()))]
    fn fetch(&self, source: &RemoteSource) -> StencilResult<PathBuf> {
        let path = self
            .root
            .join(&source.owner)
            .join(&source.repo)
            .join(source.template_path());

        if !path.is_dir() {
            return Err(unreachable(
                source,
                format!("not found in mirror at {}", path.display()),
            ));
        }
        debug!(path = %path.display(), "serving from mirror");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stencil_core::{
        application::ApplicationError,
        domain::SourceDescriptor,
        error::StencilError,
    };
    use tempfile::TempDir;

    fn remote(s: &str) -> RemoteSource {
        match s.parse::<SourceDescriptor>().unwrap() {
            SourceDescriptor::Remote(r) => r,
            other => panic!("expected remote, got {other:?}"),
        }
    }

    #[test]
    fn maps_to_owner_repo_subpath() {
        let temp = TempDir::new().unwrap();
        let expected = temp.path().join("acme/templates/python");
        std::fs::create_dir_all(&expected).unwrap();

        let path = MirrorFetcher::new(temp.path())
            .fetch(&remote("gh://acme/templates/python"))
            .unwrap();
        assert_eq!(path, expected);
    }

    #[test]
    fn defaults_to_stencil_subpath() {
        let temp = TempDir::new().unwrap();
        std::fs::create_dir_all(temp.path().join("acme/templates/stencil")).unwrap();

        let path = MirrorFetcher::new(temp.path())
            .fetch(&remote("gh://acme/templates"))
            .unwrap();
        assert!(path.ends_with("acme/templates/stencil"));
    }

    #[test]
    fn missing_entry_is_unreachable() {
        let temp = TempDir::new().unwrap();
        let err = MirrorFetcher::new(temp.path())
            .fetch(&remote("gh://acme/nothing"))
            .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::SourceUnreachable { .. })
        ));
    }
}
