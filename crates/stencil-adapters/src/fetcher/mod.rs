//! Remote template fetchers.
//!
//! | Adapter         | Backing store                                 |
//! |-----------------|-----------------------------------------------|
//! | `GithubFetcher` | GitHub contents API, copied into a temp dir   |
//! | `MirrorFetcher` | local directory laid out as `owner/repo/path` |

mod github;
mod mirror;

pub use github::{DEFAULT_API_URL, GithubFetcher};
pub use mirror::MirrorFetcher;

use stencil_core::{application::ApplicationError, domain::RemoteSource, error::StencilError};

fn unreachable(source: &RemoteSource, reason: impl Into<String>) -> StencilError {
    ApplicationError::SourceUnreachable {
        source_str: source.as_str().to_string(),
        reason: reason.into(),
    }
    .into()
}
