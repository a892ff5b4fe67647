//! GitHub contents API fetcher.
//!
//! Lists `repos/{owner}/{repo}/contents/{path}` recursively and downloads
//! each file through its `download_url`. Files land in a [`TempDir`] that
//! lives as long as the fetcher, so the returned root stays valid for the
//! rest of the invocation.

use std::{
    fs,
    io::{self, Read},
    path::{Component, Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use serde::Deserialize;
use stencil_core::{application::ports::TemplateFetcher, domain::RemoteSource, error::StencilResult};
use tempfile::TempDir;
use thiserror::Error;
use tracing::{debug, info, instrument};

use super::unreachable;

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("stencil/", env!("CARGO_PKG_VERSION"));

/// Failures while talking to the contents API. Surfaced as `SourceUnreachable`.
#[derive(Error, Debug)]
enum FetchError {
    #[error("not found")]
    NotFound,
    #[error("HTTP request failed: {0}")]
    Request(#[from] Box<ureq::Error>),
    #[error("failed to read response: {0}")]
    Io(#[from] io::Error),
    #[error("unexpected response: {0}")]
    Unexpected(String),
}

impl From<ureq::Error> for FetchError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(404, _) => Self::NotFound,
            other => Self::Request(Box::new(other)),
        }
    }
}

/// One item of a contents listing.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    url: String,
    download_url: Option<String>,
}

/// A path names either a directory (array) or a single file (object).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Contents {
    Directory(Vec<ContentEntry>),
    File(Box<ContentEntry>),
}

pub struct GithubFetcher {
    api_url: String,
    token: Option<String>,
    agent: ureq::Agent,
    checkouts: Mutex<Vec<TempDir>>,
}

impl GithubFetcher {
    pub fn new(api_url: impl Into<String>, token: Option<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            agent,
            checkouts: Mutex::new(Vec::new()),
        }
    }

    fn get(&self, url: &str) -> Result<ureq::Response, FetchError> {
        let mut request = self
            .agent
            .get(url)
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.set("Authorization", &format!("Bearer {token}"));
        }
        Ok(request.call()?)
    }

    fn list(&self, url: &str) -> Result<Vec<ContentEntry>, FetchError> {
        match self.get(url)?.into_json::<Contents>()? {
            Contents::Directory(entries) => Ok(entries),
            Contents::File(entry) => Err(FetchError::Unexpected(format!(
                "'{}' is a file, expected a template directory",
                entry.name
            ))),
        }
    }

    fn download_dir(&self, url: &str, local: &Path) -> Result<usize, FetchError> {
        fs::create_dir_all(local)?;
        let mut files = 0;

        for entry in self.list(url)? {
            if !is_plain_name(&entry.name) {
                return Err(FetchError::Unexpected(format!(
                    "refusing entry name '{}'",
                    entry.name
                )));
            }
            let target = local.join(&entry.name);

            match (entry.kind.as_str(), &entry.download_url) {
                ("dir", _) => files += self.download_dir(&entry.url, &target)?,
                ("file", Some(download)) => {
                    let mut bytes = Vec::new();
                    self.get(download)?.into_reader().read_to_end(&mut bytes)?;
                    fs::write(&target, bytes)?;
                    files += 1;
                }
                (kind, _) => debug!(name = %entry.name, kind, "skipping entry"),
            }
        }

        Ok(files)
    }
}

impl TemplateFetcher for GithubFetcher {
    #[instrument(skip_all, fields(source = %source.as_str()))]
    fn fetch(&self, source: &RemoteSource) -> StencilResult<PathBuf> {
        let checkout = tempfile::Builder::new()
            .prefix("stencil-")
            .tempdir()
            .map_err(|e| unreachable(source, format!("cannot create temp dir: {e}")))?;

        let url = format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_url,
            encode_path(&source.owner),
            encode_path(&source.repo),
            encode_path(source.template_path()),
        );
        let root = checkout.path().to_path_buf();

        let files = self
            .download_dir(&url, &root)
            .map_err(|e| unreachable(source, e.to_string()))?;
        info!(files, "template downloaded");

        // A poisoned lock only means another fetch panicked; the list is still usable.
        self.checkouts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(checkout);
        Ok(root)
    }
}

fn is_plain_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

/// Percent-encode each segment of a repository path, keeping `/` separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;

    use super::*;
    use stencil_core::{
        application::ApplicationError,
        domain::SourceDescriptor,
        error::StencilError,
    };

    type Requests = Arc<Mutex<Vec<String>>>;

    /// Loopback HTTP server answering by request path; anything else is 404.
    ///
    /// Records `"<path> <authorization header>"` per request.
    fn serve(routes: impl FnOnce(&str) -> HashMap<String, String>) -> (String, Requests) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let routes = routes(&base);
        let requests = Requests::default();
        let log = Arc::clone(&requests);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let mut reader = BufReader::new(stream.try_clone().unwrap());

                let mut request_line = String::new();
                reader.read_line(&mut request_line).unwrap();
                let mut auth = String::new();
                loop {
                    let mut header = String::new();
                    reader.read_line(&mut header).unwrap();
                    let header = header.trim();
                    if header.is_empty() {
                        break;
                    }
                    if header.to_ascii_lowercase().starts_with("authorization:") {
                        auth = header.to_string();
                    }
                }

                let path = request_line.split_whitespace().nth(1).unwrap_or_default();
                log.lock().unwrap().push(format!("{path} {auth}"));
                let (status, body) = match routes.get(path) {
                    Some(body) => ("200 OK", body.as_str()),
                    None => ("404 Not Found", r#"{"message":"Not Found"}"#),
                };
                write!(
                    stream,
                    "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                )
                .unwrap();
            }
        });

        (base, requests)
    }

    fn remote(descriptor: &str) -> RemoteSource {
        match descriptor.parse::<SourceDescriptor>().unwrap() {
            SourceDescriptor::Remote(r) => r,
            other => panic!("expected remote, got {other:?}"),
        }
    }

    #[test]
    fn downloads_template_tree() {
        let (base, requests) = serve(|base| {
            HashMap::from([
                (
                    "/repos/acme/templates/contents/stencil".to_string(),
                    format!(
                        r#"[
                            {{"name":"stencil.toml","type":"file","url":"{base}/x","download_url":"{base}/raw/stencil.toml"}},
                            {{"name":"src","type":"dir","url":"{base}/repos/acme/templates/contents/stencil/src","download_url":null}},
                            {{"name":"link","type":"symlink","url":"{base}/y","download_url":null}}
                        ]"#
                    ),
                ),
                (
                    "/repos/acme/templates/contents/stencil/src".to_string(),
                    format!(
                        r#"[{{"name":"main.py.jinja","type":"file","url":"{base}/z","download_url":"{base}/raw/main.py.jinja"}}]"#
                    ),
                ),
                ("/raw/stencil.toml".to_string(), "[stencil]\nname = \"svc\"\n".to_string()),
                ("/raw/main.py.jinja".to_string(), "# {{ project_name }}\n".to_string()),
            ])
        });

        let fetcher = GithubFetcher::new(format!("{base}/"), Some("t0k".into()));
        let root = fetcher.fetch(&remote("gh://acme/templates")).unwrap();

        assert_eq!(
            fs::read_to_string(root.join("stencil.toml")).unwrap(),
            "[stencil]\nname = \"svc\"\n"
        );
        assert_eq!(
            fs::read_to_string(root.join("src/main.py.jinja")).unwrap(),
            "# {{ project_name }}\n"
        );
        assert!(!root.join("link").exists());

        let requests = requests.lock().unwrap();
        assert_eq!(requests.len(), 4);
        assert!(
            requests
                .iter()
                .all(|r| r.ends_with("Authorization: Bearer t0k")),
            "{requests:?}"
        );
    }

    #[test]
    fn subpath_is_encoded_per_segment() {
        let (base, requests) = serve(|_| {
            HashMap::from([(
                "/repos/acme/templates/contents/py%20svc/v1".to_string(),
                "[]".to_string(),
            )])
        });

        let fetcher = GithubFetcher::new(base, None);
        let root = fetcher
            .fetch(&remote("gh://acme/templates/py svc/v1"))
            .unwrap();

        assert!(root.is_dir());
        assert_eq!(
            requests.lock().unwrap().as_slice(),
            ["/repos/acme/templates/contents/py%20svc/v1 ".to_string()]
        );
    }

    #[test]
    fn missing_repository_is_unreachable() {
        let (base, _) = serve(|_| HashMap::new());
        let err = GithubFetcher::new(base, None)
            .fetch(&remote("gh://acme/missing"))
            .unwrap_err();

        let StencilError::Application(ApplicationError::SourceUnreachable { reason, .. }) = err
        else {
            panic!("expected unreachable, got {err:?}");
        };
        assert_eq!(reason, "not found");
    }

    #[test]
    fn encodes_reserved_characters() {
        assert_eq!(encode_path("stencil/sub dir"), "stencil/sub%20dir");
        assert_eq!(encode_path("{{ x }}"), "%7B%7B%20x%20%7D%7D");
        assert_eq!(encode_path("a-b_c.d~e"), "a-b_c.d~e");
        assert_eq!(encode_path("naïve/ü"), "na%C3%AFve/%C3%BC");
    }

    #[test]
    fn rejects_traversing_names() {
        assert!(is_plain_name("README.md"));
        assert!(is_plain_name("{{ project_name }}"));
        assert!(!is_plain_name(".."));
        assert!(!is_plain_name("a/b"));
        assert!(!is_plain_name(""));
    }

    #[test]
    fn contents_listing_parses_both_shapes() {
        let dir: Contents = serde_json::from_str(
            r#"[{"name":"a","type":"dir","url":"u","download_url":null}]"#,
        )
        .unwrap();
        assert!(matches!(dir, Contents::Directory(ref v) if v.len() == 1));

        let file: Contents = serde_json::from_str(
            r#"{"name":"f","type":"file","url":"u","download_url":"d","sha":"x"}"#,
        )
        .unwrap();
        assert!(matches!(file, Contents::File(_)));
    }

    #[test]
    fn connection_failure_is_unreachable() {
        // Port 9 (discard) is closed on any sane test host.
        let err = GithubFetcher::new("http://127.0.0.1:9", None)
            .fetch(&remote("gh://acme/templates"))
            .unwrap_err();
        assert!(matches!(
            err,
            StencilError::Application(ApplicationError::SourceUnreachable { .. })
        ));
    }
}
