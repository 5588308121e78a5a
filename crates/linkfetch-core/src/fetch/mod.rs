//! Byte-stream transports behind one [`Fetcher`] trait.
//!
//! The engine only needs "open this link as a reader". [`SchemeFetcher`] is the
//! default: curl for network schemes, the local filesystem for `file://`. Tests
//! and embedders can pass any closure `Fn(&str) -> Result<ByteStream, FetchError>`.

mod error;
mod file;
mod http;

pub use error::FetchError;
pub use file::FileFetcher;
pub use http::CurlFetcher;

use std::io::Read;
use url::Url;

use crate::config::HttpConfig;

/// Readable body of a fetched link.
pub type ByteStream = Box<dyn Read + Send>;

/// Opens a byte stream for a link. Shared by every worker of a batch.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, link: &str) -> Result<ByteStream, FetchError>;
}

impl<F> Fetcher for F
where
    F: Fn(&str) -> Result<ByteStream, FetchError> + Send + Sync,
{
    fn fetch(&self, link: &str) -> Result<ByteStream, FetchError> {
        self(link)
    }
}

pub(crate) fn parse_link(link: &str) -> Result<Url, FetchError> {
    Url::parse(link).map_err(|source| FetchError::InvalidLink {
        link: link.to_string(),
        source,
    })
}

/// Default transport: dispatches on the link's scheme.
#[derive(Debug, Clone, Default)]
pub struct SchemeFetcher {
    http: CurlFetcher,
    file: FileFetcher,
}

impl SchemeFetcher {
    pub fn new(http: HttpConfig) -> Self {
        Self {
            http: CurlFetcher::new(http),
            file: FileFetcher,
        }
    }
}

impl Fetcher for SchemeFetcher {
    fn fetch(&self, link: &str) -> Result<ByteStream, FetchError> {
        let url = parse_link(link)?;
        match url.scheme() {
            "http" | "https" | "ftp" | "ftps" => self.http.fetch(link),
            "file" => self.file.open_url(&url),
            other => Err(FetchError::UnsupportedScheme(other.to_string())),
        }
    }
}
