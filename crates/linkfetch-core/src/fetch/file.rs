//! `file://` links opened straight from disk.

use std::fs::File;
use std::io::BufReader;
use url::Url;

use super::{parse_link, ByteStream, FetchError, Fetcher};

#[derive(Debug, Clone, Copy, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub(crate) fn open_url(&self, url: &Url) -> Result<ByteStream, FetchError> {
        let path = url
            .to_file_path()
            .map_err(|()| FetchError::NotLocalPath(url.to_string()))?;
        let file = File::open(&path).map_err(|source| FetchError::Open {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened local source");
        Ok(Box::new(BufReader::new(file)))
    }
}

impl Fetcher for FileFetcher {
    fn fetch(&self, link: &str) -> Result<ByteStream, FetchError> {
        let url = parse_link(link)?;
        if url.scheme() != "file" {
            return Err(FetchError::UnsupportedScheme(url.scheme().to_string()));
        }
        self.open_url(&url)
    }
}
