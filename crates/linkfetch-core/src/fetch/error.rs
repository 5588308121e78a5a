use std::io;
use std::path::PathBuf;

/// Failure to open or stream a link.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid link {link:?}: {source}")]
    InvalidLink {
        link: String,
        source: url::ParseError,
    },

    #[error("unsupported link scheme {0:?}")]
    UnsupportedScheme(String),

    #[error("not a local file link: {0}")]
    NotLocalPath(String),

    #[error("{}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("server returned HTTP {0}")]
    Status(u32),

    #[error(transparent)]
    Curl(#[from] curl::Error),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error("transfer ended without a result")]
    Disconnected,
}
