use std::fmt;
use std::path::PathBuf;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Unable to read source file")]
    File(#[from] std::io::Error),

    #[error("Unable to fetch source URL")]
    Http(#[from] ureq::Error),
}

/// Where raw CSV text comes from: a local file or an HTTP resource.
///
/// The whole body is read to a string before parsing begins; there is no
/// streaming. A failed load is fatal to that load attempt only and is never
/// retried here; retry is a caller-initiated re-trigger.
#[derive(Clone, Debug)]
pub enum Source {
    File(PathBuf),
    Url(String),
}

impl Source {
    pub fn load(&self) -> Result<String, SourceError> {
        match self {
            Self::File(path) => {
                debug!("Reading CSV source from {path:?}");
                Ok(std::fs::read_to_string(path)?)
            }
            Self::Url(url) => {
                debug!("Fetching CSV source from {url}");
                // Non-2xx statuses surface as `ureq::Error::StatusCode`.
                let mut response = ureq::get(url).call()?;
                Ok(response.body_mut().read_to_string()?)
            }
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => f.write_str(url),
        }
    }
}
