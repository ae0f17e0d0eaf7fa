use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error(transparent)]
    Jwk(#[from] jwk::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
