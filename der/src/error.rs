use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("parser error {0:?}")]
    Parser(nom::error::ErrorKind),
    #[error("parser incomplete: {0:?}")]
    ParserIncomplete(nom::Needed),
}

impl From<nom::Err<nom::error::Error<&[u8]>>> for Error {
    fn from(err: nom::Err<nom::error::Error<&[u8]>>) -> Self {
        match err {
            nom::Err::Incomplete(needed) => Error::ParserIncomplete(needed),
            nom::Err::Error(e) | nom::Err::Failure(e) => Error::Parser(e.code),
        }
    }
}
