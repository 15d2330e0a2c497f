use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid key size: must be exactly {expected} bytes, got {len}")]
    KeyConfiguration { expected: usize, len: usize },
    #[error("token is invalid")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
    #[error("failed to encode token: {0}")]
    Encode(String),
}
