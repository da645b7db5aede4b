use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("face `{0}` appears more than once in the face set")]
    DuplicateFace(String),
}

pub type Result<T> = std::result::Result<T, Error>;
