use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),

    #[error("could not resolve a state directory")]
    NoStateDir,
}

pub type Result<T> = std::result::Result<T, Error>;
