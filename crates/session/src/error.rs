use std::path::PathBuf;

use thiserror::Error;

use elite_client::ClientError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no data directory available for token storage")]
    NoDataDir,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
