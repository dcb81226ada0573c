use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssemblerError>;

#[derive(Error, Debug)]
pub enum AssemblerError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Chunker error: {0}")]
    Chunker(#[from] nextedit_code_chunker::ChunkerError),

    #[error("Snapshot error: {0}")]
    Snapshot(#[from] nextedit_snapshot_store::SnapshotError),

    #[error("File not found in workspace: {0}")]
    FileNotFound(String),
}
