use thiserror::Error;

#[derive(Error, Debug)]
pub enum TacticalError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Snapshot covers {snapshot} cells but the world has {world}")]
    SnapshotSizeMismatch { snapshot: usize, world: usize },
}

pub type Result<T> = std::result::Result<T, TacticalError>;
