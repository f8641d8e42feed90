use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] lookup_core::ConfigError),

    #[error(transparent)]
    Sources(#[from] lookup_sources::SourceError),

    #[error("failed to encode output: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to encode config: {0}")]
    Toml(#[from] toml::ser::Error),

    #[error("no usable sources in {0}")]
    NoSources(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
