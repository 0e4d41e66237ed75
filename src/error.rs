use thiserror::Error;

/// Errors surfaced by the show. Simulation steps themselves never fail; these
/// cover startup preconditions, configuration and terminal I/O.
#[derive(Debug, Error)]
pub enum Error {
    #[error("drawing surface is unusable ({width}x{height})")]
    InvalidSurface { width: f32, height: f32 },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
