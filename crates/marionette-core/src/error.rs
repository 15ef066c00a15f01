use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid damping: {0} (must be > 0)")]
    InvalidDamping(f32),

    #[error("Invalid bone thickness: {0} (must be > 0)")]
    InvalidThickness(f32),

    #[error("Too few chain links: {0} (must be >= 2)")]
    TooFewLinks(u32),

    #[error("Invalid link length range: [{min}, {max}] (need 0 < min <= max)")]
    InvalidLinkLength { min: f32, max: f32 },
}
