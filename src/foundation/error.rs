/// Convenience result type used across promoframe.
pub type PromoResult<T> = Result<T, PromoError>;

/// Top-level error taxonomy used by the crate's APIs.
#[derive(thiserror::Error, Debug)]
pub enum PromoError {
    /// Invalid user-provided scene data.
    #[error("validation error: {0}")]
    Validation(String),

    /// A layer schedule that can never render consistently.
    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    /// A referenced raster asset could not be resolved.
    #[error("missing asset: {0}")]
    MissingAsset(String),

    /// Errors while loading, shaping or rasterizing fonts.
    #[error("font error: {0}")]
    Font(String),

    /// Errors while producing or writing frames.
    #[error("render error: {0}")]
    Render(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PromoError {
    /// Build a [`PromoError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PromoError::InvalidSchedule`] value.
    pub fn invalid_schedule(msg: impl Into<String>) -> Self {
        Self::InvalidSchedule(msg.into())
    }

    /// Build a [`PromoError::MissingAsset`] value.
    pub fn missing_asset(msg: impl Into<String>) -> Self {
        Self::MissingAsset(msg.into())
    }

    /// Build a [`PromoError::Font`] value.
    pub fn font(msg: impl Into<String>) -> Self {
        Self::Font(msg.into())
    }

    /// Build a [`PromoError::Render`] value.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }

    /// Build a [`PromoError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
