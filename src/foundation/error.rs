/// Convenience result type used across photoglyph.
pub type PhotoglyphResult<T> = Result<T, PhotoglyphError>;

/// Top-level error taxonomy used by the pipeline and the engine.
#[derive(thiserror::Error, Debug)]
pub enum PhotoglyphError {
    /// A source image could not be decoded. Local to one photo.
    #[error("decode error: {0}")]
    Decode(String),

    /// A variant encode failed. The photo's variant set stays incomplete until retried.
    #[error("encode error: {0}")]
    Encode(String),

    /// No photos were available to pack into an atlas.
    #[error("empty atlas: {0}")]
    EmptyAtlas(String),

    /// Glyph rasterization cannot proceed because no usable font is loaded.
    #[error("font unavailable: {0}")]
    FontUnavailable(String),

    /// The host drawing surface could not be attached.
    #[error("surface init error: {0}")]
    SurfaceInit(String),

    /// Invalid user-provided configuration or input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Invalid engine state transition or cancelled session.
    #[error("engine error: {0}")]
    Engine(String),

    /// Errors when serializing or deserializing documents.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PhotoglyphError {
    /// Build a [`PhotoglyphError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`PhotoglyphError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build a [`PhotoglyphError::EmptyAtlas`] value.
    pub fn empty_atlas(msg: impl Into<String>) -> Self {
        Self::EmptyAtlas(msg.into())
    }

    /// Build a [`PhotoglyphError::FontUnavailable`] value.
    pub fn font_unavailable(msg: impl Into<String>) -> Self {
        Self::FontUnavailable(msg.into())
    }

    /// Build a [`PhotoglyphError::SurfaceInit`] value.
    pub fn surface_init(msg: impl Into<String>) -> Self {
        Self::SurfaceInit(msg.into())
    }

    /// Build a [`PhotoglyphError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PhotoglyphError::Engine`] value.
    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    /// Build a [`PhotoglyphError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether the failure is scoped to a single photo in a batch.
    pub fn is_per_item(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Encode(_))
    }
}

impl From<serde_json::Error> for PhotoglyphError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serde(e.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
