/// Convenience result type used across Puppetry.
pub type PuppetryResult<T> = Result<T, PuppetryError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Every variant is local to one object or operation: a failed call never leaves the scene or
/// timeline half-updated.
#[derive(thiserror::Error, Debug)]
pub enum PuppetryError {
    /// Invalid caller-provided data (unknown ids, out-of-range settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// Rig markup could not be read at all.
    #[error("rig error: {0}")]
    Rig(String),

    /// Screen geometry needed by an operation could not be resolved.
    #[error("geometry unavailable: {0}")]
    Geometry(String),

    /// Errors while editing or evaluating timeline state.
    #[error("timeline error: {0}")]
    Timeline(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PuppetryError {
    /// Build a [`PuppetryError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`PuppetryError::Rig`] value.
    pub fn rig(msg: impl Into<String>) -> Self {
        Self::Rig(msg.into())
    }

    /// Build a [`PuppetryError::Geometry`] value.
    pub fn geometry(msg: impl Into<String>) -> Self {
        Self::Geometry(msg.into())
    }

    /// Build a [`PuppetryError::Timeline`] value.
    pub fn timeline(msg: impl Into<String>) -> Self {
        Self::Timeline(msg.into())
    }

    /// Build a [`PuppetryError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Return `true` for failures the user can retry once the scene has been laid out again.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Geometry(_))
    }
}

impl From<serde_json::Error> for PuppetryError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde(err.to_string())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
