/// Result alias that carries the custom [`MorphError`] type.
pub type Result<T> = std::result::Result<T, MorphError>;

/// Common error type for the core crate.
#[derive(Debug, thiserror::Error)]
pub enum MorphError {
    /// Free-form failure surfaced to the user as-is.
    #[error("{0}")]
    Message(String),
    /// Input that violates a structural requirement, such as a hand that does
    /// not carry exactly 21 landmarks.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The hand-landmark model could not be initialised. Detection stays
    /// inactive for the rest of the process.
    #[error("hand landmark model failed to load: {0}")]
    ModelLoad(String),
    /// Wrapper around standard IO errors.
    #[error("{0}")]
    Io(#[from] std::io::Error),
    /// Malformed configuration or session JSON.
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    /// Glyph image could not be decoded.
    #[error("{0}")]
    Image(#[from] image::ImageError),
}

impl MorphError {
    /// Creates a new error that simply wraps the provided message.
    pub fn msg<T: Into<String>>(msg: T) -> Self {
        Self::Message(msg.into())
    }

    pub fn invalid<T: Into<String>>(msg: T) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_pick_their_variant() {
        let err = MorphError::msg("surface lost");
        assert!(matches!(err, MorphError::Message(_)));
        assert_eq!(err.to_string(), "surface lost");

        let err = MorphError::invalid(String::from("display_hz must be positive"));
        assert!(matches!(err, MorphError::InvalidInput(_)));
        assert_eq!(err.to_string(), "invalid input: display_hz must be positive");
    }
}
