//! Result and error types for canvas-probe.

use thiserror::Error;

/// Result type for canvas-probe operations
pub type ProbeResult<T> = Result<T, ProbeError>;

/// Errors that can occur while probing a canvas widget
#[derive(Debug, Error)]
pub enum ProbeError {
    /// A synthetic element attribute was read before it was set
    #[error("Element '{id}' {attribute} not set")]
    ElementNotPositioned {
        /// Element identifier
        id: String,
        /// Attribute that was missing (`location` or `size`)
        attribute: &'static str,
    },

    /// Contour or centroid requested on an element that has no usable geometry
    #[error("Element '{id}': {message}")]
    Geometry {
        /// Element identifier
        id: String,
        /// Error message
        message: String,
    },

    /// Widget identifier not present in the synthetic DOM
    #[error("Unknown widget '{id}'")]
    UnknownWidget {
        /// Widget identifier
        id: String,
    },

    /// Layout table violates its invariants
    #[error("Invalid layout '{table}': {message}")]
    InvalidLayout {
        /// Layout table name
        table: String,
        /// Error message
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Operation called in the wrong page state
    #[error("Invalid state: {message}")]
    InvalidState {
        /// Error message
        message: String,
    },

    /// Bounded wait elapsed
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// Description of the awaited condition
        waited_for: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Generic driver failure (element lookup, script evaluation)
    #[error("Driver error: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    Input {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    Screenshot {
        /// Error message
        message: String,
    },

    /// Image processing error (decoding, resizing, encoding)
    #[error("Image processing failed: {message}")]
    ImageProcessing {
        /// Error message
        message: String,
    },

    /// OCR engine failure
    #[error("OCR failed: {message}")]
    Ocr {
        /// Error message
        message: String,
    },

    /// Displayed text is not a number
    #[error("Display text {text:?} is not a number")]
    DisplayParse {
        /// Raw recognized text
        text: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ProbeError {
    /// Create a geometry error for an element
    #[must_use]
    pub fn geometry(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Geometry {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create a driver error
    #[must_use]
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an invalid state error
    #[must_use]
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create an image processing error
    #[must_use]
    pub fn image(message: impl Into<String>) -> Self {
        Self::ImageProcessing {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_element_not_positioned_message() {
        let err = ProbeError::ElementNotPositioned {
            id: "btn_7".to_string(),
            attribute: "location",
        };
        assert_eq!(err.to_string(), "Element 'btn_7' location not set");
    }

    #[test]
    fn test_timeout_message() {
        let err = ProbeError::Timeout {
            ms: 60_000,
            waited_for: "#spinner hidden".to_string(),
        };
        assert!(err.to_string().contains("60000ms"));
        assert!(err.to_string().contains("#spinner hidden"));
    }

    #[test]
    fn test_display_parse_keeps_raw_text() {
        let err = ProbeError::DisplayParse {
            text: "4?\n".to_string(),
        };
        assert!(err.to_string().contains("\"4?\\n\""));
    }

    #[test]
    fn test_io_error_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: ProbeError = io_err.into();
        assert!(err.to_string().contains("I/O"));
    }
}
