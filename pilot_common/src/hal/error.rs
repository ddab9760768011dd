//! Error types for backends and the display surface.

use thiserror::Error;

use crate::hal::display::{ElementId, ElementKind};

/// Error types for backend creation and device setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HalError {
    /// Backend initialization failed
    #[error("Initialization failed: {0}")]
    InitFailed(String),

    /// Sensor calibration did not settle
    #[error("Calibration failed: {0}")]
    CalibrationFailed(String),

    /// No backend registered under the requested name
    #[error("Driver not found: {0}")]
    DriverNotFound(String),

    /// Configuration rejected by the backend
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Error types for display-surface operations.
///
/// The display service logs and absorbs these; they never reach the
/// control loops.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    /// Element was never created or has been destroyed
    #[error("Unknown display element {0}")]
    UnknownElement(ElementId),

    /// Operation not supported by this element kind
    #[error("Display element {id} is not a {expected:?}")]
    WrongKind { id: ElementId, expected: ElementKind },

    /// Element id already in use
    #[error("Display element {0} already exists")]
    DuplicateElement(ElementId),

    /// The display service thread has exited
    #[error("Display service stopped")]
    ServiceStopped,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hal_error_display() {
        let err = HalError::InitFailed("imu missing".to_string());
        assert!(err.to_string().contains("imu missing"));
        let err = HalError::DriverNotFound("vexnet".to_string());
        assert_eq!(err.to_string(), "Driver not found: vexnet");
    }

    #[test]
    fn test_display_error_display() {
        let err = DisplayError::WrongKind {
            id: ElementId(3),
            expected: ElementKind::Button,
        };
        assert_eq!(err.to_string(), "Display element #3 is not a Button");
        assert_eq!(
            DisplayError::UnknownElement(ElementId(9)).to_string(),
            "Unknown display element #9"
        );
    }
}
