//! Error types for gesture sources.
//!
//! Losing a hand is not an error: an absent hand is an ordinary
//! [`HandSample`](crate::HandSample).  These errors cover the hardware side
//! only: a device that cannot be opened or a pump that has gone away.

use thiserror::Error;

/// Errors raised while setting up or polling a gesture source.
#[derive(Debug, Error)]
pub enum SignalError {
    /// The tracking device or its service could not be opened.
    #[error("tracking device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The background pump thread stopped delivering frames.
    #[error("frame pump for `{source_name}` disconnected")]
    PumpDisconnected {
        /// Name of the source whose pump stopped.
        source_name: String,
    },

    /// The body tracker reported an unknown user index.
    #[error("no tracked user at index {0}")]
    UnknownUser(usize),
}

impl SignalError {
    /// Creates a device-unavailable error.
    #[must_use]
    pub fn device(reason: impl Into<String>) -> Self {
        Self::DeviceUnavailable(reason.into())
    }

    /// Creates a pump-disconnected error.
    #[must_use]
    pub fn disconnected(source_name: impl Into<String>) -> Self {
        Self::PumpDisconnected {
            source_name: source_name.into(),
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, SignalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = SignalError::device("LeapC service not running");
        let msg = format!("{err}");
        assert!(msg.contains("unavailable"));
        assert!(msg.contains("LeapC"));
    }

    #[test]
    fn error_disconnected_names_source() {
        let err = SignalError::disconnected("leap");
        assert!(format!("{err}").contains("`leap`"));
    }

    #[test]
    fn error_unknown_user() {
        let err = SignalError::UnknownUser(2);
        assert!(format!("{err}").contains('2'));
    }
}
