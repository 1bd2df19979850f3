//! Error types for the interaction core.
//!
//! Nothing in the per-tick path returns these.  They are raised while
//! validating configuration and while wiring the exhibit together.

use thiserror::Error;

/// Errors raised at load or start-up time.
#[derive(Debug, Error)]
pub enum RigError {
    /// A collaborator the component needs was never supplied.
    #[error("missing reference: {what}")]
    MissingReference {
        /// Which reference was missing.
        what: &'static str,
    },

    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration `{field}`: {reason}")]
    InvalidConfig {
        /// Dotted path of the offending field.
        field: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// An object id that is not part of the scene.
    #[error("unknown object id {0}")]
    UnknownObject(usize),
}

impl RigError {
    /// Creates a missing-reference error.
    #[must_use]
    pub fn missing(what: &'static str) -> Self {
        Self::MissingReference { what }
    }

    /// Creates an invalid-configuration error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, RigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_missing() {
        let err = RigError::missing("gesture source");
        assert_eq!(format!("{err}"), "missing reference: gesture source");
    }

    #[test]
    fn error_display_invalid() {
        let err = RigError::invalid("zoom.min_fov", "must be below zoom.max_fov");
        let msg = format!("{err}");
        assert!(msg.contains("zoom.min_fov"));
        assert!(msg.contains("below"));
    }
}
