use thiserror::Error;

/// Error codes for terminology validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminologyErrorCode {
    /// TS1001: Canonical reference could not be parsed
    MalformedReference = 1001,
    /// TS1002: Resource kind mismatch
    ResourceKindMismatch = 1002,
    /// TS1003: Resource content is invalid
    InvalidResource = 1003,
    /// TS1004: Terminology service unavailable
    ServiceUnavailable = 1004,
}

impl std::fmt::Display for TerminologyErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TS{:04}", *self as u32)
    }
}

/// Errors that can occur during terminology validation
#[derive(Debug, Error)]
pub enum TerminologyError {
    /// A value-set or code-system reference could not be parsed into
    /// `url` or `url|version` form
    #[error("Malformed canonical reference: '{reference}'")]
    MalformedReference { reference: String },

    /// A resource of one kind was supplied where another was expected
    #[error("Resource kind mismatch: expected {expected}, got {actual}")]
    ResourceKindMismatch { expected: String, actual: String },

    /// A resource parsed but its content is unusable
    #[error("Invalid {kind} resource: {message}")]
    InvalidResource { kind: String, message: String },

    /// Service is unavailable
    #[error("Terminology service unavailable: {message}")]
    ServiceUnavailable { message: String },
}

impl TerminologyError {
    pub fn malformed_reference(reference: impl Into<String>) -> Self {
        Self::MalformedReference {
            reference: reference.into(),
        }
    }

    pub fn kind_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ResourceKindMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn invalid_resource(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResource {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Get the error code for this error
    pub fn code(&self) -> TerminologyErrorCode {
        match self {
            TerminologyError::MalformedReference { .. } => TerminologyErrorCode::MalformedReference,
            TerminologyError::ResourceKindMismatch { .. } => {
                TerminologyErrorCode::ResourceKindMismatch
            }
            TerminologyError::InvalidResource { .. } => TerminologyErrorCode::InvalidResource,
            TerminologyError::ServiceUnavailable { .. } => TerminologyErrorCode::ServiceUnavailable,
        }
    }
}

/// Result type for terminology operations
pub type TerminologyResult<T> = Result<T, TerminologyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = TerminologyError::malformed_reference("http://vs||bad");
        assert_eq!(err.code(), TerminologyErrorCode::MalformedReference);
        assert_eq!(format!("{}", err.code()), "TS1001");

        let err = TerminologyError::kind_mismatch("ValueSet", "CodeSystem");
        assert_eq!(err.code(), TerminologyErrorCode::ResourceKindMismatch);
        assert_eq!(format!("{}", err.code()), "TS1002");
    }

    #[test]
    fn test_error_display() {
        let err = TerminologyError::kind_mismatch("ValueSet", "Patient");
        assert_eq!(
            err.to_string(),
            "Resource kind mismatch: expected ValueSet, got Patient"
        );
    }
}
