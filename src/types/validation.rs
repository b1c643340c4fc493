use serde::{Deserialize, Serialize};

/// The definite outcome of a code validation.
///
/// "No opinion" is deliberately not a variant: a provider that cannot decide
/// returns no result at all (`Option::None`), so an unknown can never be
/// mistaken for a negative determination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeValidationOutcome {
    Valid,
    Invalid,
}

/// Result of validating a code against a value set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeValidationResult {
    pub outcome: CodeValidationOutcome,
    /// Diagnostic message, set on invalid outcomes and display mismatches.
    pub message: Option<String>,
    /// Display text of the matched concept, if one was carried.
    pub display: Option<String>,
}

impl CodeValidationResult {
    /// Create a valid result
    pub fn valid() -> Self {
        Self {
            outcome: CodeValidationOutcome::Valid,
            message: None,
            display: None,
        }
    }

    /// Create a valid result with the matched concept's display
    pub fn valid_with_display(display: impl Into<String>) -> Self {
        Self {
            outcome: CodeValidationOutcome::Valid,
            message: None,
            display: Some(display.into()),
        }
    }

    /// Create an invalid result with a diagnostic message
    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            outcome: CodeValidationOutcome::Invalid,
            message: Some(message.into()),
            display: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Whether the outcome is a positive determination of membership
    pub fn is_ok(&self) -> bool {
        self.outcome == CodeValidationOutcome::Valid
    }
}

/// Per-call options for code validation.
///
/// Passed explicitly into every validation call; there is no ambient or
/// process-wide configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Attempt validation when the request carries no code system and the
    /// value set references exactly one system.
    pub infer_system: bool,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_infer_system(mut self, infer_system: bool) -> Self {
        self.infer_system = infer_system;
        self
    }
}
