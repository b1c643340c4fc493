//! Core model types for terminology validation.
//!
//! The model is deliberately release-agnostic: whatever shape a code system
//! or value set takes in a particular FHIR release, the adapters in
//! [`crate::release`] map it onto these types before validation runs.

pub mod code_system;
pub mod validation;
pub mod value_set;

pub use code_system::{CodeSystem, Concept, ContentMode, PublicationStatus};
pub use validation::{CodeValidationOutcome, CodeValidationResult, ValidationOptions};
pub use value_set::{ConceptReference, ConceptSet, ConceptSetFilter, ValueSet};
