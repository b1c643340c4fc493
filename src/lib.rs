//! octofhir-terminology - in-memory FHIR terminology validation.
//!
//! This crate decides whether a code is a legitimate member of a named,
//! versioned value set, without requiring a terminology server. It provides:
//!
//! - A release-agnostic model of code systems and value sets
//! - An ordered chain of validation providers with first-answer-wins
//!   resolution
//! - An in-memory validator working purely from enumerated concept lists
//! - Adapters mapping each FHIR release's native resource shapes onto the
//!   shared model
//!
//! Every validation has one of three outcomes: `Valid`, `Invalid`, or - when
//! local data cannot decide - no opinion at all, surfaced as `None` so it can
//! never be mistaken for a boolean.
//!
//! # Quick Start
//!
//! ```ignore
//! use octofhir_terminology::{
//!     InMemoryTerminologyProvider, PrePopulatedProvider, TerminologyProviderChain,
//!     ValidationOptions, ValueSet,
//! };
//! use std::sync::Arc;
//!
//! let repository = Arc::new(PrePopulatedProvider::new());
//! repository.add_value_set(my_value_set);
//!
//! let chain = TerminologyProviderChain::builder()
//!     .add_provider(Arc::new(InMemoryTerminologyProvider::new()))
//!     .add_provider(repository)
//!     .build();
//!
//! let outcome = chain
//!     .validate_code(
//!         &ValidationOptions::default(),
//!         Some("http://cs"),
//!         "code1",
//!         None,
//!         "http://vs",
//!     )
//!     .await?;
//! ```
//!
//! # Module Organization
//!
//! - [`types`] - Core model types (CodeSystem, ValueSet, results)
//! - [`provider`] - The provider contract, chain, repository, and validator
//! - [`release`] - Per-release adapters onto the shared model
//! - [`reference`] - Canonical `url|version` reference handling
//! - [`error`] - Error taxonomy and codes

pub mod error;
pub mod provider;
pub mod reference;
pub mod release;
pub mod types;

// Error exports
pub use error::{TerminologyError, TerminologyErrorCode, TerminologyResult};

// Reference exports
pub use reference::CanonicalReference;

// Type exports
pub use types::{
    CodeSystem, CodeValidationOutcome, CodeValidationResult, Concept, ConceptReference,
    ConceptSet, ConceptSetFilter, ContentMode, PublicationStatus, ValidationOptions, ValueSet,
};

// Provider exports
pub use provider::{
    CacheConfig, CachedTerminologyProvider, ChainBuilder, InMemoryTerminologyProvider,
    NoOpTerminologyProvider, PrePopulatedProvider, TerminologyProvider, TerminologyProviderChain,
    ValidationContext,
};

// Release adapter exports
pub use release::{Dstu2Adapter, FhirRelease, R4Adapter, ReleaseAdapter};
