//! Terminology providers and the validation chain.
//!
//! This module contains the provider contract and its implementations:
//!
//! - **[`chain`]** - Ordered composition of providers with first-answer-wins
//!   resolution
//! - **[`prepopulated`]** - In-memory repository of caller-registered code
//!   systems and value sets
//! - **[`in_memory`]** - Validator that decides membership from enumerated
//!   concept lists alone
//! - **[`cached`]** - Caching decorator around any provider
//!
//! # Provider contract
//!
//! Every provider exposes the same capability surface: validate a code
//! against a value set (by reference or by object) and fetch code systems or
//! value sets by canonical reference. A provider that cannot answer returns
//! `None` - "no opinion" - which tells the chain to ask the next provider.
//! Only a definite `CodeValidationResult` stops the chain.
//!
//! Remote implementations of the contract live outside this crate; they map
//! their transport failures to no-opinion so a flaky server degrades into a
//! fallback instead of a crash.
//!
//! # Example
//!
//! ```ignore
//! use octofhir_terminology::provider::{
//!     InMemoryTerminologyProvider, PrePopulatedProvider, TerminologyProviderChain,
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
//!     .validate_code(&options, Some("http://cs"), "code1", None, "http://vs")
//!     .await?;
//! ```

pub mod cached;
pub mod chain;
pub mod in_memory;
pub mod prepopulated;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::TerminologyResult;
use crate::types::{CodeSystem, CodeValidationResult, ValidationOptions, ValueSet};

pub use cached::{CacheConfig, CachedTerminologyProvider};
pub use chain::{ChainBuilder, TerminologyProviderChain};
pub use in_memory::InMemoryTerminologyProvider;
pub use prepopulated::PrePopulatedProvider;

/// Per-call context handed to every provider in a chain.
///
/// Carries the root of the running resolution so that a provider can resolve
/// references through the whole chain - a caller-supplied override earlier in
/// the chain then shadows anything a later provider would return.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    root: &'a dyn TerminologyProvider,
}

impl<'a> ValidationContext<'a> {
    pub fn new(root: &'a dyn TerminologyProvider) -> Self {
        Self { root }
    }

    /// The provider at the root of the running resolution.
    pub fn root(&self) -> &'a dyn TerminologyProvider {
        self.root
    }
}

/// Capability contract shared by every terminology provider.
///
/// All methods have no-opinion defaults, so an implementation only overrides
/// the capabilities it actually has: a repository implements the fetch pair,
/// a validator implements the validate pair.
#[async_trait]
pub trait TerminologyProvider: Send + Sync {
    /// Short provider name used in log events.
    fn name(&self) -> &str;

    /// Validate a code against the value set named by `value_set_ref`.
    ///
    /// # Arguments
    ///
    /// * `ctx` - Context carrying the root provider for reference resolution
    /// * `options` - Per-call validation options
    /// * `system` - Code system reference (`url` or `url|version`), if known
    /// * `code` - The code to validate
    /// * `display` - Display text supplied alongside the code, if any
    /// * `value_set_ref` - Value set reference (`url` or `url|version`)
    ///
    /// # Returns
    ///
    /// * `Ok(Some(result))` - A definite determination
    /// * `Ok(None)` - No opinion; the chain asks the next provider
    /// * `Err(_)` - The call itself was rejected (malformed input)
    async fn validate_code(
        &self,
        ctx: &ValidationContext<'_>,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set_ref: &str,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        let _ = (ctx, options, system, code, display, value_set_ref);
        Ok(None)
    }

    /// Validate a code against an already-resolved value set.
    async fn validate_code_in_value_set(
        &self,
        ctx: &ValidationContext<'_>,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set: &ValueSet,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        let _ = (ctx, options, system, code, display, value_set);
        Ok(None)
    }

    /// Fetch a code system by exact reference (`url` or `url|version`).
    async fn fetch_code_system(&self, reference: &str) -> Option<Arc<CodeSystem>> {
        let _ = reference;
        None
    }

    /// Fetch a value set by exact reference (`url` or `url|version`).
    async fn fetch_value_set(&self, reference: &str) -> Option<Arc<ValueSet>> {
        let _ = reference;
        None
    }
}

/// A provider with no capabilities: every call is a no-opinion.
///
/// Useful as a chain placeholder in tests.
#[derive(Debug, Default, Clone)]
pub struct NoOpTerminologyProvider;

impl NoOpTerminologyProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TerminologyProvider for NoOpTerminologyProvider {
    fn name(&self) -> &str {
        "no-op"
    }
}
