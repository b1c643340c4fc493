//! Ordered composition of terminology providers.
//!
//! The chain asks each provider in turn and returns the first definite
//! answer. Order is caller-determined and significant: a provider earlier in
//! the chain shadows later ones, so an in-memory override registered ahead of
//! a default catalog wins. A chain is immutable once built.

use std::sync::Arc;

use async_trait::async_trait;

use super::{TerminologyProvider, ValidationContext};
use crate::error::TerminologyResult;
use crate::reference::CanonicalReference;
use crate::types::{CodeSystem, CodeValidationResult, ValidationOptions, ValueSet};

/// A fixed sequence of providers resolved first-answer-wins.
///
/// The chain itself implements [`TerminologyProvider`], so chains nest inside
/// other chains. Its entry points validate references before any provider is
/// consulted: a malformed reference rejects the call instead of quietly
/// becoming a no-opinion.
pub struct TerminologyProviderChain {
    providers: Vec<Arc<dyn TerminologyProvider>>,
}

impl TerminologyProviderChain {
    pub fn new(providers: Vec<Arc<dyn TerminologyProvider>>) -> Self {
        Self { providers }
    }

    pub fn builder() -> ChainBuilder {
        ChainBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Validate a code against the value set named by `value_set_ref`.
    ///
    /// Returns `Ok(None)` when no provider in the chain has an opinion; the
    /// caller must surface that as "unknown", never as a boolean.
    pub async fn validate_code(
        &self,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set_ref: &str,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        CanonicalReference::parse(value_set_ref)?;
        if let Some(system) = system {
            CanonicalReference::parse(system)?;
        }
        let ctx = ValidationContext::new(self);
        self.run_validate_code(&ctx, options, system, code, display, value_set_ref)
            .await
    }

    /// Validate a code against an already-resolved value set.
    pub async fn validate_code_in_value_set(
        &self,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set: &ValueSet,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        if let Some(system) = system {
            CanonicalReference::parse(system)?;
        }
        let ctx = ValidationContext::new(self);
        self.run_validate_code_in_value_set(&ctx, options, system, code, display, value_set)
            .await
    }

    async fn run_validate_code(
        &self,
        ctx: &ValidationContext<'_>,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set_ref: &str,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        for provider in &self.providers {
            let outcome = provider
                .validate_code(ctx, options, system, code, display, value_set_ref)
                .await?;
            if let Some(result) = outcome {
                tracing::debug!(provider = provider.name(), code, "provider answered");
                return Ok(Some(result));
            }
        }
        tracing::debug!(code, value_set = value_set_ref, "no provider had an opinion");
        Ok(None)
    }

    async fn run_validate_code_in_value_set(
        &self,
        ctx: &ValidationContext<'_>,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set: &ValueSet,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        for provider in &self.providers {
            let outcome = provider
                .validate_code_in_value_set(ctx, options, system, code, display, value_set)
                .await?;
            if let Some(result) = outcome {
                tracing::debug!(provider = provider.name(), code, "provider answered");
                return Ok(Some(result));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl TerminologyProvider for TerminologyProviderChain {
    fn name(&self) -> &str {
        "chain"
    }

    async fn validate_code(
        &self,
        ctx: &ValidationContext<'_>,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set_ref: &str,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        self.run_validate_code(ctx, options, system, code, display, value_set_ref)
            .await
    }

    async fn validate_code_in_value_set(
        &self,
        ctx: &ValidationContext<'_>,
        options: &ValidationOptions,
        system: Option<&str>,
        code: &str,
        display: Option<&str>,
        value_set: &ValueSet,
    ) -> TerminologyResult<Option<CodeValidationResult>> {
        self.run_validate_code_in_value_set(ctx, options, system, code, display, value_set)
            .await
    }

    async fn fetch_code_system(&self, reference: &str) -> Option<Arc<CodeSystem>> {
        for provider in &self.providers {
            if let Some(code_system) = provider.fetch_code_system(reference).await {
                return Some(code_system);
            }
        }
        None
    }

    async fn fetch_value_set(&self, reference: &str) -> Option<Arc<ValueSet>> {
        for provider in &self.providers {
            if let Some(value_set) = provider.fetch_value_set(reference).await {
                return Some(value_set);
            }
        }
        None
    }
}

/// Builder assembling a chain in the order providers are added.
#[derive(Default)]
pub struct ChainBuilder {
    providers: Vec<Arc<dyn TerminologyProvider>>,
}

impl ChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider; earlier providers shadow later ones.
    pub fn add_provider(mut self, provider: Arc<dyn TerminologyProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn build(self) -> TerminologyProviderChain {
        TerminologyProviderChain::new(self.providers)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::error::TerminologyError;

    /// Test double answering with a fixed outcome and counting calls.
    struct ScriptedProvider {
        outcome: Option<CodeValidationResult>,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn answering(outcome: Option<CodeValidationResult>) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl TerminologyProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn validate_code_in_value_set(
            &self,
            _ctx: &ValidationContext<'_>,
            _options: &ValidationOptions,
            _system: Option<&str>,
            _code: &str,
            _display: Option<&str>,
            _value_set: &ValueSet,
        ) -> TerminologyResult<Option<CodeValidationResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.outcome.clone())
        }
    }

    #[tokio::test]
    async fn test_first_definite_answer_short_circuits() {
        let first = ScriptedProvider::answering(Some(CodeValidationResult::valid()));
        let second = ScriptedProvider::answering(Some(CodeValidationResult::invalid("never")));
        let providers: Vec<Arc<dyn TerminologyProvider>> = vec![first.clone(), second.clone()];
        let chain = TerminologyProviderChain::new(providers);

        let outcome = chain
            .validate_code_in_value_set(
                &ValidationOptions::default(),
                Some("http://cs"),
                "code1",
                None,
                &ValueSet::new("http://vs"),
            )
            .await
            .unwrap()
            .unwrap();

        assert!(outcome.is_ok());
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_invalid_answer_also_short_circuits() {
        let first = ScriptedProvider::answering(Some(CodeValidationResult::invalid("no")));
        let second = ScriptedProvider::answering(Some(CodeValidationResult::valid()));
        let providers: Vec<Arc<dyn TerminologyProvider>> = vec![first.clone(), second.clone()];
        let chain = TerminologyProviderChain::new(providers);

        let outcome = chain
            .validate_code_in_value_set(
                &ValidationOptions::default(),
                Some("http://cs"),
                "code1",
                None,
                &ValueSet::new("http://vs"),
            )
            .await
            .unwrap()
            .unwrap();

        assert!(!outcome.is_ok());
        assert_eq!(second.calls(), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_has_no_opinion() {
        let first = ScriptedProvider::answering(None);
        let second = ScriptedProvider::answering(None);
        let providers: Vec<Arc<dyn TerminologyProvider>> = vec![first.clone(), second.clone()];
        let chain = TerminologyProviderChain::new(providers);

        let outcome = chain
            .validate_code_in_value_set(
                &ValidationOptions::default(),
                Some("http://cs"),
                "code1",
                None,
                &ValueSet::new("http://vs"),
            )
            .await
            .unwrap();

        assert!(outcome.is_none());
        assert_eq!(first.calls(), 1);
        assert_eq!(second.calls(), 1);
    }

    #[tokio::test]
    async fn test_malformed_reference_rejected_before_providers_run() {
        let provider = ScriptedProvider::answering(Some(CodeValidationResult::valid()));
        let providers: Vec<Arc<dyn TerminologyProvider>> = vec![provider.clone()];
        let chain = TerminologyProviderChain::new(providers);

        let outcome = chain
            .validate_code(
                &ValidationOptions::default(),
                Some("http://cs"),
                "code1",
                None,
                "http://vs|",
            )
            .await;

        assert!(matches!(
            outcome,
            Err(TerminologyError::MalformedReference { .. })
        ));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_resolves_through_providers_in_order() {
        use crate::provider::PrePopulatedProvider;

        let shadowing = PrePopulatedProvider::new();
        shadowing.add_value_set(ValueSet::new("http://vs").with_version("override"));
        let fallback = PrePopulatedProvider::new();
        fallback.add_value_set(ValueSet::new("http://vs").with_version("default"));
        fallback.add_value_set(ValueSet::new("http://vs-only-fallback"));

        let chain = TerminologyProviderChain::builder()
            .add_provider(Arc::new(shadowing))
            .add_provider(Arc::new(fallback))
            .build();

        let fetched = chain.fetch_value_set("http://vs").await.unwrap();
        assert_eq!(fetched.version.as_deref(), Some("override"));
        assert!(chain.fetch_value_set("http://vs-only-fallback").await.is_some());
        assert!(chain.fetch_value_set("http://vs-missing").await.is_none());
    }
}
