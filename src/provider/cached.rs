//! Caching decorator around a terminology provider.
//!
//! Wraps any provider with a TTL-bounded cache of definite validation
//! outcomes. No-opinion outcomes are never cached: the data a provider was
//! missing may be registered a moment later, and a cached "don't know" would
//! hide it until expiry.

use std::sync::Arc;

use async_trait::async_trait;
use moka::future::Cache;

use super::{TerminologyProvider, ValidationContext};
use crate::error::TerminologyResult;
use crate::types::{CodeSystem, CodeValidationResult, ValidationOptions, ValueSet};

/// Configuration for the validation result cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Time-to-live for cached validation results
    pub ttl: std::time::Duration,
    /// Maximum number of entries in the cache
    pub max_size: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: std::time::Duration::from_secs(3600),
            max_size: 10_000,
        }
    }
}

impl CacheConfig {
    pub fn new(ttl: std::time::Duration, max_size: u64) -> Self {
        Self { ttl, max_size }
    }

    /// Configuration for short-lived caches (5 minutes)
    pub fn short_lived() -> Self {
        Self {
            ttl: std::time::Duration::from_secs(300),
            max_size: 1_000,
        }
    }

    /// Configuration for long-lived caches (24 hours)
    pub fn long_lived() -> Self {
        Self {
            ttl: std::time::Duration::from_secs(86400),
            max_size: 50_000,
        }
    }
}

/// Cache key for reference-based validation lookups
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    value_set_ref: String,
    system: Option<String>,
    code: String,
    display: Option<String>,
}

/// A provider that caches another provider's definite answers.
///
/// Only the reference-based `validate_code` path is cached; validation
/// against a caller-held value set object and the fetch pair pass straight
/// through to the wrapped provider.
pub struct CachedTerminologyProvider {
    inner: Arc<dyn TerminologyProvider>,
    cache: Cache<CacheKey, CodeValidationResult>,
    name: String,
}

impl CachedTerminologyProvider {
    pub fn new(inner: Arc<dyn TerminologyProvider>, config: CacheConfig) -> Self {
        let cache = Cache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_size)
            .build();
        let name = format!("cached({})", inner.name());

        Self { inner, cache, name }
    }

    /// Number of definite outcomes currently cached.
    pub fn cached_entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop every cached outcome.
    pub fn clear_cache(&self) {
        self.cache.invalidate_all();
    }

    #[cfg(test)]
    async fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks().await;
    }
}

#[async_trait]
impl TerminologyProvider for CachedTerminologyProvider {
    fn name(&self) -> &str {
        &self.name
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
        let key = CacheKey {
            value_set_ref: value_set_ref.to_string(),
            system: system.map(str::to_string),
            code: code.to_string(),
            display: display.map(str::to_string),
        };

        if let Some(result) = self.cache.get(&key).await {
            tracing::trace!(code, value_set = value_set_ref, "validation cache hit");
            return Ok(Some(result));
        }

        let outcome = self
            .inner
            .validate_code(ctx, options, system, code, display, value_set_ref)
            .await?;

        if let Some(result) = &outcome {
            self.cache.insert(key, result.clone()).await;
        }

        Ok(outcome)
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
        self.inner
            .validate_code_in_value_set(ctx, options, system, code, display, value_set)
            .await
    }

    async fn fetch_code_system(&self, reference: &str) -> Option<Arc<CodeSystem>> {
        self.inner.fetch_code_system(reference).await
    }

    async fn fetch_value_set(&self, reference: &str) -> Option<Arc<ValueSet>> {
        self.inner.fetch_value_set(reference).await
    }
}
