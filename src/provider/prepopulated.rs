//! In-memory repository of caller-registered terminology resources.

use std::sync::Arc;

use async_trait::async_trait;

use super::TerminologyProvider;
use crate::types::{CodeSystem, ValueSet};

/// A provider answering fetches purely from resources registered up front.
///
/// Each resource is registered under its own `url` and, when it carries a
/// version, also under `url|version`; both keys resolve to the same `Arc`.
/// Lookups are exact-key only - no version-tolerant matching happens here.
/// Re-registration under the same key overwrites silently, which callers use
/// to simulate "current state" across a test scenario.
///
/// Registration is expected to happen in a setup phase before validation
/// begins; concurrent validation against an unmodified repository is safe.
#[derive(Default)]
pub struct PrePopulatedProvider {
    code_systems: papaya::HashMap<String, Arc<CodeSystem>>,
    value_sets: papaya::HashMap<String, Arc<ValueSet>>,
}

impl PrePopulatedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a code system under its `url` and, if versioned, `url|version`.
    ///
    /// Returns the shared handle the repository now owns.
    pub fn add_code_system(&self, code_system: CodeSystem) -> Arc<CodeSystem> {
        let code_system = Arc::new(code_system);
        let map = self.code_systems.pin();
        map.insert(code_system.url.clone(), Arc::clone(&code_system));
        if let Some(version) = &code_system.version {
            map.insert(
                format!("{}|{}", code_system.url, version),
                Arc::clone(&code_system),
            );
        }
        tracing::debug!(url = %code_system.url, "registered code system");
        code_system
    }

    /// Register a value set under its `url` and, if versioned, `url|version`.
    ///
    /// Returns the shared handle the repository now owns.
    pub fn add_value_set(&self, value_set: ValueSet) -> Arc<ValueSet> {
        let value_set = Arc::new(value_set);
        let map = self.value_sets.pin();
        map.insert(value_set.url.clone(), Arc::clone(&value_set));
        if let Some(version) = &value_set.version {
            map.insert(
                format!("{}|{}", value_set.url, version),
                Arc::clone(&value_set),
            );
        }
        tracing::debug!(url = %value_set.url, "registered value set");
        value_set
    }

    /// Register an already-registered value set under an additional key.
    ///
    /// Legacy release adapters use this to file a value set under its inline
    /// code system's url as well as its own.
    pub fn add_value_set_with_key(&self, key: impl Into<String>, value_set: Arc<ValueSet>) {
        self.value_sets.pin().insert(key.into(), value_set);
    }

    pub fn code_system_count(&self) -> usize {
        self.code_systems.pin().len()
    }

    pub fn value_set_count(&self) -> usize {
        self.value_sets.pin().len()
    }

    pub fn clear(&self) {
        self.code_systems.pin().clear();
        self.value_sets.pin().clear();
    }
}

#[async_trait]
impl TerminologyProvider for PrePopulatedProvider {
    fn name(&self) -> &str {
        "pre-populated"
    }

    async fn fetch_code_system(&self, reference: &str) -> Option<Arc<CodeSystem>> {
        self.code_systems.pin().get(reference).cloned()
    }

    async fn fetch_value_set(&self, reference: &str) -> Option<Arc<ValueSet>> {
        self.value_sets.pin().get(reference).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Concept, ContentMode};

    #[tokio::test]
    async fn test_versioned_registration_has_two_keys() {
        let repository = PrePopulatedProvider::new();
        repository.add_code_system(
            CodeSystem::new("http://example.org/cs")
                .with_version("2.1")
                .with_content(ContentMode::Complete)
                .with_concept(Concept::new("code1")),
        );

        let by_url = repository.fetch_code_system("http://example.org/cs").await;
        let by_key = repository
            .fetch_code_system("http://example.org/cs|2.1")
            .await;
        assert!(by_url.is_some());
        assert!(by_key.is_some());
        assert!(Arc::ptr_eq(&by_url.unwrap(), &by_key.unwrap()));
    }

    #[tokio::test]
    async fn test_exact_key_lookup_only() {
        let repository = PrePopulatedProvider::new();
        repository.add_code_system(CodeSystem::new("http://example.org/cs").with_version("2.1"));

        assert!(
            repository
                .fetch_code_system("http://example.org/cs|9.9")
                .await
                .is_none()
        );
        assert!(
            repository
                .fetch_value_set("http://example.org/cs")
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let repository = PrePopulatedProvider::new();
        repository.add_value_set(ValueSet::new("http://example.org/vs").with_version("1"));
        repository.add_value_set(ValueSet::new("http://example.org/vs").with_version("2"));

        let fetched = repository
            .fetch_value_set("http://example.org/vs")
            .await
            .unwrap();
        assert_eq!(fetched.version.as_deref(), Some("2"));
        // the first version's qualified key survives alongside the second's
        assert_eq!(repository.value_set_count(), 3);
    }

    #[tokio::test]
    async fn test_additional_key_aliases_same_object() {
        let repository = PrePopulatedProvider::new();
        let value_set = repository.add_value_set(ValueSet::new("http://example.org/vs"));
        repository.add_value_set_with_key("http://example.org/cs", Arc::clone(&value_set));

        let by_url = repository
            .fetch_value_set("http://example.org/vs")
            .await
            .unwrap();
        let by_alias = repository
            .fetch_value_set("http://example.org/cs")
            .await
            .unwrap();
        assert!(Arc::ptr_eq(&by_url, &by_alias));
    }
}
