use std::sync::Arc;

use octofhir_terminology::{
    InMemoryTerminologyProvider, PrePopulatedProvider, TerminologyProviderChain,
};

/// Build the usual chain: in-memory validator first, repository behind it.
pub fn validation_chain(repository: Arc<PrePopulatedProvider>) -> TerminologyProviderChain {
    TerminologyProviderChain::builder()
        .add_provider(Arc::new(InMemoryTerminologyProvider::new()))
        .add_provider(repository)
        .build()
}
