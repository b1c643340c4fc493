//! Adapter for DSTU2-style terminology resources.
//!
//! DSTU2 has no standalone CodeSystem resource: a value set may carry its
//! code system inline in a `codeSystem` block. The adapter surfaces that
//! block twice - as a synthesized model [`CodeSystem`], and as an extra
//! enumerated include on the model [`ValueSet`] - and files the value set
//! under the inline system's url as well as its own, which is how legacy
//! callers look it up.

use serde_json::Value;

use super::{
    FhirRelease, ReleaseAdapter, concept_sets_from_json, concepts_from_json, expect_kind,
    require_url, string_field,
};
use crate::error::{TerminologyError, TerminologyResult};
use crate::provider::PrePopulatedProvider;
use crate::types::{
    CodeSystem, Concept, ConceptReference, ConceptSet, ContentMode, PublicationStatus, ValueSet,
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Dstu2Adapter;

impl Dstu2Adapter {
    fn inline_code_system(resource: &Value) -> Option<&Value> {
        resource
            .get("codeSystem")
            .filter(|block| string_field(block, "system").is_some())
    }
}

impl ReleaseAdapter for Dstu2Adapter {
    fn release(&self) -> FhirRelease {
        FhirRelease::Dstu2
    }

    /// Synthesize a code system from a value set's inline `codeSystem` block.
    ///
    /// The inline enumeration is the system's whole definition, so the
    /// synthesized content mode is `complete`.
    fn code_system_from_json(&self, resource: &Value) -> TerminologyResult<CodeSystem> {
        expect_kind(resource, "ValueSet")?;
        let Some(block) = resource.get("codeSystem") else {
            return Err(TerminologyError::invalid_resource(
                "ValueSet",
                "missing inline 'codeSystem'",
            ));
        };
        let Some(system) = string_field(block, "system") else {
            return Err(TerminologyError::invalid_resource(
                "ValueSet",
                "inline 'codeSystem' has no 'system'",
            ));
        };

        let mut code_system = CodeSystem::new(system).with_content(ContentMode::Complete);
        if let Some(version) = string_field(block, "version") {
            code_system = code_system.with_version(version);
        }
        if let Some(status) = string_field(resource, "status") {
            code_system =
                code_system.with_status(PublicationStatus::parse_str(status).unwrap_or_default());
        }
        code_system.concepts = concepts_from_json(block.get("concept"));
        Ok(code_system)
    }

    fn value_set_from_json(&self, resource: &Value) -> TerminologyResult<ValueSet> {
        expect_kind(resource, "ValueSet")?;
        let mut value_set = ValueSet::new(require_url(resource, "ValueSet")?);
        if let Some(version) = string_field(resource, "version") {
            value_set = value_set.with_version(version);
        }
        if let Some(status) = string_field(resource, "status") {
            value_set =
                value_set.with_status(PublicationStatus::parse_str(status).unwrap_or_default());
        }
        if let Some(compose) = resource.get("compose") {
            value_set.includes = concept_sets_from_json(compose.get("include"));
            value_set.excludes = concept_sets_from_json(compose.get("exclude"));
        }
        if let Some(block) = Self::inline_code_system(resource) {
            let system = string_field(block, "system").unwrap_or_default();
            let mut include = ConceptSet::new().with_system(system);
            if let Some(version) = string_field(block, "version") {
                include = include.with_version(version);
            }
            for concept in flatten(concepts_from_json(block.get("concept"))) {
                let mut reference = ConceptReference::new(concept.code);
                if let Some(display) = concept.display {
                    reference = reference.with_display(display);
                }
                include = include.with_concept(reference);
            }
            value_set = value_set.with_include(include);
        }
        Ok(value_set)
    }

    /// Register a DSTU2 value set, filing it under the inline code system's
    /// url as well as its own so both keys resolve to the same object.
    fn register(
        &self,
        repository: &PrePopulatedProvider,
        resource: &Value,
    ) -> TerminologyResult<()> {
        let value_set = repository.add_value_set(self.value_set_from_json(resource)?);
        if Self::inline_code_system(resource).is_some() {
            let code_system = self.code_system_from_json(resource)?;
            repository.add_value_set_with_key(code_system.url.clone(), value_set);
            repository.add_code_system(code_system);
        }
        Ok(())
    }
}

/// Flatten a concept hierarchy into the codes it defines, document order.
fn flatten(concepts: Vec<Concept>) -> Vec<Concept> {
    let mut out = Vec::new();
    for mut concept in concepts {
        let children = std::mem::take(&mut concept.concepts);
        out.push(concept);
        out.extend(flatten(children));
    }
    out
}
