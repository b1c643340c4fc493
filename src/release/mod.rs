//! Schema-release adapters.
//!
//! The same logical model - concept, code system, value set - is structurally
//! different across FHIR releases: DSTU2 nests a code system directly inside
//! the value set, R4 always indirects through a separate CodeSystem resource.
//! Each release gets an independent adapter that maps its native JSON onto
//! the shared model in [`crate::types`]; the validator itself never sees a
//! release-specific structure.
//!
//! Adapters are selected by an explicit [`FhirRelease`] tag carried alongside
//! the resource, not inferred from its shape.

pub mod dstu2;
pub mod r4;

use serde_json::Value;

use crate::error::{TerminologyError, TerminologyResult};
use crate::provider::PrePopulatedProvider;
use crate::types::{CodeSystem, Concept, ConceptReference, ConceptSet, ConceptSetFilter, ValueSet};

pub use dstu2::Dstu2Adapter;
pub use r4::R4Adapter;

/// FHIR releases with distinct terminology resource shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FhirRelease {
    Dstu2,
    R4,
}

impl FhirRelease {
    pub fn as_str(&self) -> &'static str {
        match self {
            FhirRelease::Dstu2 => "DSTU2",
            FhirRelease::R4 => "R4",
        }
    }

    /// The adapter that understands this release's native structures.
    pub fn adapter(&self) -> &'static dyn ReleaseAdapter {
        match self {
            FhirRelease::Dstu2 => &Dstu2Adapter,
            FhirRelease::R4 => &R4Adapter,
        }
    }
}

impl std::fmt::Display for FhirRelease {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps one release's native JSON resources onto the shared model.
pub trait ReleaseAdapter: Send + Sync {
    fn release(&self) -> FhirRelease;

    /// Build a model [`CodeSystem`] from a native resource.
    fn code_system_from_json(&self, resource: &Value) -> TerminologyResult<CodeSystem>;

    /// Build a model [`ValueSet`] from a native resource.
    fn value_set_from_json(&self, resource: &Value) -> TerminologyResult<ValueSet>;

    /// Parse a native resource and register it with a repository.
    fn register(
        &self,
        repository: &PrePopulatedProvider,
        resource: &Value,
    ) -> TerminologyResult<()>;
}

pub(crate) fn resource_type(resource: &Value) -> &str {
    resource
        .get("resourceType")
        .and_then(|value| value.as_str())
        .unwrap_or("(none)")
}

pub(crate) fn expect_kind(resource: &Value, expected: &str) -> TerminologyResult<()> {
    let actual = resource_type(resource);
    if actual != expected {
        return Err(TerminologyError::kind_mismatch(expected, actual));
    }
    Ok(())
}

pub(crate) fn string_field<'a>(resource: &'a Value, field: &str) -> Option<&'a str> {
    resource.get(field).and_then(|value| value.as_str())
}

pub(crate) fn require_url(resource: &Value, kind: &str) -> TerminologyResult<String> {
    string_field(resource, "url")
        .map(str::to_string)
        .ok_or_else(|| TerminologyError::invalid_resource(kind, "missing required 'url'"))
}

/// Parse a nested concept-definition array, preserving the hierarchy.
pub(crate) fn concepts_from_json(value: Option<&Value>) -> Vec<Concept> {
    let Some(array) = value.and_then(|v| v.as_array()) else {
        return Vec::new();
    };
    array
        .iter()
        .filter_map(|item| {
            let code = string_field(item, "code")?;
            let mut concept = Concept::new(code);
            if let Some(display) = string_field(item, "display") {
                concept = concept.with_display(display);
            }
            concept.concepts = concepts_from_json(item.get("concept"));
            Some(concept)
        })
        .collect()
}

/// Parse one compose include/exclude component.
pub(crate) fn concept_set_from_json(value: &Value) -> ConceptSet {
    let mut set = ConceptSet::new();
    if let Some(system) = string_field(value, "system") {
        set = set.with_system(system);
    }
    if let Some(version) = string_field(value, "version") {
        set = set.with_version(version);
    }
    if let Some(concepts) = value.get("concept").and_then(|v| v.as_array()) {
        for item in concepts {
            let Some(code) = string_field(item, "code") else {
                continue;
            };
            let mut reference = ConceptReference::new(code);
            if let Some(display) = string_field(item, "display") {
                reference = reference.with_display(display);
            }
            set = set.with_concept(reference);
        }
    }
    if let Some(filters) = value.get("filter").and_then(|v| v.as_array()) {
        for item in filters {
            set = set.with_filter(ConceptSetFilter::new(
                string_field(item, "property").unwrap_or_default(),
                string_field(item, "op").unwrap_or_default(),
                string_field(item, "value").unwrap_or_default(),
            ));
        }
    }
    set
}

pub(crate) fn concept_sets_from_json(value: Option<&Value>) -> Vec<ConceptSet> {
    value
        .and_then(|v| v.as_array())
        .map(|array| array.iter().map(concept_set_from_json).collect())
        .unwrap_or_default()
}
