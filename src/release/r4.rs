//! Adapter for R4-style terminology resources.
//!
//! R4 keeps code systems and value sets as separate resources; a value set's
//! compose rules refer to code systems by canonical URL only.

use serde_json::Value;

use super::{
    FhirRelease, ReleaseAdapter, concept_sets_from_json, concepts_from_json, expect_kind,
    require_url, resource_type, string_field,
};
use crate::error::{TerminologyError, TerminologyResult};
use crate::provider::PrePopulatedProvider;
use crate::types::{CodeSystem, ContentMode, PublicationStatus, ValueSet};

#[derive(Debug, Default, Clone, Copy)]
pub struct R4Adapter;

impl ReleaseAdapter for R4Adapter {
    fn release(&self) -> FhirRelease {
        FhirRelease::R4
    }

    fn code_system_from_json(&self, resource: &Value) -> TerminologyResult<CodeSystem> {
        expect_kind(resource, "CodeSystem")?;
        let mut code_system = CodeSystem::new(require_url(resource, "CodeSystem")?);
        if let Some(version) = string_field(resource, "version") {
            code_system = code_system.with_version(version);
        }
        if let Some(status) = string_field(resource, "status") {
            code_system =
                code_system.with_status(PublicationStatus::parse_str(status).unwrap_or_default());
        }
        if let Some(content) = string_field(resource, "content") {
            code_system =
                code_system.with_content(ContentMode::parse_str(content).unwrap_or_default());
        }
        code_system.concepts = concepts_from_json(resource.get("concept"));
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
        Ok(value_set)
    }

    fn register(
        &self,
        repository: &PrePopulatedProvider,
        resource: &Value,
    ) -> TerminologyResult<()> {
        match resource_type(resource) {
            "CodeSystem" => {
                repository.add_code_system(self.code_system_from_json(resource)?);
                Ok(())
            }
            "ValueSet" => {
                repository.add_value_set(self.value_set_from_json(resource)?);
                Ok(())
            }
            other => Err(TerminologyError::kind_mismatch(
                "CodeSystem or ValueSet",
                other,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TerminologyError;
    use serde_json::json;

    #[test]
    fn test_code_system_round_trip() {
        let resource = json!({
            "resourceType": "CodeSystem",
            "url": "http://snomed.info/sct",
            "version": "http://snomed.info/sct/20611000087101/version/20210331",
            "status": "active",
            "content": "fragment",
            "concept": [
                {"code": "28571000087109", "display": "MODERNA COVID-19 mRNA-1273"}
            ]
        });

        let code_system = R4Adapter.code_system_from_json(&resource).unwrap();
        assert_eq!(code_system.url, "http://snomed.info/sct");
        assert_eq!(code_system.status, PublicationStatus::Active);
        assert_eq!(code_system.content, ContentMode::Fragment);
        assert_eq!(
            code_system
                .find_concept("28571000087109")
                .and_then(|c| c.display.as_deref()),
            Some("MODERNA COVID-19 mRNA-1273")
        );
    }

    #[test]
    fn test_value_set_with_compose() {
        let resource = json!({
            "resourceType": "ValueSet",
            "url": "http://ehealthontario.ca/fhir/ValueSet/vaccinecode",
            "version": "0.1.17",
            "status": "active",
            "compose": {
                "include": [{
                    "system": "http://snomed.info/sct",
                    "version": "http://snomed.info/sct/20611000087101/version/20210331",
                    "concept": [{"code": "28571000087109"}]
                }],
                "exclude": [{
                    "system": "http://snomed.info/sct",
                    "concept": [{"code": "419550004"}]
                }]
            }
        });

        let value_set = R4Adapter.value_set_from_json(&resource).unwrap();
        assert_eq!(value_set.version.as_deref(), Some("0.1.17"));
        assert_eq!(value_set.includes.len(), 1);
        assert_eq!(value_set.excludes.len(), 1);
        assert!(value_set.includes[0].find_concept("28571000087109").is_some());
    }

    #[test]
    fn test_wrong_kind_fails_fast() {
        let resource = json!({"resourceType": "Patient", "id": "1"});

        let err = R4Adapter.code_system_from_json(&resource).unwrap_err();
        assert!(matches!(err, TerminologyError::ResourceKindMismatch { .. }));

        let err = R4Adapter
            .register(&PrePopulatedProvider::new(), &resource)
            .unwrap_err();
        assert!(matches!(err, TerminologyError::ResourceKindMismatch { .. }));
    }

    #[test]
    fn test_missing_url_is_invalid() {
        let resource = json!({"resourceType": "ValueSet", "status": "active"});
        let err = R4Adapter.value_set_from_json(&resource).unwrap_err();
        assert!(matches!(err, TerminologyError::InvalidResource { .. }));
    }

    #[tokio::test]
    async fn test_register_files_both_kinds() {
        let repository = PrePopulatedProvider::new();
        R4Adapter
            .register(
                &repository,
                &json!({
                    "resourceType": "CodeSystem",
                    "url": "http://cs",
                    "version": "1.0",
                    "status": "active",
                    "content": "complete",
                    "concept": [{"code": "code1"}]
                }),
            )
            .unwrap();
        R4Adapter
            .register(
                &repository,
                &json!({
                    "resourceType": "ValueSet",
                    "url": "http://vs",
                    "status": "active",
                    "compose": {"include": [{"system": "http://cs"}]}
                }),
            )
            .unwrap();

        use crate::provider::TerminologyProvider;
        assert!(repository.fetch_code_system("http://cs|1.0").await.is_some());
        assert!(repository.fetch_value_set("http://vs").await.is_some());
    }
}
