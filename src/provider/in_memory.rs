//! In-memory code validation over enumerated concept lists.
//!
//! The validator decides membership from what the value set itself
//! enumerates, plus any locally known code systems, and nothing else. It is
//! deliberately conservative: whenever a compose rule cannot be evaluated
//! from local data - a filter expression, an unresolvable versioned system
//! reference, a fragment code system - the answer is "no opinion", never a
//! guessed `Invalid`.
//!
//! # Resolution rules
//!
//! For each include whose system matches the request:
//!
//! - a filter makes the whole call undecidable in memory,
//! - an enumerated include whose code system resolves locally is
//!   authoritative: a listed code is a member, an unlisted one is not,
//! - an enumerated include whose system is entirely unknown locally is taken
//!   at its word for the codes it lists, and proves nothing about others,
//! - an enumerated include naming a version that conflicts with the locally
//!   catalogued code system cannot be evaluated at all,
//! - an include with no concepts selects the whole system; membership then
//!   follows the code system's concept hierarchy, and absence only counts
//!   when the code system's content is `complete`.
//!
//! Excludes are consulted only after an include produced a match, under the
//! same system- and version-matching rules.

use async_trait::async_trait;

use super::{TerminologyProvider, ValidationContext};
use crate::error::TerminologyResult;
use crate::reference::CanonicalReference;
use crate::types::{CodeValidationResult, ConceptSet, ValidationOptions, ValueSet};

/// Stateless provider validating codes from enumerated concept lists.
///
/// Resolves value sets and code systems through the chain root, so that
/// resources registered with any provider in the chain are visible to it.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTerminologyProvider;

impl InMemoryTerminologyProvider {
    pub fn new() -> Self {
        Self
    }

    fn system_matches(
        include_system: &str,
        include_version: Option<&str>,
        requested: &CanonicalReference,
    ) -> bool {
        if include_system != requested.url() {
            return false;
        }
        match requested.version() {
            None => true,
            Some(version) => include_version == Some(version),
        }
    }

    fn rule_system_key(rule_system: &str, rule_version: Option<&str>) -> String {
        match rule_version {
            Some(version) => format!("{rule_system}|{version}"),
            None => rule_system.to_string(),
        }
    }

    fn infer_requested_system(
        options: &ValidationOptions,
        value_set: &ValueSet,
    ) -> TerminologyResult<Option<CanonicalReference>> {
        if !options.infer_system {
            return Ok(None);
        }
        if value_set
            .includes
            .iter()
            .any(|include| include.system.is_none())
        {
            return Ok(None);
        }
        let systems = value_set.referenced_systems();
        match systems.as_slice() {
            [only] => Ok(Some(CanonicalReference::parse(only)?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl TerminologyProvider for InMemoryTerminologyProvider {
    fn name(&self) -> &str {
        "in-memory"
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
        CanonicalReference::parse(value_set_ref)?;
        let Some(value_set) = ctx.root().fetch_value_set(value_set_ref).await else {
            tracing::trace!(value_set = value_set_ref, "value set not known locally");
            return Ok(None);
        };
        self.validate_code_in_value_set(ctx, options, system, code, display, &value_set)
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
        if !value_set.has_compose() {
            return Ok(None);
        }

        let requested = match system {
            Some(system) => CanonicalReference::parse(system)?,
            None => match Self::infer_requested_system(options, value_set)? {
                Some(inferred) => inferred,
                None => return Ok(None),
            },
        };

        // matched concept display, once an include selects the code
        let mut candidate: Option<Option<String>> = None;
        let mut matched_any_system = false;
        let mut unknown = false;
        let mut checked_absent = false;

        for include in &value_set.includes {
            let Some(include_system) = include.system.as_deref() else {
                // cannot tell which system an anonymous include draws from
                return Ok(None);
            };
            if !Self::system_matches(include_system, include.version.as_deref(), &requested) {
                continue;
            }
            matched_any_system = true;

            if !include.is_enumerable() {
                tracing::trace!(
                    system = include_system,
                    value_set = %value_set.url,
                    "include carries a filter; not evaluable in memory"
                );
                return Ok(None);
            }

            let system_key = Self::rule_system_key(include_system, include.version.as_deref());
            let code_system = ctx.root().fetch_code_system(&system_key).await;

            if include.concepts.is_empty() {
                // whole-system include
                match &code_system {
                    Some(cs) => match cs.find_concept(code) {
                        Some(concept) => candidate = Some(concept.display.clone()),
                        None if cs.content.is_complete() => checked_absent = true,
                        None => unknown = true,
                    },
                    None => unknown = true,
                }
            } else {
                match &code_system {
                    Some(cs) => match include.find_concept(code) {
                        Some(reference) => {
                            let matched_display = reference.display.clone().or_else(|| {
                                cs.find_concept(code)
                                    .and_then(|concept| concept.display.clone())
                            });
                            candidate = Some(matched_display);
                        }
                        None => checked_absent = true,
                    },
                    None => {
                        let version_conflict = include.version.is_some()
                            && ctx.root().fetch_code_system(include_system).await.is_some();
                        if version_conflict {
                            tracing::trace!(
                                system = %system_key,
                                "include version does not match any catalogued code system"
                            );
                            unknown = true;
                        } else {
                            match include.find_concept(code) {
                                Some(reference) => candidate = Some(reference.display.clone()),
                                None => unknown = true,
                            }
                        }
                    }
                }
            }
        }

        let Some(matched_display) = candidate else {
            if !matched_any_system || unknown || !checked_absent {
                return Ok(None);
            }
            return Ok(Some(CodeValidationResult::invalid(format!(
                "Code '{code}' was not found in value set '{}'",
                value_set.url
            ))));
        };

        for exclude in &value_set.excludes {
            let Some(exclude_system) = exclude.system.as_deref() else {
                return Ok(None);
            };
            if !Self::system_matches(exclude_system, exclude.version.as_deref(), &requested) {
                continue;
            }
            if !exclude.is_enumerable() {
                // an unevaluable exclude could overturn the match
                return Ok(None);
            }
            if excluded_by(exclude, code) {
                return Ok(Some(CodeValidationResult::invalid(format!(
                    "Code '{code}' is excluded from value set '{}'",
                    value_set.url
                ))));
            }
        }

        let mismatch = match (matched_display.as_deref(), display) {
            (Some(expected), Some(supplied)) if expected != supplied => Some(format!(
                "Display '{supplied}' does not match expected '{expected}' for code '{code}'"
            )),
            _ => None,
        };
        let mut result = match matched_display {
            Some(display_text) => CodeValidationResult::valid_with_display(display_text),
            None => CodeValidationResult::valid(),
        };
        if let Some(message) = mismatch {
            result = result.with_message(message);
        }
        Ok(Some(result))
    }
}

/// An exclude with no enumerated concepts removes the whole system.
fn excluded_by(exclude: &ConceptSet, code: &str) -> bool {
    exclude.concepts.is_empty() || exclude.find_concept(code).is_some()
}
