use serde::{Deserialize, Serialize};

use super::code_system::PublicationStatus;

/// A reference to a single concept inside a compose rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptReference {
    pub code: String,
    pub display: Option<String>,
}

impl ConceptReference {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: None,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

/// A filter expression inside a compose rule.
///
/// Filters are carried opaquely: evaluating one requires a terminology server
/// with knowledge of the code system's properties, so an in-memory provider
/// treats any rule that carries a filter as non-enumerable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConceptSetFilter {
    pub property: String,
    pub op: String,
    pub value: String,
}

impl ConceptSetFilter {
    pub fn new(
        property: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            property: property.into(),
            op: op.into(),
            value: value.into(),
        }
    }
}

/// A single include or exclude rule of a value set's compose.
///
/// Selects concepts from one code system, either by enumerating them, by
/// filter expression, or (with neither) by taking the whole system.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConceptSet {
    pub system: Option<String>,
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<ConceptReference>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<ConceptSetFilter>,
}

impl ConceptSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_concept(mut self, concept: ConceptReference) -> Self {
        self.concepts.push(concept);
        self
    }

    pub fn with_filter(mut self, filter: ConceptSetFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Whether the rule can be evaluated from its own enumeration alone.
    pub fn is_enumerable(&self) -> bool {
        self.filters.is_empty()
    }

    /// Find an enumerated concept by code.
    pub fn find_concept(&self, code: &str) -> Option<&ConceptReference> {
        self.concepts.iter().find(|concept| concept.code == code)
    }
}

/// A named, versioned selection of codes drawn from one or more code systems.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    pub url: String,
    pub version: Option<String>,
    pub status: PublicationStatus,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub includes: Vec<ConceptSet>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub excludes: Vec<ConceptSet>,
}

impl ValueSet {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: None,
            status: PublicationStatus::Unknown,
            includes: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_status(mut self, status: PublicationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_include(mut self, include: ConceptSet) -> Self {
        self.includes.push(include);
        self
    }

    pub fn with_exclude(mut self, exclude: ConceptSet) -> Self {
        self.excludes.push(exclude);
        self
    }

    /// Whether the value set carries any compose rules at all.
    pub fn has_compose(&self) -> bool {
        !self.includes.is_empty() || !self.excludes.is_empty()
    }

    /// The distinct systems referenced by the include rules.
    pub fn referenced_systems(&self) -> Vec<&str> {
        let mut systems: Vec<&str> = self
            .includes
            .iter()
            .filter_map(|include| include.system.as_deref())
            .collect();
        systems.sort_unstable();
        systems.dedup();
        systems
    }
}

impl std::fmt::Display for ValueSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueSet({})", self.url)?;
        if let Some(version) = &self.version {
            write!(f, " [{version}]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enumerable() {
        let include = ConceptSet::new()
            .with_system("http://example.org/cs")
            .with_concept(ConceptReference::new("code1"));
        assert!(include.is_enumerable());

        let filtered = include.with_filter(ConceptSetFilter::new("concept", "is-a", "parent"));
        assert!(!filtered.is_enumerable());
    }

    #[test]
    fn test_referenced_systems_dedup() {
        let vs = ValueSet::new("http://example.org/vs")
            .with_include(ConceptSet::new().with_system("http://b"))
            .with_include(ConceptSet::new().with_system("http://a"))
            .with_include(ConceptSet::new().with_system("http://b"));

        assert_eq!(vs.referenced_systems(), vec!["http://a", "http://b"]);
    }

    #[test]
    fn test_has_compose() {
        let vs = ValueSet::new("http://example.org/vs");
        assert!(!vs.has_compose());

        let vs = vs.with_include(ConceptSet::new().with_system("http://a"));
        assert!(vs.has_compose());
    }

    #[test]
    fn test_find_concept() {
        let include = ConceptSet::new()
            .with_system("http://example.org/cs")
            .with_concept(ConceptReference::new("code1").with_display("Code One"));

        let found = include.find_concept("code1").unwrap();
        assert_eq!(found.display.as_deref(), Some("Code One"));
        assert!(include.find_concept("code2").is_none());
    }
}
