use serde::{Deserialize, Serialize};

/// Publication status of a code system or value set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Draft,
    Active,
    Retired,
    #[default]
    Unknown,
}

impl PublicationStatus {
    /// Parse a publication status from its FHIR code.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PublicationStatus::Draft),
            "active" => Some(PublicationStatus::Active),
            "retired" => Some(PublicationStatus::Retired),
            "unknown" => Some(PublicationStatus::Unknown),
            _ => None,
        }
    }
}

/// How much of a code system's concept content is carried in the resource.
///
/// `Complete` means the enumerated concepts are authoritative: a code that is
/// absent from them is not a member. Every other mode carries a partial or
/// empty enumeration, so absence proves nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentMode {
    Complete,
    Fragment,
    Example,
    #[default]
    NotPresent,
}

impl ContentMode {
    /// Parse a content mode from its FHIR code.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s {
            "complete" => Some(ContentMode::Complete),
            "fragment" => Some(ContentMode::Fragment),
            "example" => Some(ContentMode::Example),
            "not-present" => Some(ContentMode::NotPresent),
            _ => None,
        }
    }

    /// Whether absence from the enumerated concepts proves non-membership.
    pub fn is_complete(&self) -> bool {
        matches!(self, ContentMode::Complete)
    }
}

/// A single concept in a code system, with an optional child hierarchy.
///
/// Identity is the `code` alone; `display` is advisory and never part of
/// equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub display: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
}

impl Concept {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display: None,
            concepts: Vec::new(),
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    pub fn with_child(mut self, child: Concept) -> Self {
        self.concepts.push(child);
        self
    }

    /// Depth-first search of this concept and its children for `code`.
    pub fn find(&self, code: &str) -> Option<&Concept> {
        if self.code == code {
            return Some(self);
        }
        self.concepts.iter().find_map(|child| child.find(code))
    }
}

impl PartialEq for Concept {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.concepts == other.concepts
    }
}

impl Eq for Concept {}

/// A catalog of concepts identified by a canonical URL, optionally versioned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSystem {
    pub url: String,
    pub version: Option<String>,
    pub status: PublicationStatus,
    pub content: ContentMode,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub concepts: Vec<Concept>,
}

impl CodeSystem {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: None,
            status: PublicationStatus::Unknown,
            content: ContentMode::NotPresent,
            concepts: Vec::new(),
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

    pub fn with_content(mut self, content: ContentMode) -> Self {
        self.content = content;
        self
    }

    pub fn with_concept(mut self, concept: Concept) -> Self {
        self.concepts.push(concept);
        self
    }

    /// Search the concept hierarchy for `code`, following explicit child
    /// edges only.
    pub fn find_concept(&self, code: &str) -> Option<&Concept> {
        self.concepts.iter().find_map(|concept| concept.find(code))
    }

    /// All codes reachable in the concept hierarchy, in document order.
    pub fn all_codes(&self) -> Vec<&str> {
        fn walk<'a>(concepts: &'a [Concept], out: &mut Vec<&'a str>) {
            for concept in concepts {
                out.push(&concept.code);
                walk(&concept.concepts, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.concepts, &mut out);
        out
    }
}

impl std::fmt::Display for CodeSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CodeSystem({})", self.url)?;
        if let Some(version) = &self.version {
            write!(f, " [{version}]")?;
        }
        Ok(())
    }
}
