//! Canonical reference parsing for version-qualified terminology lookups.
//!
//! A reference to a code system or value set is either a plain canonical URL
//! (`http://snomed.info/sct`) or a version-qualified form
//! (`http://snomed.info/sct|20210331`). The two are distinct lookup keys:
//! `url|v1` never resolves to a catalogued entry whose version is `v2` or
//! absent.

use std::fmt;

use url::Url;

use crate::error::{TerminologyError, TerminologyResult};

/// A parsed `url` or `url|version` reference.
///
/// The original reference string is the repository lookup key; this type only
/// validates the shape and splits the version qualifier off for matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalReference {
    url: String,
    version: Option<String>,
}

impl CanonicalReference {
    /// Parse a reference of the form `url` or `url|version`.
    ///
    /// The URL part must be an absolute URI. An empty URL, an empty version
    /// after the `|`, or a second `|` is rejected as malformed.
    pub fn parse(reference: &str) -> TerminologyResult<Self> {
        let (url, version) = match reference.split_once('|') {
            None => (reference, None),
            Some((url, version)) => {
                if version.is_empty() || version.contains('|') {
                    return Err(TerminologyError::malformed_reference(reference));
                }
                (url, Some(version.to_string()))
            }
        };

        if url.is_empty() || Url::parse(url).is_err() {
            return Err(TerminologyError::malformed_reference(reference));
        }

        Ok(Self {
            url: url.to_string(),
            version,
        })
    }

    /// Build a version-qualified reference from parts.
    pub fn versioned(url: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            version: Some(version.into()),
        }
    }

    /// The canonical URL without any version qualifier.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The version qualifier, if one was present.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn has_version(&self) -> bool {
        self.version.is_some()
    }

    /// The literal lookup key for this reference (`url` or `url|version`).
    pub fn key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CanonicalReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{}|{}", self.url, version),
            None => write!(f, "{}", self.url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_url() {
        let reference = CanonicalReference::parse("http://snomed.info/sct").unwrap();
        assert_eq!(reference.url(), "http://snomed.info/sct");
        assert_eq!(reference.version(), None);
        assert!(!reference.has_version());
    }

    #[test]
    fn test_parse_versioned_url() {
        let reference = CanonicalReference::parse(
            "http://snomed.info/sct|http://snomed.info/sct/20611000087101/version/20210331",
        )
        .unwrap();
        assert_eq!(reference.url(), "http://snomed.info/sct");
        assert_eq!(
            reference.version(),
            Some("http://snomed.info/sct/20611000087101/version/20210331")
        );
    }

    #[test]
    fn test_parse_urn() {
        let reference = CanonicalReference::parse("urn:oid:2.16.840.1.113883.6.8").unwrap();
        assert_eq!(reference.url(), "urn:oid:2.16.840.1.113883.6.8");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        assert!(CanonicalReference::parse("").is_err());
        assert!(CanonicalReference::parse("|1.0").is_err());
        assert!(CanonicalReference::parse("http://vs|").is_err());
        assert!(CanonicalReference::parse("http://vs|1.0|2.0").is_err());
        assert!(CanonicalReference::parse("not a url").is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let reference = CanonicalReference::parse("http://example.org/vs|0.1.17").unwrap();
        assert_eq!(reference.to_string(), "http://example.org/vs|0.1.17");
        assert_eq!(reference.key(), "http://example.org/vs|0.1.17");

        let reference = CanonicalReference::parse("http://example.org/vs").unwrap();
        assert_eq!(reference.to_string(), "http://example.org/vs");
    }

    #[test]
    fn test_versioned_constructor() {
        let reference = CanonicalReference::versioned("http://example.org/cs", "2.1");
        assert_eq!(reference.key(), "http://example.org/cs|2.1");
    }
}
