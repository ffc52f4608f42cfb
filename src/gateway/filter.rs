//! Fabricated-citation detection for model replies
//!
//! The gateway asks a [`CitationFilter`] whether a reply looks like it cites
//! sources. Flagged replies get a disclaimer prepended; nothing is rejected.

use crate::error::{FeedloopError, Result};
use regex::Regex;

/// Markers the default filter looks for, matched literally
pub const DEFAULT_CITATION_MARKERS: &[&str] = &["DOI", "doi.org", "et al.", "10."];

/// Predicate deciding whether a reply needs the citation disclaimer
pub trait CitationFilter: Send + Sync {
    /// Returns true when the reply should be prefixed with the disclaimer
    fn flags(&self, reply: &str) -> bool;
}

/// Literal, case-sensitive substring check against a fixed marker list
///
/// Crude by nature: "10." also matches version numbers and decimals.
///
/// # Examples
///
/// ```
/// use feedloop::gateway::{CitationFilter, SubstringCitationFilter};
///
/// let filter = SubstringCitationFilter::default();
/// assert!(filter.flags("As shown by Smith et al. (2020)"));
/// assert!(!filter.flags("Interview five potential users first."));
/// ```
#[derive(Debug, Clone)]
pub struct SubstringCitationFilter {
    markers: Vec<String>,
}

impl SubstringCitationFilter {
    /// Creates a filter with a custom marker list
    ///
    /// Empty markers are discarded, since they would match every reply.
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            markers: markers
                .into_iter()
                .map(Into::into)
                .filter(|m: &String| !m.is_empty())
                .collect(),
        }
    }

    /// Markers this filter checks
    pub fn markers(&self) -> &[String] {
        &self.markers
    }
}

impl Default for SubstringCitationFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CITATION_MARKERS.iter().copied())
    }
}

impl CitationFilter for SubstringCitationFilter {
    fn flags(&self, reply: &str) -> bool {
        self.markers.iter().any(|marker| reply.contains(marker.as_str()))
    }
}

/// Stricter check that only flags DOI-shaped identifiers and DOI links
///
/// Ignores plain decimals such as "10.5" that the substring filter catches.
#[derive(Debug, Clone)]
pub struct DoiPatternFilter {
    pattern: Regex,
}

impl DoiPatternFilter {
    /// Creates the filter
    ///
    /// # Errors
    ///
    /// Returns error if the DOI pattern fails to compile
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(r"(?i)\b(?:doi:\s*|doi\.org/)?10\.\d{4,9}/\S+")
            .map_err(|e| FeedloopError::Config(format!("Invalid DOI pattern: {}", e)))?;
        Ok(Self { pattern })
    }
}

impl CitationFilter for DoiPatternFilter {
    fn flags(&self, reply: &str) -> bool {
        self.pattern.is_match(reply)
    }
}
