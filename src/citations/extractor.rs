use regex::{CaptureMatches, Regex};
use serde::Serialize;

use crate::error::InvalidReference;

/// A citation-shaped substring: volume, reporter token(s), page.
///
/// Reporters may span several abbreviation tokens ("S. Ct.", "Cal. App. 4th")
/// or carry embedded series digits ("F.3d", "So.2d"). Ordinal tokens ("2d",
/// "4th") only continue a reporter, never start one, which keeps the page
/// number from being swallowed.
const CITATION_PATTERN: &str = r"\b([1-9]\d{0,3})\s+([A-Z][A-Za-z0-9.']*(?:\s(?:[A-Z][A-Za-z0-9.']*|\d{1,2}[a-z]{1,3}\.?)){0,3})\s+([1-9]\d{0,4})\b";

/// Byte offsets of an extracted citation within its source text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A parsed mention of a legal citation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitationReference {
    pub volume: u32,
    pub reporter: String,
    pub page: u32,
    /// The substring the reference was extracted from.
    pub raw_text: String,
    /// Offsets in the source text; absent for hand-built references.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<Span>,
}

impl CitationReference {
    /// Build a reference from structured parts, rejecting zero volume or
    /// page and empty reporters before any backend call.
    pub fn new(volume: u32, reporter: &str, page: u32) -> Result<Self, InvalidReference> {
        if volume == 0 {
            return Err(InvalidReference::new("volume must be positive"));
        }
        if page == 0 {
            return Err(InvalidReference::new("page must be positive"));
        }
        let reporter = reporter.trim();
        if reporter.is_empty() {
            return Err(InvalidReference::new("reporter must be non-empty"));
        }

        Ok(Self {
            volume,
            reporter: reporter.to_string(),
            page,
            raw_text: format!("{} {} {}", volume, reporter, page),
            span: None,
        })
    }
}

/// Scanner extracting citation references from free text
pub struct CitationExtractor {
    pattern: Regex,
}

impl CitationExtractor {
    /// Compile the citation pattern. Called once at startup.
    pub fn new() -> Self {
        Self {
            // The pattern is a literal in this file; compilation cannot fail.
            pattern: Regex::new(CITATION_PATTERN).expect("citation pattern compiles"),
        }
    }

    /// Lazily iterate citation references in `text`, leftmost first and
    /// non-overlapping. Calling again on the same text restarts the scan and
    /// yields the same sequence. Text with no citations yields nothing.
    pub fn matches<'e, 't>(&'e self, text: &'t str) -> CitationMatches<'e, 't> {
        CitationMatches {
            inner: self.pattern.captures_iter(text),
        }
    }

    /// Collect every citation reference in `text`.
    pub fn extract(&self, text: &str) -> Vec<CitationReference> {
        self.matches(text).collect()
    }
}

impl Default for CitationExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy iterator over citation references in a piece of text
pub struct CitationMatches<'e, 't> {
    inner: CaptureMatches<'e, 't>,
}

impl Iterator for CitationMatches<'_, '_> {
    type Item = CitationReference;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let caps = self.inner.next()?;
            let whole = caps.get(0).expect("match has a full capture");

            // Group digit counts keep these within u32 range, but parse
            // defensively and skip rather than panic on a pattern change.
            let volume: u32 = match caps[1].parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            let page: u32 = match caps[3].parse() {
                Ok(p) => p,
                Err(_) => continue,
            };

            return Some(CitationReference {
                volume,
                reporter: caps[2].to_string(),
                page,
                raw_text: whole.as_str().to_string(),
                span: Some(Span {
                    start: whole.start(),
                    end: whole.end(),
                }),
            });
        }
    }
}
