//! Hostname → extractor dispatch.
//!
//! An ordered list of `(pattern, extractor)` pairs. The first pattern whose
//! case-insensitive match succeeds against the hostname wins; otherwise the
//! fallback extractor is used.

use regex::{Regex, RegexBuilder};
use std::sync::Arc;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::extractors::{glassdoor, indeed, linkedin, Extractor, TitleExtractor};

/// Built-in site patterns, in priority order.
pub const DEFAULT_SITE_PATTERNS: &[&str] = &[r"linkedin\.com", r"indeed\.com", r"glassdoor\.com"];

struct Entry {
    pattern: Regex,
    extractor: Arc<dyn Extractor>,
}

/// Ordered pattern table with a fallback strategy.
pub struct StrategyRegistry {
    entries: Vec<Entry>,
    fallback: Arc<dyn Extractor>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl StrategyRegistry {
    /// Empty table; every hostname resolves to `fallback`.
    pub fn new(fallback: Arc<dyn Extractor>) -> Self {
        Self {
            entries: Vec::new(),
            fallback,
        }
    }

    /// LinkedIn, Indeed and Glassdoor, with the title extractor as fallback.
    pub fn with_defaults() -> Self {
        let extractors: [Arc<dyn Extractor>; 3] = [
            Arc::new(*linkedin()),
            Arc::new(*indeed()),
            Arc::new(*glassdoor()),
        ];

        let entries = DEFAULT_SITE_PATTERNS
            .iter()
            .zip(extractors)
            .map(|(pattern, extractor)| Entry {
                pattern: compile(pattern).expect("built-in site patterns are valid"),
                extractor,
            })
            .collect();

        Self {
            entries,
            fallback: Arc::new(TitleExtractor::new()),
        }
    }

    /// Append a pattern. Earlier registrations take priority.
    pub fn register(mut self, pattern: &str, extractor: Arc<dyn Extractor>) -> Result<Self> {
        self.entries.push(Entry {
            pattern: compile(pattern)?,
            extractor,
        });
        Ok(self)
    }

    /// Pick the extractor for a hostname.
    pub fn resolve(&self, hostname: &str) -> Arc<dyn Extractor> {
        match self.entries.iter().find(|e| e.pattern.is_match(hostname)) {
            Some(entry) => {
                debug!(
                    hostname,
                    pattern = entry.pattern.as_str(),
                    extractor = entry.extractor.name(),
                    "Resolved site extractor"
                );
                Arc::clone(&entry.extractor)
            }
            None => {
                debug!(
                    hostname,
                    extractor = self.fallback.name(),
                    "No site pattern matched, using fallback"
                );
                Arc::clone(&self.fallback)
            }
        }
    }

    /// Whether any registered site pattern matches.
    pub fn is_known_host(&self, hostname: &str) -> bool {
        self.entries.iter().any(|e| e.pattern.is_match(hostname))
    }

    /// Registered patterns with their extractor names, in priority order.
    pub fn patterns(&self) -> Vec<(&str, &'static str)> {
        self.entries
            .iter()
            .map(|e| (e.pattern.as_str(), e.extractor.name()))
            .collect()
    }

    pub fn fallback(&self) -> &Arc<dyn Extractor> {
        &self.fallback
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map_err(|source| ExtractionError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })
}
