//! Extractor strategies.
//!
//! An extractor reads the live document and returns best-effort
//! [`PartialJobData`]. Site extractors are tables of fallback lookups,
//! ordered most-current markup first; the [`TitleExtractor`] handles every
//! site without a table.

pub mod generic;
pub mod sites;

pub use generic::TitleExtractor;
pub use sites::{glassdoor, indeed, linkedin};

use tracing::debug;

use crate::dom::Document;
use crate::types::{clean_text, PartialJobData};

/// A stateless, read-only strategy for one kind of page.
pub trait Extractor: Send + Sync {
    /// Stable name, used for logging and identity.
    fn name(&self) -> &'static str;

    /// Resolve whatever fields the page currently exposes.
    fn extract(&self, doc: &dyn Document) -> PartialJobData;
}

/// One independent attempt at locating a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Rendered text of the first match
    Text(&'static str),

    /// Rendered text of the first match, cut at the first separator
    TextBefore(&'static str, &'static str),

    /// Attribute of the first match
    Attr(&'static str, &'static str),
}

impl Lookup {
    /// Run this lookup, yielding a non-empty trimmed string or nothing.
    pub fn run(&self, doc: &dyn Document) -> Option<String> {
        match *self {
            Lookup::Text(selector) => doc.query_text(selector).as_deref().and_then(clean_text),
            Lookup::TextBefore(selector, separator) => doc
                .query_text(selector)
                .as_deref()
                .and_then(|text| text.split(separator).next())
                .and_then(clean_text),
            Lookup::Attr(selector, attribute) => doc
                .query_attr(selector, attribute)
                .as_deref()
                .and_then(clean_text),
        }
    }

    fn selector(&self) -> &'static str {
        match *self {
            Lookup::Text(selector) | Lookup::TextBefore(selector, _) | Lookup::Attr(selector, _) => {
                selector
            }
        }
    }
}

/// First lookup that produces a value wins.
pub fn first_match(doc: &dyn Document, lookups: &[Lookup]) -> Option<String> {
    lookups.iter().find_map(|lookup| {
        let value = lookup.run(doc);
        if value.is_some() {
            debug!(selector = lookup.selector(), "Lookup matched");
        }
        value
    })
}

/// Extractor driven by per-field lookup tables.
#[derive(Debug, Clone, Copy)]
pub struct SiteExtractor {
    pub name: &'static str,
    pub company: &'static [Lookup],
    pub position: &'static [Lookup],
}

impl Extractor for SiteExtractor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, doc: &dyn Document) -> PartialJobData {
        debug!(extractor = self.name, "Running site extraction");

        // Fields resolve independently; a missing company never blocks the title
        let data = PartialJobData {
            company_name: first_match(doc, self.company),
            job_position: first_match(doc, self.position),
        };

        debug!(
            extractor = self.name,
            company = ?data.company_name,
            position = ?data.job_position,
            "Site extraction result"
        );
        data
    }
}
