//! Generic fallback extractor.
//!
//! Most job boards title their pages `"<position> <sep> <company>"`, often
//! followed by `" | <site name>"`. When the title carries no separator the
//! Open Graph metadata is used instead.

use tracing::debug;

use super::{first_match, Extractor, Lookup};
use crate::dom::Document;
use crate::types::{clean_text, PartialJobData};

/// Separators tried in order; the first one present wins.
pub const TITLE_SEPARATORS: &[&str] = &[" - ", " | ", " at ", " @ "];

/// Suffix separator between the company and a trailing site name.
const SITE_SUFFIX: &str = " | ";

const META_POSITION: &[Lookup] = &[
    Lookup::Attr(r#"meta[property="og:title"]"#, "content"),
    Lookup::Attr(r#"meta[name="title"]"#, "content"),
];

const META_COMPANY: &[Lookup] = &[Lookup::Attr(r#"meta[property="og:site_name"]"#, "content")];

/// Parses the document title, falling back to metadata.
#[derive(Debug, Clone, Copy)]
pub struct TitleExtractor {
    separators: &'static [&'static str],
}

impl Default for TitleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleExtractor {
    pub const fn new() -> Self {
        Self {
            separators: TITLE_SEPARATORS,
        }
    }

    /// Use a custom separator list.
    pub const fn with_separators(separators: &'static [&'static str]) -> Self {
        Self { separators }
    }

    /// Split a title into `(position, company)` on the first separator present.
    ///
    /// Returns `None` when no separator occurs in the title.
    pub fn split_title(&self, title: &str) -> Option<(Option<String>, Option<String>)> {
        let separator = self.separators.iter().find(|sep| title.contains(**sep))?;

        let mut parts = title.split(*separator);
        let position = parts.next().and_then(clean_text);
        let company = parts.next().and_then(|company| {
            let company = company.trim();
            // Drop a trailing " | Site Name"
            let company = company.split(SITE_SUFFIX).next().unwrap_or(company);
            clean_text(company)
        });

        Some((position, company))
    }
}

impl Extractor for TitleExtractor {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, doc: &dyn Document) -> PartialJobData {
        debug!("Running generic title extraction");

        let title = doc.title();

        let data = match self.split_title(&title) {
            Some((job_position, company_name)) => PartialJobData {
                company_name,
                job_position,
            },
            None => PartialJobData {
                company_name: first_match(doc, META_COMPANY),
                job_position: first_match(doc, META_POSITION).or_else(|| clean_text(&title)),
            },
        };

        debug!(
            company = ?data.company_name,
            position = ?data.job_position,
            "Generic extraction result"
        );
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDocument;
    use proptest::prelude::*;

    fn extract_title(title: &str) -> PartialJobData {
        let doc = MockDocument::new("https://careers.example.com/1").with_title(title);
        TitleExtractor::new().extract(&doc)
    }

    #[test]
    fn test_dash_separator_with_site_suffix() {
        let data = extract_title("Senior Engineer - Acme Corp | JobBoard");

        assert_eq!(data.job_position.as_deref(), Some("Senior Engineer"));
        assert_eq!(data.company_name.as_deref(), Some("Acme Corp"));
    }

    #[test]
    fn test_separator_priority_follows_list_order() {
        // " | " appears first in the text but " - " is earlier in the list
        let data = extract_title("Careers | Welder - Foundry Inc");

        assert_eq!(data.job_position.as_deref(), Some("Careers | Welder"));
        assert_eq!(data.company_name.as_deref(), Some("Foundry Inc"));
    }

    #[test]
    fn test_at_separator() {
        let data = extract_title("Barista at Central Perk");

        assert_eq!(data.job_position.as_deref(), Some("Barista"));
        assert_eq!(data.company_name.as_deref(), Some("Central Perk"));
    }

    #[test]
    fn test_company_is_second_segment_only() {
        let data = extract_title("Nurse - General Hospital - Night Shift");

        assert_eq!(data.job_position.as_deref(), Some("Nurse"));
        assert_eq!(data.company_name.as_deref(), Some("General Hospital"));
    }

    #[test]
    fn test_meta_fallback_without_separator() {
        let doc = MockDocument::new("https://careers.example.com/1")
            .with_title("Careers")
            .with_attr(r#"meta[property="og:title"]"#, "content", "Pastry Chef")
            .with_attr(r#"meta[property="og:site_name"]"#, "content", "Bakery Co");

        let data = TitleExtractor::new().extract(&doc);

        assert_eq!(data.job_position.as_deref(), Some("Pastry Chef"));
        assert_eq!(data.company_name.as_deref(), Some("Bakery Co"));
    }

    #[test]
    fn test_whole_title_when_nothing_else() {
        let data = extract_title("  Open Roles  ");

        assert_eq!(data.job_position.as_deref(), Some("Open Roles"));
        assert_eq!(data.company_name, None);
    }

    #[test]
    fn test_blank_meta_falls_through_to_title() {
        let doc = MockDocument::new("https://careers.example.com/1")
            .with_title("Open Roles")
            .with_attr(r#"meta[property="og:title"]"#, "content", "  ");

        let data = TitleExtractor::new().extract(&doc);

        assert_eq!(data.job_position.as_deref(), Some("Open Roles"));
    }

    #[test]
    fn test_empty_title_yields_nothing() {
        assert!(extract_title("").is_empty());
    }

    #[test]
    fn test_custom_separators() {
        let extractor = TitleExtractor::with_separators(&[" :: "]);
        assert_eq!(
            extractor.split_title("Pilot :: Pan Am"),
            Some((Some("Pilot".to_string()), Some("Pan Am".to_string())))
        );
        assert_eq!(extractor.split_title("Pilot - Pan Am"), None);
    }

    proptest! {
        #[test]
        fn prop_fields_never_empty(title in "[ a-zA-Z|@\\-]{0,40}") {
            let data = extract_title(&title);

            prop_assert!(data.company_name.as_deref().map_or(true, |s| !s.is_empty() && s == s.trim()));
            prop_assert!(data.job_position.as_deref().map_or(true, |s| !s.is_empty() && s == s.trim()));
        }
    }
}
