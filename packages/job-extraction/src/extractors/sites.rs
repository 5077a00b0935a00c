//! Built-in site extractors.
//!
//! Lookups are ordered most-current markup first, older layouts after.

use super::{Lookup, SiteExtractor};

/// LinkedIn job view (guest and signed-in layouts).
pub static LINKEDIN: SiteExtractor = SiteExtractor {
    name: "linkedin",
    company: &[
        Lookup::Text("a.topcard__org-name-link"),
        Lookup::Text(".job-details-jobs-unified-top-card__company-name a"),
        Lookup::TextBefore(
            ".job-details-jobs-unified-top-card__primary-description-container > div:first-child > span:first-child",
            "·",
        ),
    ],
    position: &[
        Lookup::Text("h1.topcard__title"),
        Lookup::Text(".job-details-jobs-unified-top-card__job-title"),
    ],
};

/// Indeed job view.
pub static INDEED: SiteExtractor = SiteExtractor {
    name: "indeed",
    company: &[
        Lookup::Text(
            r#"[data-testid="jobsearch-CompanyInfoContainer"] [data-testid="inlineHeader-companyName"] a"#,
        ),
        Lookup::Text(r#"div[data-company-name="true"]"#),
        Lookup::Text(".jobsearch-CompanyInfoContainer .jobsearch-InlineCompanyRating div"),
    ],
    position: &[
        Lookup::Text("h1.jobsearch-JobInfoHeader-title"),
        Lookup::Text(".jobsearch-JobInfoHeader-title > span"),
        Lookup::Text(r#"[data-testid="jobTitle"]"#),
    ],
};

/// Glassdoor job view.
pub static GLASSDOOR: SiteExtractor = SiteExtractor {
    name: "glassdoor",
    company: &[
        Lookup::Text(r#"[data-test="employer-name"]"#),
        Lookup::Text("#EmployerName"),
        Lookup::Text(".employerName"),
    ],
    position: &[
        Lookup::Text(r#"[data-test="job-title"]"#),
        Lookup::Text("#JobTitle"),
        Lookup::Text(".job-title"),
    ],
};

pub fn linkedin() -> &'static SiteExtractor {
    &LINKEDIN
}

pub fn indeed() -> &'static SiteExtractor {
    &INDEED
}

pub fn glassdoor() -> &'static SiteExtractor {
    &GLASSDOOR
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::HtmlDocument;
    use crate::extractors::Extractor;

    #[test]
    fn test_linkedin_guest_layout() {
        let doc = HtmlDocument::new(
            "https://www.linkedin.com/jobs/view/1",
            r#"<body>
                 <h1 class="topcard__title">Platform Engineer</h1>
                 <a class="topcard__org-name-link" href="/company/umbrella"> Umbrella Corp </a>
               </body>"#,
        );

        let data = LINKEDIN.extract(&doc);

        assert_eq!(data.company_name.as_deref(), Some("Umbrella Corp"));
        assert_eq!(data.job_position.as_deref(), Some("Platform Engineer"));
    }

    #[test]
    fn test_linkedin_primary_description_fallback() {
        let doc = HtmlDocument::new(
            "https://www.linkedin.com/jobs/view/2",
            r#"<body>
                 <div class="job-details-jobs-unified-top-card__job-title">Data Analyst</div>
                 <div class="job-details-jobs-unified-top-card__primary-description-container">
                   <div><span>Cyberdyne · Sunnyvale, CA · 2 weeks ago</span></div>
                 </div>
               </body>"#,
        );

        let data = LINKEDIN.extract(&doc);

        assert_eq!(data.company_name.as_deref(), Some("Cyberdyne"));
        assert_eq!(data.job_position.as_deref(), Some("Data Analyst"));
    }

    #[test]
    fn test_indeed_layouts() {
        let doc = HtmlDocument::new(
            "https://www.indeed.com/viewjob?jk=abc",
            r#"<body>
                 <div class="jobsearch-JobInfoHeader-title"><span>Forklift Operator</span></div>
                 <div data-company-name="true">Wayne Logistics</div>
               </body>"#,
        );

        let data = INDEED.extract(&doc);

        assert_eq!(data.company_name.as_deref(), Some("Wayne Logistics"));
        assert_eq!(data.job_position.as_deref(), Some("Forklift Operator"));
    }

    #[test]
    fn test_glassdoor_partial_page() {
        let doc = HtmlDocument::new(
            "https://www.glassdoor.com/job-listing/x",
            r#"<body><div data-test="employer-name">Stark Industries</div></body>"#,
        );

        let data = GLASSDOOR.extract(&doc);

        assert_eq!(data.company_name.as_deref(), Some("Stark Industries"));
        assert_eq!(data.job_position, None);
    }

    #[test]
    fn test_empty_markup_yields_absent_fields() {
        let doc = HtmlDocument::new("https://www.indeed.com/viewjob", "<body></body>");
        assert!(INDEED.extract(&doc).is_empty());
    }
}
