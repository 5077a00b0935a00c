//! Job posting data shapes shared by extractors, the retry loop and the
//! message protocol.

use serde::{Deserialize, Serialize};

/// Job metadata as delivered to the caller.
///
/// Every field is optional. `job_url` is attached once by the content
/// handler after extraction, never by an extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_position: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
}

impl JobData {
    /// Drop the URL, keeping only what an extractor could have produced.
    pub fn partial(&self) -> PartialJobData {
        PartialJobData {
            company_name: self.company_name.clone(),
            job_position: self.job_position.clone(),
        }
    }
}

/// What an extractor returns: `JobData` without the URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialJobData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_position: Option<String>,
}

impl PartialJobData {
    /// Build from raw values, normalizing blanks to absent.
    pub fn new(company_name: Option<&str>, job_position: Option<&str>) -> Self {
        Self {
            company_name: company_name.and_then(clean_text),
            job_position: job_position.and_then(clean_text),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.company_name.is_none() && self.job_position.is_none()
    }

    pub fn has_any_field(&self) -> bool {
        !self.is_empty()
    }

    pub fn has_all_fields(&self) -> bool {
        self.company_name.is_some() && self.job_position.is_some()
    }

    /// The single enrichment step: attach the page URL.
    pub fn with_url(self, url: impl Into<String>) -> JobData {
        JobData {
            company_name: self.company_name,
            job_position: self.job_position,
            job_url: Some(url.into()),
        }
    }
}

/// Trim text and collapse empty results to `None`.
pub fn clean_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
