//! Fixed-interval retry around an extractor.
//!
//! Job pages hydrate their markup some time after load, so a first attempt
//! often finds nothing. The coordinator re-runs the extractor on a fixed
//! delay until the result is acceptable or the retry budget is spent.
//! It never fails: exhausting retries resolves with whatever was found.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::dom::Document;
use crate::extractors::Extractor;
use crate::types::PartialJobData;

/// When an attempt's result is good enough to stop retrying.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Acceptance {
    /// Either company name or job position is present
    #[default]
    AnyField,

    /// Both company name and job position are present
    AllFields,
}

impl Acceptance {
    pub fn accepts(&self, data: &PartialJobData) -> bool {
        match self {
            Acceptance::AnyField => data.has_any_field(),
            Acceptance::AllFields => data.has_all_fields(),
        }
    }
}

/// Retry budget and spacing for one extraction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,

    /// Fixed delay between attempts
    #[serde(with = "duration_millis")]
    pub delay: Duration,

    pub acceptance: Acceptance,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
            acceptance: Acceptance::AnyField,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self {
            max_retries,
            delay,
            ..Default::default()
        }
    }

    pub fn with_acceptance(mut self, acceptance: Acceptance) -> Self {
        self.acceptance = acceptance;
        self
    }
}

/// State of one extraction request; never shared.
struct RetrySession<'a> {
    policy: &'a RetryPolicy,
    attempts: u32,
}

impl RetrySession<'_> {
    fn exhausted(&self) -> bool {
        self.attempts >= self.policy.max_retries
    }
}

/// Run `extractor` until accepted or out of retries.
///
/// Attempts are strictly sequential. An accepted first attempt costs no
/// delay; a never-accepted run costs exactly `max_retries` delays.
pub async fn extract_with_retry(
    extractor: &dyn Extractor,
    doc: &dyn Document,
    policy: &RetryPolicy,
) -> PartialJobData {
    let mut session = RetrySession { policy, attempts: 0 };

    loop {
        let data = extractor.extract(doc);

        if policy.acceptance.accepts(&data) {
            debug!(
                extractor = extractor.name(),
                attempts = session.attempts,
                "Extraction accepted"
            );
            return data;
        }

        if session.exhausted() {
            info!(
                extractor = extractor.name(),
                max_retries = policy.max_retries,
                "Max retries reached, returning available data"
            );
            return data;
        }

        session.attempts += 1;
        debug!(
            extractor = extractor.name(),
            attempt = session.attempts,
            "Retry attempt for data extraction"
        );
        tokio::time::sleep(policy.delay).await;
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
