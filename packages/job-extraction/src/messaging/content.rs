//! Content-side message handler.
//!
//! Lives inside a page. Answers `getJobData` by resolving the page's
//! extractor, running it through the retry coordinator and attaching the
//! page URL.

use std::sync::Arc;
use tracing::{debug, info};

use super::protocol::{JobDataResponse, Message};
use crate::config::ContentConfig;
use crate::dom::{Document, MutationSource};
use crate::registry::StrategyRegistry;
use crate::retry::extract_with_retry;
use crate::types::JobData;
use crate::watcher::ChangeWatcher;

/// Extraction logic bound to one page.
pub struct ContentScript {
    document: Arc<dyn Document>,
    mutations: Arc<dyn MutationSource>,
    registry: Arc<StrategyRegistry>,
    config: ContentConfig,
}

impl ContentScript {
    pub fn new(
        document: Arc<dyn Document>,
        mutations: Arc<dyn MutationSource>,
        registry: Arc<StrategyRegistry>,
        config: ContentConfig,
    ) -> Self {
        info!(url = %document.location(), "Job Journal content script initialized");
        Self {
            document,
            mutations,
            registry,
            config,
        }
    }

    /// Handle a message. `None` means the action is not ours to answer.
    pub async fn handle(&self, message: &Message) -> Option<JobDataResponse> {
        match message {
            Message::GetJobData => Some(JobDataResponse::Data(self.get_job_data().await)),
            _ => None,
        }
    }

    /// Extract job data from the current page.
    ///
    /// `job_url` is read when extraction resolves, not when the request
    /// arrived. A navigation in between is not detected.
    pub async fn get_job_data(&self) -> JobData {
        let hostname = self.document.hostname();
        let extractor = self.registry.resolve(&hostname);

        // Observation only: it never re-triggers or gates extraction
        let watcher = self.config.watch.as_ref().map(|watch| {
            ChangeWatcher::observe(self.mutations.as_ref(), watch, || {
                debug!("Significant DOM changes detected");
            })
        });

        let data = extract_with_retry(extractor.as_ref(), self.document.as_ref(), &self.config.retry).await;
        let job = data.with_url(self.document.location());

        info!(
            extractor = extractor.name(),
            company = ?job.company_name,
            position = ?job.job_position,
            url = ?job.job_url,
            "Final extracted data"
        );

        if let Some(watcher) = watcher {
            watcher.disconnect();
        }

        job
    }
}
