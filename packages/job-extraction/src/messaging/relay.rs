//! Background relay.
//!
//! Forwards job data requests from the caller into the sender's tab and
//! hands the asynchronous answer back. If the tab has no content receiver
//! yet, the relay injects the content logic and forwards exactly once more.
//! Every failure is returned as an `error` payload.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::browser::{NavigationCompleted, ScriptInjector, TabMessenger};
use super::protocol::{JobDataResponse, Message, MessageSender, TabId};
use crate::dom::hostname_of;
use crate::error::{RelayError, RelayResult, SendError};
use crate::registry::StrategyRegistry;
use crate::types::JobData;

pub struct Relay {
    messenger: Arc<dyn TabMessenger>,
    injector: Arc<dyn ScriptInjector>,
    registry: Arc<StrategyRegistry>,
}

impl Relay {
    /// `registry` decides which navigations trigger proactive injection.
    pub fn new(
        messenger: Arc<dyn TabMessenger>,
        injector: Arc<dyn ScriptInjector>,
        registry: Arc<StrategyRegistry>,
    ) -> Self {
        Self {
            messenger,
            injector,
            registry,
        }
    }

    /// Handle a caller message. `None` means the action is not ours.
    pub async fn handle(&self, message: &Message, sender: &MessageSender) -> Option<JobDataResponse> {
        match message {
            Message::RequestJobDataFromTab => {
                let result = match sender.tab {
                    Some(tab) => self.request_job_data(tab).await,
                    None => {
                        warn!("Job data requested from outside a tab");
                        Err(RelayError::TabIdUndefined)
                    }
                };
                Some(result.into())
            }
            _ => None,
        }
    }

    /// Fetch job data from the content logic in `tab`.
    ///
    /// A missing receiver is recovered by one injection and one retried
    /// forward; nothing beyond that is attempted.
    pub async fn request_job_data(&self, tab: TabId) -> RelayResult<JobData> {
        let response = match self.forward(tab).await {
            Err(SendError::NoReceiver) => {
                info!(%tab, "No content receiver in tab, injecting and retrying once");
                self.injector.inject_content(tab).await.map_err(|e| {
                    warn!(%tab, error = %e, "Content injection failed");
                    RelayError::from(e)
                })?;

                self.forward(tab).await.map_err(|e| {
                    warn!(%tab, error = %e, "Retried forward failed");
                    RelayError::from(e)
                })?
            }
            Err(e) => {
                warn!(%tab, error = %e, "Forward to tab failed");
                return Err(e.into());
            }
            Ok(response) => response,
        };

        response.into_result()
    }

    /// Inject proactively when a tab lands on a known job site.
    pub async fn on_navigation_completed(&self, event: &NavigationCompleted) {
        let Some(hostname) = hostname_of(&event.url) else {
            return;
        };

        if !self.registry.is_known_host(&hostname) {
            return;
        }

        debug!(tab = %event.tab, %hostname, "Known job site loaded, injecting content");
        if let Err(e) = self.injector.inject_content(event.tab).await {
            warn!(tab = %event.tab, error = %e, "Proactive injection failed");
        }
    }

    /// Consume navigation events until the channel closes.
    pub async fn watch_navigation(&self, mut events: mpsc::UnboundedReceiver<NavigationCompleted>) {
        while let Some(event) = events.recv().await {
            self.on_navigation_completed(&event).await;
        }
        debug!("Navigation event stream closed");
    }

    async fn forward(&self, tab: TabId) -> Result<JobDataResponse, SendError> {
        self.messenger.send_to_tab(tab, &Message::GetJobData).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockTabs, MockTabsCall};
    use crate::types::PartialJobData;

    fn relay_with(tabs: &Arc<MockTabs>) -> Relay {
        Relay::new(
            tabs.clone(),
            tabs.clone(),
            Arc::new(StrategyRegistry::with_defaults()),
        )
    }

    fn acme() -> JobData {
        PartialJobData::new(Some("Acme"), Some("Engineer")).with_url("https://www.linkedin.com/jobs/view/1")
    }

    #[tokio::test]
    async fn test_forward_succeeds_without_injection() {
        let tabs = Arc::new(MockTabs::new().with_send_result(Ok(JobDataResponse::Data(acme()))));
        let relay = relay_with(&tabs);

        let response = relay
            .handle(&Message::RequestJobDataFromTab, &MessageSender::tab(TabId(3)))
            .await;

        assert_eq!(response, Some(JobDataResponse::Data(acme())));
        assert_eq!(
            tabs.calls(),
            vec![MockTabsCall::Send {
                tab: TabId(3),
                message: Message::GetJobData
            }]
        );
    }

    #[tokio::test]
    async fn test_missing_receiver_injects_and_retries_once() {
        let tabs = Arc::new(
            MockTabs::new()
                .with_send_result(Err(SendError::NoReceiver))
                .with_send_result(Ok(JobDataResponse::Data(acme()))),
        );
        let relay = relay_with(&tabs);

        let result = relay.request_job_data(TabId(7)).await;

        assert_eq!(result, Ok(acme()));
        assert_eq!(
            tabs.calls(),
            vec![
                MockTabsCall::Send { tab: TabId(7), message: Message::GetJobData },
                MockTabsCall::Inject { tab: TabId(7) },
                MockTabsCall::Send { tab: TabId(7), message: Message::GetJobData },
            ]
        );
    }

    #[tokio::test]
    async fn test_second_failure_surfaces_error_without_third_attempt() {
        // Empty script: every send reports no receiver
        let tabs = Arc::new(MockTabs::new());
        let relay = relay_with(&tabs);

        let response = relay
            .handle(&Message::RequestJobDataFromTab, &MessageSender::tab(TabId(7)))
            .await
            .unwrap();

        assert!(response.is_error());
        assert_eq!(tabs.inject_count(), 1);
        assert_eq!(tabs.send_count(), 2);
    }

    #[tokio::test]
    async fn test_undefined_tab_errors_immediately() {
        let tabs = Arc::new(MockTabs::new());
        let relay = relay_with(&tabs);

        let response = relay
            .handle(&Message::RequestJobDataFromTab, &MessageSender::detached())
            .await;

        assert_eq!(response, Some(JobDataResponse::error("Tab ID is undefined")));
        assert!(tabs.calls().is_empty());
    }

    #[tokio::test]
    async fn test_injection_failure_surfaces_error() {
        let tabs = Arc::new(MockTabs::new().with_inject_error("chrome:// pages cannot be scripted"));
        let relay = relay_with(&tabs);

        let result = relay.request_job_data(TabId(1)).await;

        assert_eq!(
            result,
            Err(RelayError::Injection("chrome:// pages cannot be scripted".into()))
        );
        assert_eq!(tabs.send_count(), 1);
    }

    #[tokio::test]
    async fn test_other_send_failure_not_retried() {
        let tabs = Arc::new(MockTabs::new().with_send_result(Err(SendError::Other("tab closed".into()))));
        let relay = relay_with(&tabs);

        let result = relay.request_job_data(TabId(1)).await;

        assert_eq!(result, Err(RelayError::Send("tab closed".into())));
        assert_eq!(tabs.inject_count(), 0);
    }

    #[tokio::test]
    async fn test_content_error_payload_passed_through() {
        let tabs = Arc::new(MockTabs::new().with_send_result(Ok(JobDataResponse::error("boom"))));
        let relay = relay_with(&tabs);

        let response = relay
            .handle(&Message::RequestJobDataFromTab, &MessageSender::tab(TabId(1)))
            .await;

        assert_eq!(response, Some(JobDataResponse::error("boom")));
    }

    #[tokio::test]
    async fn test_content_messages_not_handled() {
        let tabs = Arc::new(MockTabs::new());
        let relay = relay_with(&tabs);

        assert_eq!(relay.handle(&Message::GetJobData, &MessageSender::tab(TabId(1))).await, None);
    }

    #[tokio::test]
    async fn test_navigation_to_known_site_injects() {
        let tabs = Arc::new(MockTabs::new());
        let relay = relay_with(&tabs);

        relay
            .on_navigation_completed(&NavigationCompleted {
                tab: TabId(4),
                url: "https://www.glassdoor.com/job-listing/abc".into(),
            })
            .await;
        relay
            .on_navigation_completed(&NavigationCompleted {
                tab: TabId(5),
                url: "https://news.example.com/".into(),
            })
            .await;

        assert_eq!(tabs.calls(), vec![MockTabsCall::Inject { tab: TabId(4) }]);
    }

    #[tokio::test]
    async fn test_watch_navigation_drains_until_closed() {
        let tabs = Arc::new(MockTabs::new());
        let relay = relay_with(&tabs);
        let (tx, rx) = mpsc::unbounded_channel();

        tx.send(NavigationCompleted { tab: TabId(1), url: "https://uk.indeed.com/viewjob".into() })
            .unwrap();
        tx.send(NavigationCompleted { tab: TabId(2), url: "not a url".into() })
            .unwrap();
        drop(tx);

        relay.watch_navigation(rx).await;

        assert_eq!(tabs.inject_count(), 1);
    }
}
