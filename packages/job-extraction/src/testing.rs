//! Testing utilities including mock implementations.
//!
//! These are useful for exercising extractors, the retry loop, the change
//! watcher and the relay without a real browser.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::mpsc;

use crate::dom::{Document, MutationBatch, MutationSource, ObserveOptions};
use crate::error::{InjectError, SendError};
use crate::extractors::Extractor;
use crate::messaging::browser::{ScriptInjector, TabMessenger};
use crate::messaging::protocol::{JobDataResponse, Message, TabId};
use crate::types::PartialJobData;

/// A document answering from fixed selector tables.
///
/// Selectors are matched verbatim; anything not configured is a miss.
#[derive(Default)]
pub struct MockDocument {
    location: String,
    title: String,
    texts: HashMap<String, String>,
    attrs: HashMap<(String, String), String>,
    queries: AtomicUsize,
}

impl MockDocument {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_text(mut self, selector: impl Into<String>, text: impl Into<String>) -> Self {
        self.texts.insert(selector.into(), text.into());
        self
    }

    pub fn with_attr(
        mut self,
        selector: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attrs
            .insert((selector.into(), attribute.into()), value.into());
        self
    }

    /// Number of selector queries served.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl Document for MockDocument {
    fn query_text(&self, selector: &str) -> Option<String> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.texts.get(selector).cloned()
    }

    fn query_attr(&self, selector: &str, attribute: &str) -> Option<String> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.attrs
            .get(&(selector.to_string(), attribute.to_string()))
            .cloned()
    }

    fn title(&self) -> String {
        self.title.clone()
    }

    fn location(&self) -> String {
        self.location.clone()
    }
}

/// An extractor returning a scripted sequence of results.
///
/// Once the script is drained the last entry repeats; an empty script
/// always returns empty data.
pub struct ScriptedExtractor {
    name: &'static str,
    script: Mutex<VecDeque<PartialJobData>>,
    last: Mutex<PartialJobData>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            script: Mutex::new(VecDeque::new()),
            last: Mutex::new(PartialJobData::default()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Append a result to the script.
    pub fn then(self, data: PartialJobData) -> Self {
        self.script.lock().unwrap().push_back(data);
        self
    }

    /// Number of times `extract` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Extractor for ScriptedExtractor {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract(&self, _doc: &dyn Document) -> PartialJobData {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut last = self.last.lock().unwrap();
        if let Some(next) = self.script.lock().unwrap().pop_front() {
            *last = next;
        }
        last.clone()
    }
}

/// A mutation source fed by hand.
pub struct MockMutationSource {
    observable: bool,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<MutationBatch>>>,
}

impl Default for MockMutationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMutationSource {
    pub fn new() -> Self {
        Self {
            observable: true,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// A source with no body to observe.
    pub fn without_body() -> Self {
        Self {
            observable: false,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Deliver a batch to every live subscriber.
    pub fn emit(&self, batch: MutationBatch) {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| tx.send(batch.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.subscribers.lock().unwrap();
        subscribers.retain(|tx| !tx.is_closed());
        subscribers.len()
    }
}

impl MutationSource for MockMutationSource {
    fn subscribe(&self, _options: &ObserveOptions) -> Option<mpsc::UnboundedReceiver<MutationBatch>> {
        if !self.observable {
            return None;
        }
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.lock().unwrap().push(tx);
        Some(rx)
    }
}

/// Record of a call made to [`MockTabs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockTabsCall {
    Send { tab: TabId, message: Message },
    Inject { tab: TabId },
}

/// Scripted tab messenger and injector.
///
/// Sends pop results from a queue; an empty queue answers `NoReceiver`.
#[derive(Default)]
pub struct MockTabs {
    send_results: Arc<RwLock<VecDeque<Result<JobDataResponse, SendError>>>>,
    inject_error: Arc<RwLock<Option<InjectError>>>,
    calls: Arc<RwLock<Vec<MockTabsCall>>>,
}

impl MockTabs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the result of the next send.
    pub fn with_send_result(self, result: Result<JobDataResponse, SendError>) -> Self {
        self.send_results.write().unwrap().push_back(result);
        self
    }

    /// Make every injection fail.
    pub fn with_inject_error(self, reason: impl Into<String>) -> Self {
        *self.inject_error.write().unwrap() = Some(InjectError::new(reason));
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockTabsCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockTabsCall::Send { .. }))
            .count()
    }

    pub fn inject_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, MockTabsCall::Inject { .. }))
            .count()
    }
}

#[async_trait]
impl TabMessenger for MockTabs {
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<JobDataResponse, SendError> {
        self.calls.write().unwrap().push(MockTabsCall::Send {
            tab,
            message: message.clone(),
        });

        self.send_results
            .write()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(SendError::NoReceiver))
    }
}

#[async_trait]
impl ScriptInjector for MockTabs {
    async fn inject_content(&self, tab: TabId) -> Result<(), InjectError> {
        self.calls.write().unwrap().push(MockTabsCall::Inject { tab });

        match self.inject_error.read().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
