//! Browser collaborators the relay depends on, plus an in-process browser.
//!
//! The relay never talks to a concrete browser. It needs a tab-addressed
//! send with an observable "no receiver" failure, a script injection keyed
//! by tab, and a stream of navigation completions. [`InMemoryBrowser`]
//! provides all three over [`HtmlDocument`] tabs.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

use super::content::ContentScript;
use super::protocol::{JobDataResponse, Message, TabId};
use crate::config::ContentConfig;
use crate::dom::HtmlDocument;
use crate::error::{InjectError, SendError};
use crate::registry::StrategyRegistry;

/// Tab-addressed message send.
#[async_trait]
pub trait TabMessenger: Send + Sync {
    /// Deliver `message` to the content logic in `tab` and await its answer.
    ///
    /// Must fail with [`SendError::NoReceiver`] when nothing in the tab
    /// listens.
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<JobDataResponse, SendError>;
}

/// Content logic injection keyed by tab.
#[async_trait]
pub trait ScriptInjector: Send + Sync {
    async fn inject_content(&self, tab: TabId) -> Result<(), InjectError>;
}

/// A tab finished loading `url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationCompleted {
    pub tab: TabId,
    pub url: String,
}

struct Tab {
    document: Arc<HtmlDocument>,
    content: Option<Arc<ContentScript>>,
}

/// Tabs backed by live HTML documents, all in this process.
pub struct InMemoryBrowser {
    tabs: RwLock<HashMap<TabId, Tab>>,
    next_tab: AtomicU32,
    injections: AtomicUsize,
    registry: Arc<StrategyRegistry>,
    content_config: ContentConfig,
    navigation: Mutex<Vec<mpsc::UnboundedSender<NavigationCompleted>>>,
}

impl InMemoryBrowser {
    /// Injected content scripts use `registry` and `content_config`.
    pub fn new(registry: Arc<StrategyRegistry>, content_config: ContentConfig) -> Self {
        Self {
            tabs: RwLock::new(HashMap::new()),
            next_tab: AtomicU32::new(1),
            injections: AtomicUsize::new(0),
            registry,
            content_config,
            navigation: Mutex::new(Vec::new()),
        }
    }

    /// Receive navigation completions from now on.
    pub fn navigation_events(&self) -> mpsc::UnboundedReceiver<NavigationCompleted> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_navigation().push(tx);
        rx
    }

    /// Open a tab showing `html` at `url`.
    pub fn open_tab(&self, url: impl Into<String>, html: impl Into<String>) -> TabId {
        let url = url.into();
        let tab = TabId(self.next_tab.fetch_add(1, Ordering::SeqCst));

        self.write_tabs().insert(
            tab,
            Tab {
                document: Arc::new(HtmlDocument::new(url.clone(), html)),
                content: None,
            },
        );
        debug!(%tab, %url, "Opened tab");

        self.emit_navigation(NavigationCompleted { tab, url });
        tab
    }

    /// Load a new page in `tab`. Previously injected content logic is lost.
    pub fn navigate(&self, tab: TabId, url: impl Into<String>, html: impl Into<String>) -> bool {
        let url = url.into();
        {
            let mut tabs = self.write_tabs();
            let Some(entry) = tabs.get_mut(&tab) else {
                return false;
            };
            entry.document.navigate(url.clone(), html);
            entry.content = None;
        }

        self.emit_navigation(NavigationCompleted { tab, url });
        true
    }

    pub fn close_tab(&self, tab: TabId) -> bool {
        self.write_tabs().remove(&tab).is_some()
    }

    pub fn document(&self, tab: TabId) -> Option<Arc<HtmlDocument>> {
        self.read_tabs().get(&tab).map(|t| Arc::clone(&t.document))
    }

    pub fn is_injected(&self, tab: TabId) -> bool {
        self.read_tabs()
            .get(&tab)
            .is_some_and(|t| t.content.is_some())
    }

    /// Injection requests served, including no-op repeats.
    pub fn injection_count(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }

    fn emit_navigation(&self, event: NavigationCompleted) {
        self.lock_navigation()
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn read_tabs(&self) -> std::sync::RwLockReadGuard<'_, HashMap<TabId, Tab>> {
        self.tabs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_tabs(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<TabId, Tab>> {
        self.tabs.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_navigation(&self) -> std::sync::MutexGuard<'_, Vec<mpsc::UnboundedSender<NavigationCompleted>>> {
        self.navigation.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TabMessenger for InMemoryBrowser {
    async fn send_to_tab(&self, tab: TabId, message: &Message) -> Result<JobDataResponse, SendError> {
        // Clone the handler out so no lock is held across the await
        let content = {
            let tabs = self.read_tabs();
            let entry = tabs
                .get(&tab)
                .ok_or_else(|| SendError::Other(format!("No tab with id: {}", tab)))?;
            entry.content.clone().ok_or(SendError::NoReceiver)?
        };

        content.handle(message).await.ok_or_else(|| {
            SendError::Other("The message port closed before a response was received.".to_string())
        })
    }
}

#[async_trait]
impl ScriptInjector for InMemoryBrowser {
    async fn inject_content(&self, tab: TabId) -> Result<(), InjectError> {
        self.injections.fetch_add(1, Ordering::SeqCst);

        let mut tabs = self.write_tabs();
        let entry = tabs
            .get_mut(&tab)
            .ok_or_else(|| InjectError::new(format!("No tab with id: {}", tab)))?;

        // Content logic installs itself at most once per page
        if entry.content.is_some() {
            debug!(%tab, "Content script already injected");
            return Ok(());
        }

        let document = Arc::clone(&entry.document);
        entry.content = Some(Arc::new(ContentScript::new(
            document.clone(),
            document,
            Arc::clone(&self.registry),
            self.content_config.clone(),
        )));
        debug!(%tab, "Injected content script");
        Ok(())
    }
}
