//! Job posting extraction from dynamically rendered job sites.
//!
//! Pulls company name, job title and posting URL out of pages whose markup
//! differs per site and often arrives after load.
//!
//! # Flow
//!
//! ```text
//! caller ──requestJobDataFromTab──▶ Relay ──getJobData──▶ ContentScript
//!                                    │ (inject + retry once)     │
//!                                    ▼                           ▼
//!                              ScriptInjector      StrategyRegistry → Extractor
//!                                                  extract_with_retry (+ ChangeWatcher)
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use job_extraction::{ContentConfig, InMemoryBrowser, Message, MessageSender, Relay, StrategyRegistry};
//!
//! let registry = Arc::new(StrategyRegistry::with_defaults());
//! let browser = Arc::new(InMemoryBrowser::new(registry.clone(), ContentConfig::default()));
//! let relay = Relay::new(browser.clone(), browser.clone(), registry);
//!
//! let tab = browser.open_tab(url, html);
//! let response = relay.handle(&Message::RequestJobDataFromTab, &MessageSender::tab(tab)).await;
//! ```
//!
//! # Modules
//!
//! - [`dom`] - Document and mutation capability traits, `HtmlDocument`
//! - [`extractors`] - Site extractors and the generic title extractor
//! - [`registry`] - Hostname to extractor dispatch
//! - [`retry`] - Fixed-interval retry coordinator
//! - [`watcher`] - Bounded DOM change watcher
//! - [`messaging`] - Content handler, background relay, browser collaborators
//! - [`testing`] - Mock implementations for testing

pub mod config;
pub mod dom;
pub mod error;
pub mod extractors;
pub mod messaging;
pub mod registry;
pub mod retry;
pub mod testing;
pub mod types;
pub mod watcher;

// Re-export core types at crate root
pub use config::{ContentConfig, ExtractionConfig};
pub use dom::{Document, HtmlDocument, MutationBatch, MutationRecord, MutationSource, ObserveOptions};
pub use error::{ExtractionError, InjectError, RelayError, SendError};
pub use extractors::{Extractor, Lookup, SiteExtractor, TitleExtractor};
pub use messaging::{
    ContentScript, InMemoryBrowser, JobDataResponse, Message, MessageSender, NavigationCompleted,
    Relay, ScriptInjector, TabId, TabMessenger,
};
pub use registry::StrategyRegistry;
pub use retry::{extract_with_retry, Acceptance, RetryPolicy};
pub use types::{JobData, PartialJobData};
pub use watcher::{ChangeWatcher, WatchConfig, WatcherHandle};

// Re-export testing utilities
pub use testing::{MockDocument, MockMutationSource, MockTabs, ScriptedExtractor};
