//! Live HTML document backed by the `scraper` crate.
//!
//! Holds the current markup and location of a page. Content can be swapped
//! after creation to model client-side rendering, and every swap is
//! published to mutation subscribers the way a browser observer would
//! report it.

use scraper::{ElementRef, Html, Selector};
use std::sync::{Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tracing::debug;

use super::{Document, MutationBatch, MutationRecord, MutationSource, ObserveOptions};

struct PageState {
    url: String,
    html: String,
}

struct Subscriber {
    options: ObserveOptions,
    tx: mpsc::UnboundedSender<MutationBatch>,
}

/// A page whose markup can change while extraction runs.
pub struct HtmlDocument {
    state: RwLock<PageState>,
    subscribers: Mutex<Vec<Subscriber>>,
}

impl HtmlDocument {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            state: RwLock::new(PageState {
                url: url.into(),
                html: html.into(),
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Current markup.
    pub fn html(&self) -> String {
        self.read_state().html.clone()
    }

    /// Replace the page markup, reporting body children that came and went.
    pub fn replace_html(&self, html: impl Into<String>) {
        let html = html.into();
        let removed = body_children(&self.read_state().html);
        let added = body_children(&html);

        self.write_state().html = html;

        self.publish(vec![MutationRecord::child_list("body", added, removed)]);
    }

    /// Report attribute churn on `target` without touching the markup.
    pub fn touch_attribute(&self, target: impl Into<String>, attribute: impl Into<String>) {
        self.publish(vec![MutationRecord::attribute(target, attribute)]);
    }

    /// Load a new page. Observers of the previous page are disconnected.
    pub fn navigate(&self, url: impl Into<String>, html: impl Into<String>) {
        {
            let mut state = self.write_state();
            state.url = url.into();
            state.html = html.into();
        }
        self.lock_subscribers().clear();
    }

    /// Number of live mutation subscriptions.
    pub fn subscriber_count(&self) -> usize {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|s| !s.tx.is_closed());
        subscribers.len()
    }

    fn publish(&self, batch: MutationBatch) {
        let mut subscribers = self.lock_subscribers();
        subscribers.retain(|s| !s.tx.is_closed());

        for subscriber in subscribers.iter() {
            let filtered: MutationBatch = batch
                .iter()
                .filter(|record| subscriber.options.accepts(record))
                .cloned()
                .collect();

            if !filtered.is_empty() {
                // A send error only means the receiver went away mid-loop
                let _ = subscriber.tx.send(filtered);
            }
        }
    }

    fn with_first<T>(&self, selector: &str, f: impl FnOnce(ElementRef<'_>) -> Option<T>) -> Option<T> {
        let selector = match Selector::parse(selector) {
            Ok(selector) => selector,
            Err(e) => {
                debug!(selector, error = %e, "Ignoring invalid selector");
                return None;
            }
        };

        let document = Html::parse_document(&self.read_state().html);
        let element = document.select(&selector).next()?;
        f(element)
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, PageState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, PageState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_subscribers(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber>> {
        self.subscribers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Document for HtmlDocument {
    fn query_text(&self, selector: &str) -> Option<String> {
        self.with_first(selector, |element| Some(rendered_text(element)))
    }

    fn query_attr(&self, selector: &str, attribute: &str) -> Option<String> {
        self.with_first(selector, |element| {
            element.value().attr(attribute).map(str::to_string)
        })
    }

    fn title(&self) -> String {
        self.query_text("title").unwrap_or_default()
    }

    fn location(&self) -> String {
        self.read_state().url.clone()
    }
}

impl MutationSource for HtmlDocument {
    fn subscribe(&self, options: &ObserveOptions) -> Option<mpsc::UnboundedReceiver<MutationBatch>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock_subscribers().push(Subscriber {
            options: options.clone(),
            tx,
        });
        Some(rx)
    }
}

/// Descendant text with whitespace runs collapsed, approximating innerText.
fn rendered_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Tag names of the element children of `<body>`.
fn body_children(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(body) = Selector::parse("body") else {
        return Vec::new();
    };

    document
        .select(&body)
        .next()
        .map(|body| {
            body.children()
                .filter_map(|child| child.value().as_element().map(|e| e.name().to_string()))
                .collect()
        })
        .unwrap_or_default()
}
