//! Document capability traits.
//!
//! Extractors, the retry loop and the change watcher never touch a real
//! rendering engine. They see the page through these two traits, which
//! keeps them testable against [`crate::testing`] fakes and lets
//! [`HtmlDocument`] stand in for a live page.

pub mod html;

pub use html::HtmlDocument;

use tokio::sync::mpsc;

/// Read-only view of the current page.
///
/// Implementations must never panic: an invalid selector or a missing
/// element is simply `None`.
pub trait Document: Send + Sync {
    /// Rendered text of the first element matching `selector`.
    fn query_text(&self, selector: &str) -> Option<String>;

    /// Attribute value of the first element matching `selector`.
    fn query_attr(&self, selector: &str, attribute: &str) -> Option<String>;

    /// Document title (empty when the page has none).
    fn title(&self) -> String;

    /// Current location (href).
    fn location(&self) -> String;

    /// Hostname of the current location, empty when it cannot be parsed.
    fn hostname(&self) -> String {
        hostname_of(&self.location()).unwrap_or_default()
    }
}

/// Source of DOM mutation batches for the document body.
pub trait MutationSource: Send + Sync {
    /// Start observing. `None` when there is nothing to observe.
    ///
    /// Dropping the receiver ends the subscription.
    fn subscribe(&self, options: &ObserveOptions) -> Option<mpsc::UnboundedReceiver<MutationBatch>>;
}

/// What changed in a single mutation record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    Attributes,
}

/// One mutation record, shaped like the platform's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,

    /// Tag name of the mutated node
    pub target: String,

    /// Tag names of nodes added under `target`
    pub added_nodes: Vec<String>,

    /// Tag names of nodes removed from `target`
    pub removed_nodes: Vec<String>,

    /// Attribute name for attribute records
    pub attribute_name: Option<String>,
}

impl MutationRecord {
    pub fn child_list(
        target: impl Into<String>,
        added_nodes: Vec<String>,
        removed_nodes: Vec<String>,
    ) -> Self {
        Self {
            kind: MutationKind::ChildList,
            target: target.into(),
            added_nodes,
            removed_nodes,
            attribute_name: None,
        }
    }

    pub fn attribute(target: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: MutationKind::Attributes,
            target: target.into(),
            added_nodes: Vec::new(),
            removed_nodes: Vec::new(),
            attribute_name: Some(name.into()),
        }
    }

    /// Whether this record adds or removes nodes.
    pub fn changes_nodes(&self) -> bool {
        !self.added_nodes.is_empty() || !self.removed_nodes.is_empty()
    }
}

/// Records delivered together in one observer callback.
pub type MutationBatch = Vec<MutationRecord>;

/// Observation options, mirroring the platform observer's init dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub attributes: bool,

    /// When non-empty, only these attributes are reported
    pub attribute_filter: Vec<String>,
}

impl Default for ObserveOptions {
    /// Subtree child list plus presentation attributes only.
    fn default() -> Self {
        Self {
            child_list: true,
            subtree: true,
            attributes: true,
            attribute_filter: vec!["class".to_string(), "style".to_string()],
        }
    }
}

impl ObserveOptions {
    /// Whether a record passes these options.
    pub fn accepts(&self, record: &MutationRecord) -> bool {
        match record.kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::Attributes => {
                self.attributes
                    && (self.attribute_filter.is_empty()
                        || record
                            .attribute_name
                            .as_ref()
                            .is_some_and(|name| self.attribute_filter.contains(name)))
            }
        }
    }
}

/// Extract the hostname from a URL string.
pub fn hostname_of(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hostname_of() {
        assert_eq!(
            hostname_of("https://www.linkedin.com/jobs/view/123"),
            Some("www.linkedin.com".to_string())
        );
        assert_eq!(hostname_of("not a url"), None);
    }

    #[test]
    fn test_default_options_filter_attributes() {
        let options = ObserveOptions::default();

        assert!(options.accepts(&MutationRecord::attribute("div", "class")));
        assert!(options.accepts(&MutationRecord::attribute("div", "style")));
        assert!(!options.accepts(&MutationRecord::attribute("div", "data-id")));
        assert!(options.accepts(&MutationRecord::child_list("body", vec![], vec![])));
    }

    #[test]
    fn test_changes_nodes() {
        assert!(MutationRecord::child_list("body", vec!["div".into()], vec![]).changes_nodes());
        assert!(MutationRecord::child_list("body", vec![], vec!["p".into()]).changes_nodes());
        assert!(!MutationRecord::child_list("body", vec![], vec![]).changes_nodes());
        assert!(!MutationRecord::attribute("body", "class").changes_nodes());
    }
}
