//! Cross-context messaging.
//!
//! Two legs connected only by serialized messages:
//!
//! - [`content`] runs inside the page and answers `getJobData`
//! - [`relay`] runs in the background, forwards `requestJobDataFromTab`
//!   into the sender's tab and injects content logic when it is missing
//!
//! [`browser`] defines what the relay needs from the browser and ships an
//! in-process implementation.

pub mod browser;
pub mod content;
pub mod protocol;
pub mod relay;

pub use browser::{InMemoryBrowser, NavigationCompleted, ScriptInjector, TabMessenger};
pub use content::ContentScript;
pub use protocol::{JobDataResponse, Message, MessageSender, TabId};
pub use relay::Relay;
