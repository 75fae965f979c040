//! devbar-host: the host browser interface boundary.
//!
//! The background service never talks to `chrome.*` globals directly.
//! Everything it needs from the host browser goes through the
//! [`HostBrowser`] trait:
//!
//! - **Tabs**: query, navigate/focus, create
//! - **Messaging**: deliver a payload to a tab's content script
//! - **Scripting**: evaluate code in a tab's top-level document
//! - **Action**: set the toolbar icon
//! - **Storage**: the extension's local key-value store
//!
//! In production these calls land on the `chrome.*` APIs; tests use
//! [`MockBrowser`], which scripts host responses and records every request
//! made of it.

pub mod browser;
pub mod error;
pub mod mock;
pub mod tab;

pub use browser::{HostBrowser, IconSpec};
pub use error::{Error, Result};
pub use mock::{MockAction, MockBrowser};
pub use tab::{Tab, TabFilter, TabId, TabUpdate};
