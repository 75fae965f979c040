//! devbar: background service for the devbar browser extension.
//!
//! The service toggles developer-facing behaviors on the Wix editor and
//! viewer pages: it resolves the active tab, rewrites its URL with debug
//! and experiment query flags, relays messages to the page, and keeps the
//! toolbar icon in sync with what kind of page is showing.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────┐
//! │   Background   │  operation surface consumed by the popup
//! └───────┬────────┘
//!         │
//! ┌───────▼────────┐
//! │ resolver/script│  active-tab polling, predicate injection
//! └───────┬────────┘
//!         │ HostBrowser trait (devbar-host)
//! ┌───────▼────────┐
//! │  host browser  │  tabs, scripting, icon, storage
//! └────────────────┘
//! ```
//!
//! URL rewriting itself is pure and lives in `devbar-protocol`; this crate
//! supplies the asynchronous glue between the host interface and those
//! transforms.

pub mod dispatch;
pub mod icon;
pub mod resolver;
pub mod script;
pub mod service;
pub mod settings;

pub use devbar_host::{Error, HostBrowser, Result, Tab, TabId};
pub use devbar_protocol::predicates;
pub use devbar_protocol::{DevSettings, QueryTransform, SettingsScope};
pub use dispatch::dispatch;
pub use resolver::ActiveTabResolver;
pub use service::Background;
