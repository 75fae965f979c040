//! The [`HostBrowser`] trait.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::tab::{Tab, TabFilter, TabId, TabUpdate};

/// Toolbar icon bitmap paths keyed by pixel size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSpec {
    pub path: BTreeMap<u32, String>,
}

/// Everything the background service needs from the host browser.
///
/// All calls are asynchronous requests to the host environment; none of
/// them block. Implementations must be cheap to share (`Arc<dyn
/// HostBrowser>`) since independent operations run concurrently with no
/// coordination between them.
#[async_trait]
pub trait HostBrowser: Send + Sync {
    /// Returns the tabs matching `filter`, possibly none.
    async fn query_tabs(&self, filter: TabFilter) -> Result<Vec<Tab>>;

    /// Requests navigation and/or focus for a tab.
    async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<()>;

    /// Opens a new tab at `url` and returns its snapshot.
    async fn create_tab(&self, url: &str) -> Result<Tab>;

    /// Delivers `payload` to the tab's content context. Resolves to `None`
    /// when no listener replied.
    async fn send_message(&self, id: TabId, payload: Value) -> Result<Option<Value>>;

    /// Evaluates `code` in the tab's top-level document and returns the
    /// per-frame results. Empty when the page refused execution.
    async fn execute_script(&self, id: TabId, code: &str) -> Result<Vec<Value>>;

    /// Sets the toolbar icon bitmaps.
    async fn set_icon(&self, icon: IconSpec) -> Result<()>;

    /// Reads a value from the extension's local storage.
    async fn storage_get(&self, key: &str) -> Result<Option<Value>>;

    /// Writes a value to the extension's local storage.
    async fn storage_set(&self, key: &str, value: Value) -> Result<()>;

    /// Resolves a path inside the extension bundle to a fully-qualified
    /// extension URL.
    fn extension_url(&self, path: &str) -> String;
}
