//! Mock host browser for testing the background service without a browser.
//!
//! Configure host responses with the `set_*` methods, run operations, then
//! assert on the recorded [`MockAction`] sequence.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use crate::browser::{HostBrowser, IconSpec};
use crate::error::Result;
use crate::tab::{Tab, TabFilter, TabId, TabUpdate};

/// Request recorded by [`MockBrowser`] for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum MockAction {
    /// A tab was asked to navigate or take focus.
    UpdateTab { id: TabId, update: TabUpdate },
    /// A tab was opened.
    CreateTab { url: String },
    /// A payload was sent to a tab's content script.
    SendMessage { id: TabId, payload: Value },
    /// Code was injected into a tab.
    ExecuteScript { id: TabId, code: String },
    /// The toolbar icon was set.
    SetIcon { icon: IconSpec },
}

/// Scriptable [`HostBrowser`] double.
#[derive(Default)]
pub struct MockBrowser {
    tabs: Mutex<Vec<Tab>>,
    empty_active_queries: Mutex<usize>,
    active_query_count: Mutex<usize>,
    script_results: Mutex<HashMap<String, Value>>,
    message_response: Mutex<Option<Value>>,
    storage: Mutex<HashMap<String, Value>>,
    actions: Mutex<Vec<MockAction>>,
    next_tab_id: Mutex<i32>,
}

impl MockBrowser {
    /// Creates a mock with no tabs.
    pub fn new() -> Self {
        Self {
            next_tab_id: Mutex::new(1),
            ..Self::default()
        }
    }

    /// Adds an active tab at `url`, deactivating any other, and returns its
    /// id.
    pub fn set_active_tab(&self, url: &str) -> TabId {
        let id = self.take_tab_id();
        let mut tabs = self.tabs.lock().unwrap();
        for tab in tabs.iter_mut() {
            tab.active = false;
        }
        tabs.push(Tab {
            id,
            url: url.to_string(),
            active: true,
        });
        id
    }

    /// Adds a background tab at `url` and returns its id.
    pub fn add_tab(&self, url: &str) -> TabId {
        let id = self.take_tab_id();
        self.tabs.lock().unwrap().push(Tab {
            id,
            url: url.to_string(),
            active: false,
        });
        id
    }

    /// Answers the next `count` active-tab queries with no tab, simulating
    /// a transiently unfocused window.
    pub fn activate_after(&self, count: usize) {
        *self.empty_active_queries.lock().unwrap() = count;
    }

    /// Sets the result returned for an exact injected `code` string.
    pub fn set_script_result(&self, code: &str, result: Value) {
        self.script_results
            .lock()
            .unwrap()
            .insert(code.to_string(), result);
    }

    /// Sets the reply to the next content-script message, `None` for a
    /// silent page.
    pub fn set_message_response(&self, response: Option<Value>) {
        *self.message_response.lock().unwrap() = response;
    }

    /// Seeds a value in extension storage.
    pub fn seed_storage(&self, key: &str, value: Value) {
        self.storage.lock().unwrap().insert(key.to_string(), value);
    }

    /// Returns the current snapshot of a tab, if it exists.
    pub fn tab(&self, id: TabId) -> Option<Tab> {
        self.tabs.lock().unwrap().iter().find(|t| t.id == id).cloned()
    }

    /// Number of active-tab queries made so far.
    pub fn active_query_count(&self) -> usize {
        *self.active_query_count.lock().unwrap()
    }

    /// Returns all recorded actions.
    pub fn actions(&self) -> Vec<MockAction> {
        self.actions.lock().unwrap().clone()
    }

    /// Clears recorded actions.
    pub fn clear_actions(&self) {
        self.actions.lock().unwrap().clear();
    }

    fn take_tab_id(&self) -> TabId {
        let mut next = self.next_tab_id.lock().unwrap();
        let id = TabId(*next);
        *next += 1;
        id
    }

    fn record(&self, action: MockAction) {
        self.actions.lock().unwrap().push(action);
    }
}

#[async_trait]
impl HostBrowser for MockBrowser {
    async fn query_tabs(&self, filter: TabFilter) -> Result<Vec<Tab>> {
        if filter.active == Some(true) {
            *self.active_query_count.lock().unwrap() += 1;
            let mut empties = self.empty_active_queries.lock().unwrap();
            if *empties > 0 {
                *empties -= 1;
                return Ok(Vec::new());
            }
            return Ok(self
                .tabs
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.active)
                .cloned()
                .collect());
        }
        let tabs = self.tabs.lock().unwrap();
        Ok(match &filter.url {
            Some(url) => tabs.iter().filter(|t| &t.url == url).cloned().collect(),
            None => tabs.clone(),
        })
    }

    async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<()> {
        self.record(MockAction::UpdateTab {
            id,
            update: update.clone(),
        });
        let mut tabs = self.tabs.lock().unwrap();
        if update.selected == Some(true) {
            for tab in tabs.iter_mut() {
                tab.active = tab.id == id;
            }
        }
        if let Some(url) = update.url {
            if let Some(tab) = tabs.iter_mut().find(|t| t.id == id) {
                tab.url = url;
            }
        }
        Ok(())
    }

    async fn create_tab(&self, url: &str) -> Result<Tab> {
        self.record(MockAction::CreateTab {
            url: url.to_string(),
        });
        let id = self.take_tab_id();
        let tab = Tab {
            id,
            url: url.to_string(),
            active: true,
        };
        let mut tabs = self.tabs.lock().unwrap();
        for existing in tabs.iter_mut() {
            existing.active = false;
        }
        tabs.push(tab.clone());
        Ok(tab)
    }

    async fn send_message(&self, id: TabId, payload: Value) -> Result<Option<Value>> {
        self.record(MockAction::SendMessage { id, payload });
        Ok(self.message_response.lock().unwrap().clone())
    }

    async fn execute_script(&self, id: TabId, code: &str) -> Result<Vec<Value>> {
        self.record(MockAction::ExecuteScript {
            id,
            code: code.to_string(),
        });
        Ok(self
            .script_results
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .into_iter()
            .collect())
    }

    async fn set_icon(&self, icon: IconSpec) -> Result<()> {
        self.record(MockAction::SetIcon { icon });
        Ok(())
    }

    async fn storage_get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.storage.lock().unwrap().get(key).cloned())
    }

    async fn storage_set(&self, key: &str, value: Value) -> Result<()> {
        self.storage.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn extension_url(&self, path: &str) -> String {
        format!("chrome-extension://mock-extension-id/{path}")
    }
}
