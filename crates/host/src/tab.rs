//! Tab snapshots, identifiers, and request shapes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque handle for an open tab, unique while the tab lives. Owned by the
/// host; the service only ever passes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TabId(pub i32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Point-in-time snapshot of a tab. Mutations go through
/// [`HostBrowser::update_tab`](crate::HostBrowser::update_tab), never field
/// writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub active: bool,
}

/// Predicate for a tab query, mirroring the host's query object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_window: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl TabFilter {
    /// The tab that is focused within the focused window.
    pub fn active_in_current_window() -> Self {
        Self {
            active: Some(true),
            current_window: Some(true),
            url: None,
        }
    }

    /// Every tab in the focused window.
    pub fn current_window() -> Self {
        Self {
            active: None,
            current_window: Some(true),
            url: None,
        }
    }

    /// Tabs in the focused window showing exactly `url`.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            active: None,
            current_window: Some(true),
            url: Some(url.into()),
        }
    }
}

/// Requested change to a tab: navigation, focus, or both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
}

impl TabUpdate {
    /// Request navigation to `url`.
    pub fn navigate(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            selected: None,
        }
    }

    /// Request focus.
    pub fn select() -> Self {
        Self {
            url: None,
            selected: Some(true),
        }
    }
}
