//! Message types exchanged with the popup and content pages.
//!
//! The popup drives the background service with [`UtilsRequest`] and reads
//! back a [`UtilsResponse`]; the background reaches into the page through
//! [`ContentRequest`]. All three serialize with a `type` tag so the
//! JavaScript side can switch on `message.type`.

use serde::{Deserialize, Serialize};

fn default_option() -> String {
    "All".to_string()
}

/// A popup (or options page) request to the background service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UtilsRequest {
    /// Re-applies saved developer settings to the active tab.
    ApplySettings {
        #[serde(default = "default_option")]
        option: String,
    },
    /// Opens the login form in a new tab.
    LogBackIn,
    /// Asks the content script who is signed in.
    GetCurrentUsername,
    /// Is the active tab a viewer page?
    IsViewer,
    /// Is the active tab an editor page?
    IsEditor,
    /// Is the active tab rendered in mobile view?
    IsMobileView,
    /// Forces or clears mobile rendering on the active tab.
    SetMobileView { enabled: bool },
    /// Appends an experiment to the active tab's URL.
    AddExperiment { name: String },
    /// Activates instrumentation for one package.
    DebugPackage { project: String, package: String },
    /// Activates instrumentation for everything.
    DebugAll,
    /// Focuses or opens the options page.
    OpenOptionsPage,
    /// Focuses or opens the editor for the site in the active tab.
    OpenEditor,
}

/// The background service's reply to a [`UtilsRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum UtilsResponse {
    /// The operation ran; nothing to report.
    Ack,
    /// A boolean predicate result.
    Flag { value: bool },
    /// The signed-in username, `None` when no content script answered.
    Username { value: Option<String> },
    /// The operation failed.
    Error { message: String },
}

/// A background request to a tab's content script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ContentRequest {
    /// Resolve the signed-in username from the page.
    GetCurrentUsername,
}
