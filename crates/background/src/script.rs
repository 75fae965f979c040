//! Script injection with a privileged-page short-circuit.

use devbar_host::{HostBrowser, Result, Tab};
use serde_json::Value;
use tracing::trace;

/// URL prefix of pages the host refuses to inject into (`chrome://`,
/// `chrome-extension://`, ...).
const PRIVILEGED_SCHEME_PREFIX: &str = "chrome";

/// Evaluates `code` in the tab's top-level document and resolves with the
/// first returned value.
///
/// Resolves to `None` without attempting injection when the tab shows a
/// privileged page, and to `None` when execution produced no result. No
/// retry and no timeout: a hung injection hangs the caller.
pub async fn run(host: &dyn HostBrowser, tab: &Tab, code: &str) -> Result<Option<Value>> {
    if tab.url.starts_with(PRIVILEGED_SCHEME_PREFIX) {
        trace!(target: "devbar", tab = %tab.id, "skipping injection into privileged page");
        return Ok(None);
    }
    let results = host.execute_script(tab.id, code).await?;
    Ok(results.into_iter().next())
}
