//! Active tab resolution.
//!
//! The host reports no active tab while a window switch is in flight, so
//! resolution polls on a fixed interval until one shows up. Concurrent
//! resolves poll independently; there is no shared cache and no dedup.

use std::time::Duration;

use devbar_host::{HostBrowser, Result, Tab, TabFilter};
use tracing::trace;

/// Delay between active-tab polls.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Locates the currently focused tab, retrying until one exists.
#[derive(Debug, Clone)]
pub struct ActiveTabResolver {
    poll_interval: Duration,
}

impl Default for ActiveTabResolver {
    fn default() -> Self {
        Self {
            poll_interval: POLL_INTERVAL,
        }
    }
}

impl ActiveTabResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides the poll interval.
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Resolves the tab that is active in the current window.
    ///
    /// Polls without bound until the host reports one; an empty query result
    /// is expected during window switches, not an error. Host API failures
    /// do propagate.
    pub async fn resolve(&self, host: &dyn HostBrowser) -> Result<Tab> {
        loop {
            let mut tabs = host
                .query_tabs(TabFilter::active_in_current_window())
                .await?;
            if !tabs.is_empty() {
                return Ok(tabs.remove(0));
            }
            trace!(target: "devbar", "no active tab yet, polling again");
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Bounded variant for callers that cannot tolerate an endless poll:
    /// gives up after `max_polls` empty results.
    pub async fn resolve_within(
        &self,
        host: &dyn HostBrowser,
        max_polls: usize,
    ) -> Result<Option<Tab>> {
        for _ in 0..max_polls {
            let mut tabs = host
                .query_tabs(TabFilter::active_in_current_window())
                .await?;
            if !tabs.is_empty() {
                return Ok(Some(tabs.remove(0)));
            }
            tokio::time::sleep(self.poll_interval).await;
        }
        Ok(None)
    }
}
