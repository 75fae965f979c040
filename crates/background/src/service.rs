//! The background operation surface.
//!
//! [`Background`] is the explicit interface handed to the popup and options
//! pages. Every operation resolves the active tab on its own; operations
//! never share state and are harmless if delivered late.

use std::sync::Arc;

use devbar_host::{Error, HostBrowser, Result, Tab, TabFilter, TabUpdate};
use devbar_protocol::{ContentRequest, QueryTransform, SettingsScope, predicates};
use serde_json::Value;
use tracing::{debug, info};

use crate::icon;
use crate::resolver::ActiveTabResolver;
use crate::script;
use crate::settings;

/// Login form shown after a session expires.
pub const LOGIN_URL: &str = "https://users.wix.com/wix-users/login/form";
/// Base URL of editor pages; the site id is appended.
pub const EDITOR_BASE_URL: &str = "http://editor.wix.com/html/editor/web/renderer/edit/";

const OPTIONS_PAGE: &str = "options.html";

/// Background service over a shared host browser handle.
pub struct Background {
    host: Arc<dyn HostBrowser>,
    resolver: ActiveTabResolver,
}

impl Background {
    pub fn new(host: Arc<dyn HostBrowser>) -> Self {
        Self {
            host,
            resolver: ActiveTabResolver::new(),
        }
    }

    /// Uses a custom resolver (shorter poll intervals in tests).
    pub fn with_resolver(host: Arc<dyn HostBrowser>, resolver: ActiveTabResolver) -> Self {
        Self { host, resolver }
    }

    /// The underlying host handle.
    pub fn host(&self) -> &dyn HostBrowser {
        self.host.as_ref()
    }

    async fn active_tab(&self) -> Result<Tab> {
        self.resolver.resolve(self.host.as_ref()).await
    }

    /// Rewrites the active tab's URL with `transform`, navigating only when
    /// the URL actually changed.
    async fn rewrite_active_tab(&self, transform: QueryTransform) -> Result<()> {
        let tab = self.active_tab().await?;
        let rewritten = transform.apply(&tab.url)?;
        self.navigate_if_changed(&tab, rewritten).await
    }

    async fn navigate_if_changed(&self, tab: &Tab, rewritten: String) -> Result<()> {
        if rewritten == tab.url {
            debug!(target: "devbar", tab = %tab.id, "rewrite is a no-op, not navigating");
            return Ok(());
        }
        info!(target: "devbar", tab = %tab.id, url = %rewritten, "navigating tab");
        self.host
            .update_tab(tab.id, TabUpdate::navigate(rewritten))
            .await
    }

    /// Applies the saved settings slice named by `option` ("All", "Debug",
    /// "Experiments" or "MobileView") to the active tab.
    pub async fn apply_settings(&self, option: &str) -> Result<()> {
        let scope = SettingsScope::parse(option)
            .ok_or_else(|| Error::Api(format!("unknown settings option '{option}'")))?;
        let saved = settings::load(self.host.as_ref()).await?;
        let tab = self.active_tab().await?;
        let rewritten = saved.apply_to_url(&tab.url, scope)?;
        self.navigate_if_changed(&tab, rewritten).await
    }

    /// Opens the login form in a new tab.
    pub async fn log_back_in(&self) -> Result<()> {
        info!(target: "devbar", "opening login form");
        self.host.create_tab(LOGIN_URL).await.map(|_| ())
    }

    /// Asks the active tab's content script for the signed-in username.
    /// `None` when no listener replied or the reply was not a string.
    pub async fn get_current_username(&self) -> Result<Option<String>> {
        let tab = self.active_tab().await?;
        let payload = serde_json::to_value(ContentRequest::GetCurrentUsername)?;
        let reply = self.host.send_message(tab.id, payload).await?;
        Ok(reply.and_then(|value| value.as_str().map(str::to_string)))
    }

    /// Is the active tab a published-site (viewer) page?
    pub async fn is_viewer(&self) -> Result<bool> {
        self.check_meta(predicates::VIEWER_META).await
    }

    /// Is the active tab an editor page?
    pub async fn is_editor(&self) -> Result<bool> {
        self.check_meta(predicates::EDITOR_META).await
    }

    async fn check_meta(&self, http_equiv: &str) -> Result<bool> {
        let tab = self.active_tab().await?;
        let result = script::run(self.host.as_ref(), &tab, &predicates::has_meta_js(http_equiv))
            .await?;
        Ok(matches!(result, Some(Value::Bool(true))))
    }

    /// Reads the mobile-view flag out of the active tab's URL.
    pub async fn is_mobile_view(&self) -> Result<bool> {
        let tab = self.active_tab().await?;
        Ok(devbar_protocol::mobile_view_enabled(&tab.url))
    }

    /// Forces or clears mobile rendering on the active tab.
    pub async fn set_mobile_view(&self, enabled: bool) -> Result<()> {
        self.rewrite_active_tab(QueryTransform::ToggleMobileView { enabled })
            .await
    }

    /// Appends an experiment to the active tab's URL. Experiments are not
    /// deduplicated.
    pub async fn add_experiment(&self, name: &str) -> Result<()> {
        self.rewrite_active_tab(QueryTransform::AppendExperiment {
            name: name.to_string(),
        })
        .await
    }

    /// Activates instrumentation for `package`. The owning `project` is
    /// informational only; it never reaches the URL.
    pub async fn debug_package(&self, project: &str, package: &str) -> Result<()> {
        debug!(target: "devbar", %project, %package, "enabling package instrumentation");
        self.rewrite_active_tab(QueryTransform::AppendDebugPackage {
            package: package.to_string(),
        })
        .await
    }

    /// Activates instrumentation for everything, replacing any package list.
    pub async fn debug_all(&self) -> Result<()> {
        self.rewrite_active_tab(QueryTransform::SetDebugAll).await
    }

    /// Focuses the options page if one is open in the current window,
    /// otherwise opens it in a new tab.
    pub async fn open_options_page(&self) -> Result<()> {
        let url = self.host.extension_url(OPTIONS_PAGE);
        let tabs = self.host.query_tabs(TabFilter::for_url(&url)).await?;
        match tabs.first() {
            Some(tab) => self.host.update_tab(tab.id, TabUpdate::select()).await,
            None => self.host.create_tab(&url).await.map(|_| ()),
        }
    }

    /// Focuses or opens the editor for the site shown in the active tab.
    ///
    /// Reads the site ids from the page's meta tags; an existing editor tab
    /// for the site is focused, otherwise a new one is created with all
    /// saved settings applied. A page without an application-instance id
    /// has no editor, so the operation is a no-op there.
    pub async fn open_editor(&self) -> Result<()> {
        let tab = self.active_tab().await?;
        let (meta_site_id, site_id) = tokio::join!(
            self.meta_content(&tab, predicates::META_SITE_ID_META),
            self.meta_content(&tab, predicates::APP_INSTANCE_ID_META),
        );
        let Some(site_id) = site_id? else {
            debug!(target: "devbar", tab = %tab.id, "page exposes no site id, nothing to open");
            return Ok(());
        };

        let base = format!("{EDITOR_BASE_URL}{site_id}");
        let tabs = self.host.query_tabs(TabFilter::current_window()).await?;
        if let Some(editor_tab) = tabs.iter().find(|t| t.url.starts_with(&base)) {
            info!(target: "devbar", tab = %editor_tab.id, "focusing existing editor tab");
            return self
                .host
                .update_tab(editor_tab.id, TabUpdate::select())
                .await;
        }

        let mut url = base;
        if let Some(meta_site_id) = meta_site_id? {
            url = format!("{url}?metaSiteId={meta_site_id}");
        }
        let saved = settings::load(self.host.as_ref()).await?;
        let url = saved.apply_to_url(&url, SettingsScope::All)?;
        info!(target: "devbar", url = %url, "opening editor tab");
        self.host.create_tab(&url).await.map(|_| ())
    }

    async fn meta_content(&self, tab: &Tab, http_equiv: &str) -> Result<Option<String>> {
        let code = predicates::meta_content_js(http_equiv);
        let result = script::run(self.host.as_ref(), tab, &code).await?;
        Ok(result.and_then(|value| value.as_str().map(str::to_string)))
    }

    /// Repaints the toolbar icon from the active tab's page kind. Predicate
    /// failures count as "not detected", never as errors.
    pub async fn refresh_action_icon(&self) -> Result<()> {
        let (editor, viewer) = tokio::join!(self.is_editor(), self.is_viewer());
        let enabled = editor.unwrap_or(false) || viewer.unwrap_or(false);
        debug!(target: "devbar", enabled, "refreshing toolbar icon");
        self.host.set_icon(icon::icon_spec(enabled)).await
    }
}
