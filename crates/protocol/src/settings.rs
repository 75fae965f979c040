//! Persisted developer settings and their expansion into transforms.

use serde::{Deserialize, Serialize};

use crate::debug::DebugSelector;
use crate::transform::{InvalidUrl, QueryTransform};

/// Extension-storage key holding the serialized [`DevSettings`].
pub const SETTINGS_STORAGE_KEY: &str = "devbar.settings";

/// Developer preferences saved from the options page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DevSettings {
    /// Instrumentation packages to activate on visited pages.
    pub debug: DebugSelector,
    /// Experiments to force on, applied in order.
    pub experiments: Vec<String>,
    /// Forced mobile rendering; `None` leaves the page's own state alone.
    pub show_mobile_view: Option<bool>,
}

/// Which slice of the saved settings to apply to a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsScope {
    /// Every concern below.
    All,
    /// Only the debug selector.
    Debug,
    /// Only the experiment list.
    Experiments,
    /// Only the mobile-view toggle.
    MobileView,
}

impl SettingsScope {
    /// Parses the option string sent by the popup, case-insensitively.
    pub fn parse(option: &str) -> Option<Self> {
        let option = option.trim();
        if option.eq_ignore_ascii_case("all") {
            Some(SettingsScope::All)
        } else if option.eq_ignore_ascii_case("debug") {
            Some(SettingsScope::Debug)
        } else if option.eq_ignore_ascii_case("experiments") {
            Some(SettingsScope::Experiments)
        } else if option.eq_ignore_ascii_case("mobileview") {
            Some(SettingsScope::MobileView)
        } else {
            None
        }
    }
}

impl DevSettings {
    /// Expands the settings selected by `scope` into transforms, in
    /// application order: debug, then experiments, then mobile view.
    pub fn transforms(&self, scope: SettingsScope) -> Vec<QueryTransform> {
        let mut transforms = Vec::new();
        if matches!(scope, SettingsScope::All | SettingsScope::Debug) {
            match &self.debug {
                DebugSelector::All => transforms.push(QueryTransform::SetDebugAll),
                DebugSelector::Packages(packages) => {
                    transforms.extend(packages.iter().map(|package| {
                        QueryTransform::AppendDebugPackage {
                            package: package.clone(),
                        }
                    }));
                }
            }
        }
        if matches!(scope, SettingsScope::All | SettingsScope::Experiments) {
            transforms.extend(self.experiments.iter().map(|name| {
                QueryTransform::AppendExperiment { name: name.clone() }
            }));
        }
        if matches!(scope, SettingsScope::All | SettingsScope::MobileView) {
            if let Some(enabled) = self.show_mobile_view {
                transforms.push(QueryTransform::ToggleMobileView { enabled });
            }
        }
        transforms
    }

    /// Folds the selected transforms over `url`.
    pub fn apply_to_url(&self, url: &str, scope: SettingsScope) -> Result<String, InvalidUrl> {
        let mut current = url.to_string();
        for transform in self.transforms(scope) {
            current = transform.apply(&current)?;
        }
        Ok(current)
    }
}
