//! Settings persistence through host storage.

use devbar_host::{HostBrowser, Result};
use devbar_protocol::DevSettings;
use devbar_protocol::settings::SETTINGS_STORAGE_KEY as STORAGE_KEY;

/// Loads saved settings, falling back to defaults when nothing is stored.
pub async fn load(host: &dyn HostBrowser) -> Result<DevSettings> {
    match host.storage_get(STORAGE_KEY).await? {
        Some(value) => Ok(serde_json::from_value(value)?),
        None => Ok(DevSettings::default()),
    }
}

/// Persists `settings` for the options and popup pages.
pub async fn save(host: &dyn HostBrowser, settings: &DevSettings) -> Result<()> {
    host.storage_set(STORAGE_KEY, serde_json::to_value(settings)?)
        .await
}

#[cfg(test)]
mod tests {
    use devbar_host::MockBrowser;
    use devbar_protocol::DebugSelector;

    use super::*;

    #[tokio::test]
    async fn load_defaults_when_storage_is_empty() {
        let mock = MockBrowser::new();
        assert_eq!(load(&mock).await.unwrap(), DevSettings::default());
    }

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let mock = MockBrowser::new();
        let settings = DevSettings {
            debug: DebugSelector::All,
            experiments: vec!["NewNav".to_string()],
            show_mobile_view: Some(false),
        };
        save(&mock, &settings).await.unwrap();
        assert_eq!(load(&mock).await.unwrap(), settings);
    }
}
