use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClaimEndpointSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for ClaimEndpointSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".into(),
            timeout_secs: 15,
        }
    }
}

/// Tunables for one watch session. Defaults reproduce the shipped behaviour:
/// 5 s segments, 1.5 s forward-seek slack, reward at 5% unique coverage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct WatchSettings {
    pub segment_length_secs: f64,
    pub seek_tolerance_secs: f64,
    pub claim_threshold_percent: f64,
    pub expected_playback_rate: f64,
    pub claim_endpoint: ClaimEndpointSettings,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            segment_length_secs: 5.0,
            seek_tolerance_secs: 1.5,
            claim_threshold_percent: 5.0,
            expected_playback_rate: 1.0,
            claim_endpoint: ClaimEndpointSettings::default(),
        }
    }
}

impl WatchSettings {
    pub fn validate(&self) -> Result<()> {
        if !(self.segment_length_secs.is_finite() && self.segment_length_secs > 0.0) {
            bail!(
                "segment length must be a positive number of seconds, got {}",
                self.segment_length_secs
            );
        }
        if !(self.seek_tolerance_secs.is_finite() && self.seek_tolerance_secs >= 0.0) {
            bail!(
                "seek tolerance must be non-negative, got {}",
                self.seek_tolerance_secs
            );
        }
        if !(self.claim_threshold_percent > 0.0 && self.claim_threshold_percent <= 100.0) {
            bail!(
                "claim threshold must be within (0, 100], got {}",
                self.claim_threshold_percent
            );
        }
        if !(self.expected_playback_rate.is_finite() && self.expected_playback_rate > 0.0) {
            bail!(
                "expected playback rate must be positive, got {}",
                self.expected_playback_rate
            );
        }
        if self.claim_endpoint.base_url.trim().is_empty() {
            bail!("claim endpoint base url is empty");
        }
        Ok(())
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<WatchSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            let parsed: WatchSettings = serde_json::from_str(&contents).unwrap_or_default();
            if parsed.validate().is_ok() {
                parsed
            } else {
                log::warn!(
                    "Ignoring invalid watch settings in {}; using defaults",
                    path.display()
                );
                WatchSettings::default()
            }
        } else {
            WatchSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn current(&self) -> WatchSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: WatchSettings) -> Result<()> {
        settings.validate()?;
        let mut guard = match self.data.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    fn persist(&self, data: &WatchSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create settings directory {}", parent.display())
            })?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("watch.json")).unwrap();
        assert_eq!(store.current(), WatchSettings::default());
    }

    #[test]
    fn update_persists_and_reloads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("watch.json");
        let store = SettingsStore::new(path.clone()).unwrap();

        let custom = WatchSettings {
            segment_length_secs: 10.0,
            seek_tolerance_secs: 2.0,
            claim_threshold_percent: 50.0,
            ..WatchSettings::default()
        };
        store.update(custom.clone()).unwrap();

        let reloaded = SettingsStore::new(path).unwrap();
        assert_eq!(reloaded.current(), custom);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watch.json");
        fs::write(&path, r#"{ "claimThresholdPercent": 25.0 }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        let settings = store.current();
        assert_eq!(settings.claim_threshold_percent, 25.0);
        assert_eq!(settings.segment_length_secs, 5.0);
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watch.json");
        fs::write(&path, r#"{ "segmentLengthSecs": 0 }"#).unwrap();

        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.current(), WatchSettings::default());
    }

    #[test]
    fn update_rejects_invalid_threshold() {
        let dir = tempdir().unwrap();
        let store = SettingsStore::new(dir.path().join("watch.json")).unwrap();
        let bad = WatchSettings {
            claim_threshold_percent: 0.0,
            ..WatchSettings::default()
        };
        assert!(store.update(bad).is_err());
        assert_eq!(store.current(), WatchSettings::default());
    }
}
