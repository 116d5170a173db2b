use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::platform::AppOpsMode;

pub const SETTINGS_ENV: &str = "STAYHARD_SETTINGS";
pub const DEBUG_ENV: &str = "STAYHARD_DEBUG";
const DEFAULT_SETTINGS_FILE: &str = "stayhard.json";

/// One installed app as the headless host describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeadlessApp {
    pub package_name: String,
    pub label: String,
    #[serde(default = "launchable_default")]
    pub launchable: bool,
    #[serde(default)]
    pub icon_path: Option<PathBuf>,
}

fn launchable_default() -> bool {
    true
}

/// What the headless host reports for OS queries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlatformProfile {
    pub apps: Vec<HeadlessApp>,
    pub enabled_accessibility_services: Option<String>,
    pub usage_stats_mode: AppOpsMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HostSettings {
    pub host_package: String,
    pub service_component: String,
    pub event_buffer: usize,
    pub verbose_events: bool,
    pub platform: PlatformProfile,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            host_package: "com.stayhard".into(),
            service_component: "com.stayhard.services.AppBlockingAccessibilityService".into(),
            event_buffer: 64,
            verbose_events: false,
            platform: PlatformProfile::default(),
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<HostSettings>,
}

impl SettingsStore {
    /// Missing file means defaults; a file that fails to parse is logged and
    /// also falls back to defaults.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = read_contents(&path)?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring malformed settings {}: {}", path.display(), err);
                HostSettings::default()
            })
        } else {
            log::info!("No settings at {}, using defaults", path.display());
            HostSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn current(&self) -> HostSettings {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn platform(&self) -> PlatformProfile {
        self.data
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .platform
            .clone()
    }

    /// Re-reads the file. Only the platform profile is picked up by a running
    /// host; identity and buffer size are fixed at startup. A file that fails
    /// to parse is an error and the loaded settings stay in place.
    pub fn reload(&self) -> Result<()> {
        let contents = read_contents(&self.path)?;
        let data: HostSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        *guard = data;
        Ok(())
    }
}

fn read_contents(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings from {}", path.display()))
}

pub fn settings_path() -> PathBuf {
    std::env::var_os(SETTINGS_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
}

pub fn debug_mode() -> bool {
    std::env::var(DEBUG_ENV)
        .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}
