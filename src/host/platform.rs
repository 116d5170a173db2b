use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use image::DynamicImage;

use crate::platform::{AppCatalog, AppOpsMode, InstalledPackage, PermissionProbe, SettingsPage};
use crate::settings::{HeadlessApp, SettingsStore};

use super::output::{HostOutput, Outbound};

/// Platform adapter for the stdio host: answers OS queries from the settings
/// profile and forwards settings-page requests to the embedder.
pub struct HeadlessPlatform {
    settings: Arc<SettingsStore>,
    output: HostOutput,
}

impl HeadlessPlatform {
    pub fn new(settings: Arc<SettingsStore>, output: HostOutput) -> Self {
        Self { settings, output }
    }

    fn find(&self, package_name: &str) -> Option<HeadlessApp> {
        self.settings
            .platform()
            .apps
            .into_iter()
            .find(|app| app.package_name == package_name)
    }
}

impl AppCatalog for HeadlessPlatform {
    fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
        Ok(self
            .settings
            .platform()
            .apps
            .into_iter()
            .map(|app| InstalledPackage {
                package_name: app.package_name,
                label: app.label,
                launchable: app.launchable,
            })
            .collect())
    }

    fn app_label(&self, package_name: &str) -> Option<String> {
        self.find(package_name).map(|app| app.label)
    }

    fn app_icon(&self, package_name: &str) -> Result<DynamicImage> {
        let app = self
            .find(package_name)
            .ok_or_else(|| anyhow!("{package_name} is not installed"))?;
        let path = app
            .icon_path
            .ok_or_else(|| anyhow!("{package_name} has no icon"))?;
        image::open(&path).with_context(|| format!("failed to load icon {}", path.display()))
    }
}

impl PermissionProbe for HeadlessPlatform {
    fn enabled_accessibility_services(&self) -> Option<String> {
        self.settings.platform().enabled_accessibility_services
    }

    fn usage_stats_mode(&self, _package_name: &str) -> Result<AppOpsMode> {
        Ok(self.settings.platform().usage_stats_mode)
    }

    fn open_settings(&self, page: &SettingsPage) -> Result<()> {
        self.output.emit(&Outbound::OpenSettings { page: page.clone() })
    }
}
