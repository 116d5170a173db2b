//! OS-facing seams. A host embeds the crate by implementing [`AppCatalog`]
//! and [`PermissionProbe`]; everything above this module only talks to the
//! traits.

pub mod apps;
pub mod icons;
pub mod permissions;

use anyhow::Result;
use image::DynamicImage;
use serde::{Deserialize, Serialize};

pub use apps::{installed_apps, InstalledApp};
pub use icons::{encode_png_base64, icon_base64};
pub use permissions::{
    has_usage_stats_permission, is_accessibility_service_enabled, open_accessibility_settings,
    request_usage_stats_permission,
};

/// An application package as the OS reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPackage {
    pub package_name: String,
    pub label: String,
    /// Has a launcher entry point; background-only packages do not.
    pub launchable: bool,
}

pub trait AppCatalog: Send + Sync {
    fn installed_packages(&self) -> Result<Vec<InstalledPackage>>;

    /// `None` when the package is not installed.
    fn app_label(&self, package_name: &str) -> Option<String>;

    /// Whatever bitmap the OS hands back; it is re-encoded as PNG by the caller.
    fn app_icon(&self, package_name: &str) -> Result<DynamicImage>;
}

/// Usage-stats app-op modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AppOpsMode {
    Allowed,
    Ignored,
    Errored,
    #[default]
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "page", rename_all = "camelCase")]
pub enum SettingsPage {
    Accessibility,
    /// `data` is the `package:<id>` uri the settings screen is scoped to.
    UsageAccess { data: String },
}

pub trait PermissionProbe: Send + Sync {
    /// Colon separated `<package>/<component>` list, `None` when the OS has none.
    fn enabled_accessibility_services(&self) -> Option<String>;

    fn usage_stats_mode(&self, package_name: &str) -> Result<AppOpsMode>;

    fn open_settings(&self, page: &SettingsPage) -> Result<()>;
}

/// Everything the bridge needs from the host OS.
pub trait Platform: AppCatalog + PermissionProbe {}

impl<T: AppCatalog + PermissionProbe> Platform for T {}
