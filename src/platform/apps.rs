use serde::Serialize;

use super::{icons::icon_base64, AppCatalog};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub package_name: String,
    pub name: String,
    /// Base64 PNG, empty when the icon could not be loaded.
    pub icon: String,
}

/// Launchable apps (system and user alike) sorted by display name.
pub fn installed_apps<C>(catalog: &C) -> Vec<InstalledApp>
where
    C: AppCatalog + ?Sized,
{
    let packages = match catalog.installed_packages() {
        Ok(packages) => packages,
        Err(err) => {
            log::warn!("Failed to enumerate installed apps: {err:#}");
            return Vec::new();
        }
    };

    let mut apps: Vec<InstalledApp> = packages
        .into_iter()
        .filter(|package| package.launchable)
        .map(|package| InstalledApp {
            icon: icon_base64(catalog, &package.package_name),
            package_name: package.package_name,
            name: package.label,
        })
        .collect();

    apps.sort_by(|a, b| a.name.cmp(&b.name));
    apps
}
