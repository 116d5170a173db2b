use super::{AppOpsMode, PermissionProbe, SettingsPage};

/// The blocking service counts as enabled only when the OS lists our exact
/// `<package>/<component>` pair.
pub fn is_accessibility_service_enabled<P>(probe: &P, host_package: &str, component: &str) -> bool
where
    P: PermissionProbe + ?Sized,
{
    let service = format!("{host_package}/{component}");
    probe
        .enabled_accessibility_services()
        .map(|enabled| enabled.contains(&service))
        .unwrap_or(false)
}

pub fn has_usage_stats_permission<P>(probe: &P, host_package: &str) -> bool
where
    P: PermissionProbe + ?Sized,
{
    match probe.usage_stats_mode(host_package) {
        Ok(mode) => mode == AppOpsMode::Allowed,
        Err(err) => {
            log::warn!("Usage stats permission check failed: {err:#}");
            false
        }
    }
}

pub fn open_accessibility_settings<P>(probe: &P)
where
    P: PermissionProbe + ?Sized,
{
    open_page(probe, &SettingsPage::Accessibility);
}

pub fn request_usage_stats_permission<P>(probe: &P, host_package: &str)
where
    P: PermissionProbe + ?Sized,
{
    open_page(
        probe,
        &SettingsPage::UsageAccess {
            data: format!("package:{host_package}"),
        },
    );
}

fn open_page<P>(probe: &P, page: &SettingsPage)
where
    P: PermissionProbe + ?Sized,
{
    if let Err(err) = probe.open_settings(page) {
        log::warn!("Failed to open settings page {:?}: {err:#}", page);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Probe {
        services: Option<String>,
        mode: Option<AppOpsMode>,
        opened: Mutex<Vec<SettingsPage>>,
        fail_open: bool,
    }

    impl PermissionProbe for Probe {
        fn enabled_accessibility_services(&self) -> Option<String> {
            self.services.clone()
        }

        fn usage_stats_mode(&self, _package_name: &str) -> Result<AppOpsMode> {
            match self.mode {
                Some(mode) => Ok(mode),
                None => bail!("app ops unavailable"),
            }
        }

        fn open_settings(&self, page: &SettingsPage) -> Result<()> {
            if self.fail_open {
                bail!("no activity to handle {page:?}");
            }
            self.opened.lock().unwrap().push(page.clone());
            Ok(())
        }
    }

    const COMPONENT: &str = "com.stayhard.services.AppBlockingService";

    #[test]
    fn test_accessibility_requires_exact_pair() {
        let probe = Probe {
            services: Some(format!("com.other/x:com.stayhard/{COMPONENT}")),
            ..Default::default()
        };
        assert!(is_accessibility_service_enabled(&probe, "com.stayhard", COMPONENT));
        assert!(!is_accessibility_service_enabled(&probe, "com.other", COMPONENT));
    }

    #[test]
    fn test_accessibility_missing_setting_is_false() {
        let probe = Probe::default();
        assert!(!is_accessibility_service_enabled(&probe, "com.stayhard", COMPONENT));
    }

    #[test]
    fn test_usage_stats_only_allowed_counts() {
        for (mode, expected) in [
            (Some(AppOpsMode::Allowed), true),
            (Some(AppOpsMode::Default), false),
            (Some(AppOpsMode::Ignored), false),
            (None, false),
        ] {
            let probe = Probe {
                mode,
                ..Default::default()
            };
            assert_eq!(has_usage_stats_permission(&probe, "com.stayhard"), expected);
        }
    }

    #[test]
    fn test_usage_request_targets_host_package() {
        let probe = Probe::default();
        request_usage_stats_permission(&probe, "com.stayhard");
        open_accessibility_settings(&probe);

        let opened = probe.opened.lock().unwrap();
        assert_eq!(
            *opened,
            vec![
                SettingsPage::UsageAccess {
                    data: "package:com.stayhard".into()
                },
                SettingsPage::Accessibility,
            ]
        );
    }

    #[test]
    fn test_open_failure_is_swallowed() {
        let probe = Probe {
            fail_open: true,
            ..Default::default()
        };
        open_accessibility_settings(&probe);
        assert!(probe.opened.lock().unwrap().is_empty());
    }
}
