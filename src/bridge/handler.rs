use std::sync::Arc;

use log::{info, warn};
use serde_json::{json, Value};

use crate::platform::{self, InstalledApp, Platform};
use crate::session::SessionController;

use super::request::{BridgeRequest, MethodCall};
use super::BridgeReply;

/// Who we are as far as the OS is concerned.
#[derive(Debug, Clone)]
pub struct HostIdentity {
    pub host_package: String,
    /// Class name the blocking service is registered under.
    pub service_component: String,
}

/// Serves bridge calls against the shared session and the host platform.
#[derive(Clone)]
pub struct BridgeHandler {
    sessions: SessionController,
    platform: Arc<dyn Platform>,
    identity: HostIdentity,
}

impl BridgeHandler {
    pub fn new(
        sessions: SessionController,
        platform: Arc<dyn Platform>,
        identity: HostIdentity,
    ) -> Self {
        Self {
            sessions,
            platform,
            identity,
        }
    }

    pub async fn handle(&self, call: MethodCall) -> BridgeReply {
        match BridgeRequest::try_from(call) {
            Ok(request) => BridgeReply::Success {
                result: self.dispatch(request).await,
            },
            Err(err) => {
                warn!("Bridge call rejected: {}", err);
                BridgeReply::from(err)
            }
        }
    }

    pub async fn dispatch(&self, request: BridgeRequest) -> Value {
        log::debug!("Bridge call: {}", request.method());

        match request {
            BridgeRequest::StartFocusSession {
                session_id,
                blocked_apps,
                block_notifications,
            } => {
                if block_notifications {
                    info!(
                        "Notification blocking requested for {}; not supported, ignoring",
                        session_id
                    );
                }
                self.sessions.start_session(session_id, blocked_apps).await;
                json!(true)
            }
            BridgeRequest::StopFocusSession => {
                self.sessions.stop_session().await;
                json!(true)
            }
            BridgeRequest::GetInstalledApps => json!(self.installed_apps().await),
            BridgeRequest::IsAccessibilityServiceEnabled => {
                json!(platform::is_accessibility_service_enabled(
                    self.platform.as_ref(),
                    &self.identity.host_package,
                    &self.identity.service_component,
                ))
            }
            BridgeRequest::OpenAccessibilitySettings => {
                platform::open_accessibility_settings(self.platform.as_ref());
                Value::Null
            }
            BridgeRequest::HasUsageStatsPermission => {
                json!(platform::has_usage_stats_permission(
                    self.platform.as_ref(),
                    &self.identity.host_package,
                ))
            }
            BridgeRequest::RequestUsageStatsPermission => {
                platform::request_usage_stats_permission(
                    self.platform.as_ref(),
                    &self.identity.host_package,
                );
                Value::Null
            }
            BridgeRequest::GetAppIcon { package_name } => json!(self.app_icon(package_name).await),
            BridgeRequest::IsAppBlocked { package_name } => {
                json!(self.sessions.is_blocked(&package_name).await)
            }
            BridgeRequest::GetActiveSessionId => json!(self.sessions.session_id().await),
            BridgeRequest::UpdateBlockedApps { blocked_apps } => {
                self.sessions.update_blocked_apps(blocked_apps).await;
                json!(true)
            }
        }
    }

    /// Icon decoding is CPU bound, keep it off the async workers.
    async fn installed_apps(&self) -> Vec<InstalledApp> {
        let host = Arc::clone(&self.platform);
        tokio::task::spawn_blocking(move || platform::installed_apps(host.as_ref()))
            .await
            .unwrap_or_else(|err| {
                warn!("installed apps worker join failed: {err}");
                Vec::new()
            })
    }

    async fn app_icon(&self, package_name: String) -> String {
        let host = Arc::clone(&self.platform);
        tokio::task::spawn_blocking(move || platform::icon_base64(host.as_ref(), &package_name))
            .await
            .unwrap_or_else(|err| {
                warn!("icon worker join failed: {err}");
                String::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::INVALID_ARGS;
    use crate::platform::{AppCatalog, AppOpsMode, InstalledPackage, PermissionProbe, SettingsPage};
    use anyhow::{bail, Result};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakePlatform {
        opened: Mutex<Vec<SettingsPage>>,
    }

    impl AppCatalog for FakePlatform {
        fn installed_packages(&self) -> Result<Vec<InstalledPackage>> {
            Ok(vec![
                InstalledPackage {
                    package_name: "com.b".into(),
                    label: "Bravo".into(),
                    launchable: true,
                },
                InstalledPackage {
                    package_name: "com.a".into(),
                    label: "Alpha".into(),
                    launchable: true,
                },
            ])
        }

        fn app_label(&self, package_name: &str) -> Option<String> {
            (package_name == "com.a").then(|| "Alpha".to_string())
        }

        fn app_icon(&self, package_name: &str) -> Result<DynamicImage> {
            if package_name == "com.a" {
                Ok(DynamicImage::ImageRgba8(RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]))))
            } else {
                bail!("not installed")
            }
        }
    }

    impl PermissionProbe for FakePlatform {
        fn enabled_accessibility_services(&self) -> Option<String> {
            Some("com.stayhard/com.stayhard.Blocker".into())
        }

        fn usage_stats_mode(&self, _package_name: &str) -> Result<AppOpsMode> {
            Ok(AppOpsMode::Ignored)
        }

        fn open_settings(&self, page: &SettingsPage) -> Result<()> {
            self.opened.lock().unwrap().push(page.clone());
            Ok(())
        }
    }

    fn handler() -> (BridgeHandler, Arc<FakePlatform>) {
        let platform = Arc::new(FakePlatform::default());
        let handler = BridgeHandler::new(
            SessionController::new(),
            platform.clone(),
            HostIdentity {
                host_package: "com.stayhard".into(),
                service_component: "com.stayhard.Blocker".into(),
            },
        );
        (handler, platform)
    }

    async fn call(handler: &BridgeHandler, method: &str, arguments: Value) -> BridgeReply {
        handler.handle(MethodCall::new(method, arguments)).await
    }

    fn success(result: Value) -> BridgeReply {
        BridgeReply::Success { result }
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let (handler, _) = handler();

        assert_eq!(
            call(&handler, "getActiveSessionId", Value::Null).await,
            success(Value::Null)
        );
        assert_eq!(
            call(
                &handler,
                "startFocusSession",
                json!({"sessionId": "s1", "blockedApps": ["com.a"]})
            )
            .await,
            success(json!(true))
        );
        assert_eq!(
            call(&handler, "getActiveSessionId", Value::Null).await,
            success(json!("s1"))
        );
        assert_eq!(
            call(&handler, "isAppBlocked", json!({"packageName": "com.a"})).await,
            success(json!(true))
        );

        call(&handler, "updateBlockedApps", json!({"blockedApps": ["com.c"]})).await;
        assert_eq!(
            call(&handler, "isAppBlocked", json!({"packageName": "com.a"})).await,
            success(json!(false))
        );

        assert_eq!(
            call(&handler, "stopFocusSession", Value::Null).await,
            success(json!(true))
        );
        assert_eq!(
            call(&handler, "isAppBlocked", json!({"packageName": "com.c"})).await,
            success(json!(false))
        );
    }

    #[tokio::test]
    async fn test_invalid_args_reply() {
        let (handler, _) = handler();
        let reply = call(&handler, "startFocusSession", json!({"sessionId": "s1"})).await;
        assert_eq!(
            reply,
            BridgeReply::Error {
                code: INVALID_ARGS,
                message: "Missing required arguments".into()
            }
        );
    }

    #[tokio::test]
    async fn test_unknown_method_reply() {
        let (handler, _) = handler();
        assert_eq!(
            call(&handler, "frobnicate", Value::Null).await,
            BridgeReply::NotImplemented
        );
    }

    #[tokio::test]
    async fn test_installed_apps_sorted_with_icons() {
        let (handler, _) = handler();
        let BridgeReply::Success { result } = call(&handler, "getInstalledApps", Value::Null).await
        else {
            panic!("expected success");
        };

        let apps = result.as_array().unwrap();
        assert_eq!(apps[0]["name"], "Alpha");
        assert_eq!(apps[1]["name"], "Bravo");
        assert!(!apps[0]["icon"].as_str().unwrap().is_empty());
        assert_eq!(apps[1]["icon"], "");
    }

    #[tokio::test]
    async fn test_app_icon_failure_is_empty_string() {
        let (handler, _) = handler();
        assert_eq!(
            call(&handler, "getAppIcon", json!({"packageName": "com.nope"})).await,
            success(json!(""))
        );
    }

    #[tokio::test]
    async fn test_permission_queries() {
        let (handler, platform) = handler();
        assert_eq!(
            call(&handler, "isAccessibilityServiceEnabled", Value::Null).await,
            success(json!(true))
        );
        assert_eq!(
            call(&handler, "hasUsageStatsPermission", Value::Null).await,
            success(json!(false))
        );
        assert_eq!(
            call(&handler, "requestUsageStatsPermission", Value::Null).await,
            success(Value::Null)
        );
        assert_eq!(
            call(&handler, "openAccessibilitySettings", Value::Null).await,
            success(Value::Null)
        );
        assert_eq!(platform.opened.lock().unwrap().len(), 2);
    }
}
