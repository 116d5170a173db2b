use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::BridgeError;

/// A call as it arrives over the channel: a method name and an argument map.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodCall {
    pub method: String,
    #[serde(default)]
    pub arguments: Value,
}

impl MethodCall {
    pub fn new(method: impl Into<String>, arguments: Value) -> Self {
        Self {
            method: method.into(),
            arguments,
        }
    }
}

/// Every method the bridge understands, with its arguments already validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeRequest {
    StartFocusSession {
        session_id: String,
        blocked_apps: Vec<String>,
        block_notifications: bool,
    },
    StopFocusSession,
    GetInstalledApps,
    IsAccessibilityServiceEnabled,
    OpenAccessibilitySettings,
    HasUsageStatsPermission,
    RequestUsageStatsPermission,
    GetAppIcon {
        package_name: String,
    },
    IsAppBlocked {
        package_name: String,
    },
    GetActiveSessionId,
    UpdateBlockedApps {
        blocked_apps: Vec<String>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartArgs {
    session_id: String,
    blocked_apps: Vec<String>,
    #[serde(default)]
    block_notifications: Option<bool>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageArgs {
    package_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct BlockedAppsArgs {
    blocked_apps: Vec<String>,
}

impl TryFrom<MethodCall> for BridgeRequest {
    type Error = BridgeError;

    fn try_from(call: MethodCall) -> Result<Self, Self::Error> {
        let request = match call.method.as_str() {
            "startFocusSession" => {
                let args: StartArgs = decode_args(call.arguments, "Missing required arguments")?;
                Self::StartFocusSession {
                    session_id: args.session_id,
                    blocked_apps: args.blocked_apps,
                    block_notifications: args.block_notifications.unwrap_or(false),
                }
            }
            "stopFocusSession" => Self::StopFocusSession,
            "getInstalledApps" => Self::GetInstalledApps,
            "isAccessibilityServiceEnabled" => Self::IsAccessibilityServiceEnabled,
            "openAccessibilitySettings" => Self::OpenAccessibilitySettings,
            "hasUsageStatsPermission" => Self::HasUsageStatsPermission,
            "requestUsageStatsPermission" => Self::RequestUsageStatsPermission,
            "getAppIcon" => {
                let args: PackageArgs = decode_args(call.arguments, "Package name required")?;
                Self::GetAppIcon {
                    package_name: args.package_name,
                }
            }
            "isAppBlocked" => {
                let args: PackageArgs = decode_args(call.arguments, "Package name required")?;
                Self::IsAppBlocked {
                    package_name: args.package_name,
                }
            }
            "getActiveSessionId" => Self::GetActiveSessionId,
            "updateBlockedApps" => {
                let args: BlockedAppsArgs =
                    decode_args(call.arguments, "Blocked apps list required")?;
                Self::UpdateBlockedApps {
                    blocked_apps: args.blocked_apps,
                }
            }
            _ => return Err(BridgeError::NotImplemented(call.method)),
        };

        Ok(request)
    }
}

impl BridgeRequest {
    pub fn method(&self) -> &'static str {
        match self {
            Self::StartFocusSession { .. } => "startFocusSession",
            Self::StopFocusSession => "stopFocusSession",
            Self::GetInstalledApps => "getInstalledApps",
            Self::IsAccessibilityServiceEnabled => "isAccessibilityServiceEnabled",
            Self::OpenAccessibilitySettings => "openAccessibilitySettings",
            Self::HasUsageStatsPermission => "hasUsageStatsPermission",
            Self::RequestUsageStatsPermission => "requestUsageStatsPermission",
            Self::GetAppIcon { .. } => "getAppIcon",
            Self::IsAppBlocked { .. } => "isAppBlocked",
            Self::GetActiveSessionId => "getActiveSessionId",
            Self::UpdateBlockedApps { .. } => "updateBlockedApps",
        }
    }
}

fn decode_args<T: DeserializeOwned>(
    arguments: Value,
    message: &'static str,
) -> Result<T, BridgeError> {
    let arguments = match arguments {
        Value::Null => Value::Object(Map::new()),
        other => other,
    };
    serde_json::from_value(arguments).map_err(|err| {
        log::debug!("Rejecting bridge arguments: {}", err);
        BridgeError::invalid_args(message)
    })
}
