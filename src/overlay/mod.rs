pub mod screen;

use anyhow::Result;
use bitflags::{bitflags, Flags};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

pub use screen::{BlockingScreen, OverlayAction, ReturnIntent, ScreenExit};

bitflags! {
    /// How the overlay task is started.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct LaunchFlags: u32 {
        const NEW_TASK = 1 << 0;
        const CLEAR_TASK = 1 << 1;
        const NO_HISTORY = 1 << 2;
        const CLEAR_TOP = 1 << 3;
    }
}

bitflags! {
    /// How the overlay window behaves once shown.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WindowFlags: u32 {
        const SHOW_WHEN_LOCKED = 1 << 0;
        const DISMISS_KEYGUARD = 1 << 1;
        const KEEP_SCREEN_ON = 1 << 2;
        const TURN_SCREEN_ON = 1 << 3;
    }
}

impl LaunchFlags {
    /// A fresh overlay replaces whatever overlay task exists and leaves no back stack.
    pub const OVERLAY: Self = Self::NEW_TASK
        .union(Self::CLEAR_TASK)
        .union(Self::NO_HISTORY);
    /// Returning to the session screen reuses the existing host task.
    pub const RETURN_TO_SESSION: Self = Self::NEW_TASK.union(Self::CLEAR_TOP);
}

impl WindowFlags {
    pub const OVERLAY: Self = Self::SHOW_WHEN_LOCKED
        .union(Self::DISMISS_KEYGUARD)
        .union(Self::KEEP_SCREEN_ON)
        .union(Self::TURN_SCREEN_ON);
}

/// One request to cover a blocked app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayRequest {
    pub id: Uuid,
    pub blocked_package: String,
    pub session_id: Option<String>,
    pub requested_at: DateTime<Utc>,
    pub launch_flags: LaunchFlags,
    pub window_flags: WindowFlags,
}

impl OverlayRequest {
    pub fn new(blocked_package: String, session_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            blocked_package,
            session_id,
            requested_at: Utc::now(),
            launch_flags: LaunchFlags::OVERLAY,
            window_flags: WindowFlags::OVERLAY,
        }
    }
}

/// Presents the blocking overlay. Called from the monitor loop; errors are
/// logged there and never retried.
pub trait OverlayLauncher: Send + Sync {
    fn launch(&self, request: &OverlayRequest) -> Result<()>;
}

/// Flag names in declaration order, for wire payloads.
fn flag_names<F: Flags>(flags: F) -> Vec<&'static str> {
    flags.iter_names().map(|(name, _)| name).collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayFlagsPayload {
    pub launch: Vec<&'static str>,
    pub window: Vec<&'static str>,
}

impl From<&OverlayRequest> for OverlayFlagsPayload {
    fn from(request: &OverlayRequest) -> Self {
        Self {
            launch: flag_names(request.launch_flags),
            window: flag_names(request.window_flags),
        }
    }
}
