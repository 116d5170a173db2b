use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{LaunchFlags, OverlayRequest};

const PLACEHOLDER_NAME: &str = "This app";

/// What the user did on the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayAction {
    BackToFocus,
    EndSession,
    /// System back gesture.
    Back,
    /// Home or recents; the overlay goes away without touching the session.
    UserLeaveHint,
}

/// Where control goes after the overlay closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenExit {
    ReturnToSession(ReturnIntent),
    Dismissed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnIntent {
    pub navigate_to: &'static str,
    pub session_id: Option<String>,
    #[serde(skip)]
    pub flags: LaunchFlags,
}

/// Content and behaviour of one blocking overlay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingScreen {
    pub overlay_id: Uuid,
    pub blocked_package: String,
    pub session_id: Option<String>,
    pub app_name: String,
    pub message: String,
}

impl BlockingScreen {
    /// `label` is the display name the OS knows for the package, if any.
    pub fn new(request: &OverlayRequest, label: Option<String>) -> Self {
        let (app_name, message) = match label {
            Some(label) => {
                let message = format!("\"{label}\" is blocked during your focus session");
                (label, message)
            }
            None => (
                PLACEHOLDER_NAME.to_string(),
                format!("{PLACEHOLDER_NAME} is blocked during your focus session"),
            ),
        };

        Self {
            overlay_id: request.id,
            blocked_package: request.blocked_package.clone(),
            session_id: request.session_id.clone(),
            app_name,
            message,
        }
    }

    /// Back is redirected, never honoured. Both buttons currently do the same thing.
    pub fn handle(&self, action: OverlayAction) -> ScreenExit {
        match action {
            OverlayAction::BackToFocus | OverlayAction::EndSession | OverlayAction::Back => {
                ScreenExit::ReturnToSession(ReturnIntent {
                    navigate_to: "focus",
                    session_id: self.session_id.clone(),
                    flags: LaunchFlags::RETURN_TO_SESSION,
                })
            }
            OverlayAction::UserLeaveHint => ScreenExit::Dismissed,
        }
    }
}
