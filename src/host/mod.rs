//! Line-delimited JSON host. An embedding process writes method calls,
//! window events and overlay actions on stdin, one JSON object per line, and
//! reads replies, overlays and navigation requests from stdout.

pub mod launcher;
pub mod output;
pub mod platform;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Deserialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use uuid::Uuid;

use crate::bridge::{BridgeHandler, MethodCall};
use crate::monitor::{EventSender, ForegroundEvent, WindowEventKind};
use crate::overlay::{OverlayAction, ScreenExit};
use crate::settings::SettingsStore;

pub use launcher::{OverlaySlot, StdioOverlayLauncher};
pub use output::{HostOutput, Outbound};
pub use platform::HeadlessPlatform;

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum Inbound {
    Call {
        id: Value,
        method: String,
        #[serde(default)]
        arguments: Value,
    },
    #[serde(rename_all = "camelCase")]
    Window {
        event_type: WindowEventKind,
        #[serde(default)]
        package_name: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    OverlayAction {
        overlay_id: Uuid,
        action: OverlayAction,
    },
    ReloadSettings,
}

pub struct StdioHost {
    bridge: BridgeHandler,
    events: EventSender,
    overlays: OverlaySlot,
    settings: Arc<SettingsStore>,
    output: HostOutput,
}

impl StdioHost {
    pub fn new(
        bridge: BridgeHandler,
        events: EventSender,
        overlays: OverlaySlot,
        settings: Arc<SettingsStore>,
        output: HostOutput,
    ) -> Self {
        Self {
            bridge,
            events,
            overlays,
            settings,
            output,
        }
    }

    /// Serves until the input reaches EOF. Consumes the host so the event
    /// sender is dropped on return and the monitor can drain.
    pub async fn serve<R>(self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await.context("failed to read host input")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            self.handle_line(line).await?;
        }

        info!("host input closed");
        Ok(())
    }

    async fn handle_line(&self, line: &str) -> Result<()> {
        let message: Inbound = match serde_json::from_str(line) {
            Ok(message) => message,
            Err(err) => {
                warn!("Unreadable host message: {}", err);
                return self.output.emit(&Outbound::Error {
                    message: format!("unreadable message: {err}"),
                });
            }
        };

        match message {
            Inbound::Call {
                id,
                method,
                arguments,
            } => {
                let reply = self.bridge.handle(MethodCall::new(method, arguments)).await;
                self.output.emit(&Outbound::Reply { id, reply })
            }
            Inbound::Window {
                event_type,
                package_name,
            } => {
                let event = ForegroundEvent::new(event_type, package_name);
                if let Err(err) = self.events.deliver(event).await {
                    warn!("Window event dropped: {err:#}");
                    return self.output.emit(&Outbound::Error {
                        message: format!("window event dropped: {err}"),
                    });
                }
                Ok(())
            }
            Inbound::OverlayAction { overlay_id, action } => {
                match self.overlays.act(overlay_id, action) {
                    Some(ScreenExit::ReturnToSession(intent)) => {
                        self.output.emit(&Outbound::Navigate { intent })?;
                        self.output.emit(&Outbound::OverlayClosed { overlay_id })
                    }
                    Some(ScreenExit::Dismissed) => {
                        self.output.emit(&Outbound::OverlayClosed { overlay_id })
                    }
                    None => {
                        log::debug!("Action for stale overlay {} ignored", overlay_id);
                        Ok(())
                    }
                }
            }
            Inbound::ReloadSettings => {
                if let Err(err) = self.settings.reload() {
                    warn!("Settings reload failed: {err:#}");
                    return self.output.emit(&Outbound::Error {
                        message: format!("settings reload failed: {err}"),
                    });
                }
                info!("Settings reloaded from {}", self.settings.path().display());
                Ok(())
            }
        }
    }
}
