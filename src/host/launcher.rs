use std::sync::{Arc, Mutex, PoisonError};

use anyhow::Result;
use uuid::Uuid;

use crate::overlay::{
    BlockingScreen, OverlayAction, OverlayFlagsPayload, OverlayLauncher, OverlayRequest,
    ScreenExit,
};
use crate::platform::AppCatalog;

use super::output::{HostOutput, Outbound};

/// The overlay currently on screen, if any. A new overlay replaces the old one.
#[derive(Clone, Default)]
pub struct OverlaySlot {
    current: Arc<Mutex<Option<BlockingScreen>>>,
}

impl OverlaySlot {
    pub fn present(&self, screen: BlockingScreen) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(screen);
    }

    pub fn current_id(&self) -> Option<Uuid> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|screen| screen.overlay_id)
    }

    /// Applies a user action to the overlay with `overlay_id`. Actions for an
    /// overlay that has already been replaced or closed return `None`.
    pub fn act(&self, overlay_id: Uuid, action: OverlayAction) -> Option<ScreenExit> {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        match current.as_ref() {
            Some(screen) if screen.overlay_id == overlay_id => {
                let exit = screen.handle(action);
                *current = None;
                Some(exit)
            }
            _ => None,
        }
    }
}

/// Presents overlays by writing them to the embedder.
pub struct StdioOverlayLauncher<C: ?Sized> {
    catalog: Arc<C>,
    output: HostOutput,
    slot: OverlaySlot,
}

impl<C: AppCatalog + ?Sized> StdioOverlayLauncher<C> {
    pub fn new(catalog: Arc<C>, output: HostOutput, slot: OverlaySlot) -> Self {
        Self {
            catalog,
            output,
            slot,
        }
    }
}

impl<C: AppCatalog + ?Sized> OverlayLauncher for StdioOverlayLauncher<C> {
    fn launch(&self, request: &OverlayRequest) -> Result<()> {
        let label = self.catalog.app_label(&request.blocked_package);
        let screen = BlockingScreen::new(request, label);

        self.output.emit(&Outbound::Overlay {
            screen: screen.clone(),
            flags: OverlayFlagsPayload::from(request),
            requested_at: request.requested_at,
        })?;
        self.slot.present(screen);
        Ok(())
    }
}
