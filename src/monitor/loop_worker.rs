use std::sync::Arc;

use log::{debug, error, info};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::overlay::{OverlayLauncher, OverlayRequest};
use crate::session::{SessionController, SessionSnapshot};

use super::debounce::DebounceFilter;
use super::event::{ForegroundEvent, WindowEventKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    OtherEventType,
    NoPackage,
    Idle,
    OwnPackage,
    NotBlocked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Ignored(IgnoreReason),
    Debounced,
    Block(OverlayRequest),
}

/// Per-event blocking decision. Holds nothing but the host identity and the
/// debounce record; all session data comes from the snapshot.
#[derive(Debug)]
pub struct BlockingMonitor {
    host_package: String,
    verbose: bool,
    debounce: DebounceFilter,
}

impl BlockingMonitor {
    pub fn new(host_package: impl Into<String>) -> Self {
        Self {
            host_package: host_package.into(),
            verbose: false,
            debounce: DebounceFilter::new(),
        }
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn evaluate(&mut self, event: &ForegroundEvent, session: &SessionSnapshot) -> Verdict {
        if event.kind != WindowEventKind::WindowStateChanged {
            return Verdict::Ignored(IgnoreReason::OtherEventType);
        }

        let Some(package_name) = event.package_name.as_deref() else {
            return Verdict::Ignored(IgnoreReason::NoPackage);
        };

        if self.verbose && session.active {
            info!("Window changed to: {}", package_name);
        }

        if session.is_idle() {
            return Verdict::Ignored(IgnoreReason::Idle);
        }

        // Never cover our own UI or the overlay itself.
        if package_name == self.host_package {
            return Verdict::Ignored(IgnoreReason::OwnPackage);
        }

        if !session.blocks(package_name) {
            return Verdict::Ignored(IgnoreReason::NotBlocked);
        }

        if !self
            .debounce
            .admit(package_name, event.observed_at, session.stop_epoch)
        {
            debug!("Debounced block for: {}", package_name);
            return Verdict::Debounced;
        }

        info!("Blocking app: {}", package_name);
        Verdict::Block(OverlayRequest::new(
            package_name.to_string(),
            session.session_id.clone(),
        ))
    }
}

pub async fn monitor_loop(
    mut events: mpsc::Receiver<ForegroundEvent>,
    sessions: SessionController,
    launcher: Arc<dyn OverlayLauncher>,
    mut monitor: BlockingMonitor,
    cancel_token: CancellationToken,
) {
    loop {
        tokio::select! {
            maybe_event = events.recv() => {
                let Some(event) = maybe_event else {
                    info!("foreground event source closed");
                    break;
                };

                let snapshot = sessions.snapshot().await;
                if let Verdict::Block(request) = monitor.evaluate(&event, &snapshot) {
                    show_blocking_overlay(launcher.as_ref(), &request);
                }
            }
            _ = cancel_token.cancelled() => {
                info!("foreground monitor shutting down");
                break;
            }
        }
    }
}

/// Fire and forget: a failed launch only means the blocked app stays visible
/// until the next window event.
fn show_blocking_overlay(launcher: &dyn OverlayLauncher, request: &OverlayRequest) {
    debug!("Launching blocking overlay for: {}", request.blocked_package);
    match launcher.launch(request) {
        Ok(()) => debug!("Blocking overlay launched for {}", request.blocked_package),
        Err(err) => error!(
            "Error launching blocking overlay for {}: {err:#}",
            request.blocked_package
        ),
    }
}
