use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::overlay::OverlayLauncher;
use crate::session::SessionController;

use super::event::ForegroundEvent;
use super::loop_worker::{monitor_loop, BlockingMonitor};

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Identifier of the app hosting the monitor; never blocked.
    pub host_package: String,
    /// Capacity of the event channel between the OS callback and the loop.
    pub event_buffer: usize,
    /// Log every window change while a session is active.
    pub verbose: bool,
}

/// Producer side of the foreground event channel, handed to the OS callback.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::Sender<ForegroundEvent>,
}

impl EventSender {
    pub async fn deliver(&self, event: ForegroundEvent) -> Result<()> {
        self.tx
            .send(event)
            .await
            .context("foreground monitor is not running")
    }

    /// For synchronous OS callbacks. A full channel drops the event; the next
    /// window change re-evaluates anyway.
    pub fn try_deliver(&self, event: ForegroundEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                warn!("foreground event dropped, monitor busy: {:?}", event.package_name);
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }
}

pub struct MonitorController {
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
}

impl Default for MonitorController {
    fn default() -> Self {
        Self::new()
    }
}

impl MonitorController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Subscribes to the event stream: spawns the single handler loop and
    /// returns the sender the OS source feeds.
    pub async fn start(
        &mut self,
        sessions: SessionController,
        launcher: Arc<dyn OverlayLauncher>,
        config: MonitorConfig,
    ) -> Result<EventSender> {
        if self.handle.is_some() {
            bail!("foreground monitor already running");
        }

        info!(
            "Starting foreground monitor for host {} (buffer {})",
            config.host_package, config.event_buffer
        );

        let (tx, rx) = mpsc::channel(config.event_buffer.max(1));
        let cancel_token = CancellationToken::new();
        let monitor = BlockingMonitor::new(config.host_package).verbose(config.verbose);

        let handle = tokio::spawn(monitor_loop(
            rx,
            sessions,
            launcher,
            monitor,
            cancel_token.clone(),
        ));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        Ok(EventSender { tx })
    }

    /// Waits for the loop to consume everything already queued. Only returns
    /// once every [`EventSender`] clone has been dropped.
    pub async fn drain(&mut self) -> Result<()> {
        self.cancel_token = None;
        match self.handle.take() {
            Some(handle) => handle
                .await
                .context("foreground monitor task failed to join"),
            None => Ok(()),
        }
    }

    /// Unsubscribes; pending events are discarded.
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle
                .await
                .context("foreground monitor task failed to join")
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::OverlayRequest;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        launched: Mutex<Vec<OverlayRequest>>,
    }

    impl OverlayLauncher for Recorder {
        fn launch(&self, request: &OverlayRequest) -> Result<()> {
            self.launched.lock().unwrap().push(request.clone());
            Ok(())
        }
    }

    fn config() -> MonitorConfig {
        MonitorConfig {
            host_package: "com.stayhard".into(),
            event_buffer: 8,
            verbose: false,
        }
    }

    #[tokio::test]
    async fn test_start_twice_fails() {
        let mut controller = MonitorController::new();
        let recorder = Arc::new(Recorder::default());
        controller
            .start(SessionController::new(), recorder.clone(), config())
            .await
            .unwrap();
        assert!(controller.is_running());
        assert!(controller
            .start(SessionController::new(), recorder, config())
            .await
            .is_err());
        controller.stop().await.unwrap();
        assert!(!controller.is_running());
    }

    #[tokio::test]
    async fn test_stop_closes_sender() {
        let mut controller = MonitorController::new();
        let sender = controller
            .start(SessionController::new(), Arc::new(Recorder::default()), config())
            .await
            .unwrap();
        controller.stop().await.unwrap();

        let result = sender
            .deliver(ForegroundEvent::window_state_changed("com.a"))
            .await;
        assert!(result.is_err());
        assert!(!sender.try_deliver(ForegroundEvent::window_state_changed("com.a")));
    }

    #[tokio::test]
    async fn test_drain_processes_queued_events() {
        let sessions = SessionController::new();
        sessions
            .start_session("s1".into(), vec!["com.a".to_string(), "com.b".to_string()])
            .await;

        let recorder = Arc::new(Recorder::default());
        let mut controller = MonitorController::new();
        let sender = controller
            .start(sessions, recorder.clone(), config())
            .await
            .unwrap();

        sender
            .deliver(ForegroundEvent::window_state_changed("com.a"))
            .await
            .unwrap();
        sender
            .deliver(ForegroundEvent::window_state_changed("com.b"))
            .await
            .unwrap();
        drop(sender);
        controller.drain().await.unwrap();

        let launched = recorder.launched.lock().unwrap();
        let packages: Vec<&str> = launched.iter().map(|r| r.blocked_package.as_str()).collect();
        assert_eq!(packages, vec!["com.a", "com.b"]);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_ok() {
        let mut controller = MonitorController::new();
        assert!(controller.stop().await.is_ok());
    }
}
