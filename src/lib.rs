pub mod bridge;
pub mod host;
pub mod monitor;
pub mod overlay;
pub mod platform;
pub mod session;
pub mod settings;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;

use bridge::{BridgeHandler, HostIdentity};
use host::{HeadlessPlatform, HostOutput, OverlaySlot, StdioHost, StdioOverlayLauncher};
use monitor::{EventSender, MonitorConfig, MonitorController};
use session::SessionController;
use settings::SettingsStore;

/// Everything one host process owns: the session shared by the bridge and the
/// monitor, and the monitor task itself.
pub struct AppState {
    pub sessions: SessionController,
    pub bridge: BridgeHandler,
    pub settings: Arc<SettingsStore>,
    pub overlays: OverlaySlot,
    pub output: HostOutput,
    monitor: MonitorController,
    events: EventSender,
}

impl AppState {
    pub async fn start(settings: Arc<SettingsStore>, output: HostOutput) -> Result<Self> {
        let current = settings.current();
        let sessions = SessionController::new();
        let overlays = OverlaySlot::default();

        let platform = Arc::new(HeadlessPlatform::new(settings.clone(), output.clone()));
        let launcher = Arc::new(StdioOverlayLauncher::new(
            platform.clone(),
            output.clone(),
            overlays.clone(),
        ));

        let mut monitor = MonitorController::new();
        let events = monitor
            .start(
                sessions.clone(),
                launcher,
                MonitorConfig {
                    host_package: current.host_package.clone(),
                    event_buffer: current.event_buffer,
                    verbose: current.verbose_events || settings::debug_mode(),
                },
            )
            .await?;

        let bridge = BridgeHandler::new(
            sessions.clone(),
            platform,
            HostIdentity {
                host_package: current.host_package,
                service_component: current.service_component,
            },
        );

        Ok(Self {
            sessions,
            bridge,
            settings,
            overlays,
            output,
            monitor,
            events,
        })
    }

    /// Sender for foreground events; the monitor keeps running while any
    /// clone is alive.
    pub fn events(&self) -> EventSender {
        self.events.clone()
    }

    /// Builds the stdio host, handing it the last event sender.
    pub fn into_host(self) -> (StdioHost, MonitorController) {
        let host = StdioHost::new(
            self.bridge,
            self.events,
            self.overlays,
            self.settings,
            self.output,
        );
        (host, self.monitor)
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.monitor.stop().await
    }
}

pub fn run() -> Result<()> {
    // Info by default; RUST_LOG overrides.
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    log::info!("StayHard starting up...");

    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    runtime.block_on(async {
        let settings_path = settings::settings_path();
        let settings = Arc::new(SettingsStore::new(settings_path)?);
        log::info!("Using settings from {}", settings.path().display());

        let (output, writer) = HostOutput::stdout();
        let state = AppState::start(settings, output).await?;
        let (host, mut monitor) = state.into_host();

        host.serve(BufReader::new(tokio::io::stdin())).await?;

        // Input is closed and the host dropped its sender: let queued events finish.
        monitor.drain().await?;
        writer.await.context("host output task failed to join")
    })
}
