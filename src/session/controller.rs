use std::{collections::HashSet, sync::Arc};

use chrono::Utc;
use log::{debug, info};
use tokio::sync::Mutex;

use super::{FocusSession, SessionSnapshot};

/// Shared handle to the single focus session. Cloned into the bridge handler
/// and the monitor loop; every operation takes the lock exactly once.
#[derive(Clone, Default)]
pub struct SessionController {
    state: Arc<Mutex<FocusSession>>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a session, silently replacing any session already running.
    pub async fn start_session<I>(&self, session_id: String, apps: I)
    where
        I: IntoIterator<Item = String>,
    {
        let apps: HashSet<String> = apps.into_iter().collect();
        info!(
            "Starting session: {} with {} blocked apps",
            session_id,
            apps.len()
        );
        for app in &apps {
            debug!("Blocking app: {}", app);
        }

        let mut state = self.state.lock().await;
        if state.active {
            info!("Replacing active session {:?}", state.session_id);
        }
        state.begin(session_id, apps, Utc::now());
    }

    pub async fn stop_session(&self) {
        let mut state = self.state.lock().await;
        info!("Stopping session: {:?}", state.session_id);
        state.end();
    }

    pub async fn update_blocked_apps<I>(&self, apps: I)
    where
        I: IntoIterator<Item = String>,
    {
        let apps: HashSet<String> = apps.into_iter().collect();
        info!("Updating blocked apps: {} apps", apps.len());
        for app in &apps {
            debug!("Updated blocking app: {}", app);
        }

        self.state.lock().await.replace_blocked(apps);
    }

    pub async fn is_active(&self) -> bool {
        self.state.lock().await.active
    }

    pub async fn session_id(&self) -> Option<String> {
        self.state.lock().await.session_id.clone()
    }

    /// Owned copy of the blocked set; later updates never show through it.
    pub async fn blocked_apps(&self) -> HashSet<String> {
        self.state.lock().await.blocked_apps.as_ref().clone()
    }

    pub async fn is_blocked(&self, package_name: &str) -> bool {
        self.state.lock().await.blocked_apps.contains(package_name)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }
}
