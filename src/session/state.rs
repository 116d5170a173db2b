use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct FocusSession {
    pub session_id: Option<String>,
    /// Replaced wholesale on every start/update so snapshots can share it.
    pub blocked_apps: Arc<HashSet<String>>,
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    /// Bumped on every stop; the monitor drops its debounce record when it changes.
    pub stop_epoch: u64,
}

impl Default for FocusSession {
    fn default() -> Self {
        Self {
            session_id: None,
            blocked_apps: Arc::new(HashSet::new()),
            active: false,
            started_at: None,
            stop_epoch: 0,
        }
    }
}

/// Consistent view of the session taken under one lock acquisition.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub session_id: Option<String>,
    pub blocked_apps: Arc<HashSet<String>>,
    pub active: bool,
    pub started_at: Option<DateTime<Utc>>,
    pub stop_epoch: u64,
}

impl SessionSnapshot {
    /// Nothing can be blocked: no session, or a session with an empty list.
    pub fn is_idle(&self) -> bool {
        !self.active || self.blocked_apps.is_empty()
    }

    pub fn blocks(&self, package_name: &str) -> bool {
        self.blocked_apps.contains(package_name)
    }
}

impl FocusSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, session_id: String, apps: HashSet<String>, start_at: DateTime<Utc>) {
        self.session_id = Some(session_id);
        self.blocked_apps = Arc::new(apps);
        self.active = true;
        self.started_at = Some(start_at);
    }

    pub fn replace_blocked(&mut self, apps: HashSet<String>) {
        self.blocked_apps = Arc::new(apps);
    }

    pub fn end(&mut self) {
        let stop_epoch = self.stop_epoch.wrapping_add(1);
        *self = Self {
            stop_epoch,
            ..Self::default()
        };
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            blocked_apps: Arc::clone(&self.blocked_apps),
            active: self.active,
            started_at: self.started_at,
            stop_epoch: self.stop_epoch,
        }
    }
}
