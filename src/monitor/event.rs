use serde::Deserialize;
use tokio::time::Instant;

/// Window event types the OS can deliver. Only state changes mean a new
/// app came to the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WindowEventKind {
    WindowStateChanged,
    WindowContentChanged,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundEvent {
    pub kind: WindowEventKind,
    pub package_name: Option<String>,
    pub observed_at: Instant,
}

impl ForegroundEvent {
    pub fn new(kind: WindowEventKind, package_name: Option<String>) -> Self {
        Self {
            kind,
            package_name,
            observed_at: Instant::now(),
        }
    }

    pub fn window_state_changed(package_name: impl Into<String>) -> Self {
        Self::new(WindowEventKind::WindowStateChanged, Some(package_name.into()))
    }

    pub fn at(mut self, observed_at: Instant) -> Self {
        self.observed_at = observed_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_kinds_decode_as_other() {
        let kind: WindowEventKind = serde_json::from_str("\"viewClicked\"").unwrap();
        assert_eq!(kind, WindowEventKind::Other);

        let kind: WindowEventKind = serde_json::from_str("\"windowStateChanged\"").unwrap();
        assert_eq!(kind, WindowEventKind::WindowStateChanged);
    }
}
