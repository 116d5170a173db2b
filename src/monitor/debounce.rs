use tokio::time::{Duration, Instant};

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Remembers the last app that triggered an overlay so a burst of window
/// events for it produces a single launch.
#[derive(Debug, Default)]
pub struct DebounceFilter {
    last_blocked: Option<(String, Instant)>,
    /// Session stop epoch the record belongs to.
    epoch: u64,
}

impl DebounceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records the trigger unless the same app fired less
    /// than [`DEBOUNCE_WINDOW`] ago within the same session epoch.
    pub fn admit(&mut self, package_name: &str, now: Instant, epoch: u64) -> bool {
        if epoch != self.epoch {
            self.reset();
            self.epoch = epoch;
        }

        if let Some((last_package, last_time)) = &self.last_blocked {
            let elapsed = now.saturating_duration_since(*last_time);
            if last_package == package_name && elapsed < DEBOUNCE_WINDOW {
                return false;
            }
        }

        self.last_blocked = Some((package_name.to_string(), now));
        true
    }

    pub fn reset(&mut self) {
        self.last_blocked = None;
    }

    pub fn last_blocked(&self) -> Option<&str> {
        self.last_blocked.as_ref().map(|(package, _)| package.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_same_app_inside_window_is_suppressed() {
        let t0 = Instant::now();
        let mut filter = DebounceFilter::new();
        assert!(filter.admit("com.a", t0, 0));
        assert!(!filter.admit("com.a", t0 + ms(300), 0));
        assert!(!filter.admit("com.a", t0 + ms(499), 0));
    }

    #[test]
    fn test_window_boundary_fires() {
        let t0 = Instant::now();
        let mut filter = DebounceFilter::new();
        assert!(filter.admit("com.a", t0, 0));
        assert!(filter.admit("com.a", t0 + ms(500), 0));
    }

    #[test]
    fn test_suppressed_trigger_does_not_extend_window() {
        let t0 = Instant::now();
        let mut filter = DebounceFilter::new();
        assert!(filter.admit("com.a", t0, 0));
        assert!(!filter.admit("com.a", t0 + ms(400), 0));
        assert!(filter.admit("com.a", t0 + ms(600), 0));
    }

    #[test]
    fn test_different_app_is_never_suppressed() {
        let t0 = Instant::now();
        let mut filter = DebounceFilter::new();
        assert!(filter.admit("com.a", t0, 0));
        assert!(filter.admit("com.b", t0 + ms(10), 0));
        assert!(filter.admit("com.a", t0 + ms(20), 0));
        assert_eq!(filter.last_blocked(), Some("com.a"));
    }

    #[test]
    fn test_new_epoch_forgets_last_app() {
        let t0 = Instant::now();
        let mut filter = DebounceFilter::new();
        assert!(filter.admit("com.a", t0, 0));
        assert!(filter.admit("com.a", t0 + ms(50), 1));
        assert!(!filter.admit("com.a", t0 + ms(100), 1));
    }

    #[test]
    fn test_reset() {
        let t0 = Instant::now();
        let mut filter = DebounceFilter::new();
        filter.admit("com.a", t0, 0);
        filter.reset();
        assert_eq!(filter.last_blocked(), None);
        assert!(filter.admit("com.a", t0 + ms(1), 0));
    }
}
