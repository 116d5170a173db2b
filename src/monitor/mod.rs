pub mod controller;
pub mod debounce;
pub mod event;
pub mod loop_worker;

pub use controller::{EventSender, MonitorConfig, MonitorController};
pub use debounce::{DebounceFilter, DEBOUNCE_WINDOW};
pub use event::{ForegroundEvent, WindowEventKind};
pub use loop_worker::{BlockingMonitor, IgnoreReason, Verdict};
