//! Virtual desktop shown next to the product card.
//!
//! A lock screen unlocks on click, the menu bar greets the visitor with a
//! message typed out and erased again, and a note window can be dragged
//! around inside the monitor without leaving it. All time flows through a
//! deterministic timer queue driven by the host, so a session can be replayed
//! headlessly and asserted on.

pub mod audio;
pub mod dock;
pub mod greeting;
pub mod lock;
pub mod monitor;
pub mod timers;
pub mod window;

pub use audio::{AudioCue, AudioError, RecordingAudioCue, SilentAudioCue};
pub use dock::{DOCK_APPS, DockAction};
pub use greeting::{GreetingPhase, GreetingSequence, TimeBucket};
pub use lock::LockState;
pub use monitor::{GreetingSource, MonitorEvent, MonitorEventKind, VirtualMonitor};
pub use timers::{TimerId, TimerQueue};
pub use window::{NoteWindow, Point, Rect};
