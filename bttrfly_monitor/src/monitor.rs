//! The virtual monitor session: lock screen, greeting, dock and note window
//! wired to one timer queue. The host calls `advance` with its clock and
//! forwards clicks and drags; every observable change lands in the event log.

use chrono::Timelike;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;

use crate::audio::{AudioCue, SilentAudioCue, UNLOCK_CUE};
use crate::dock::DockAction;
use crate::greeting::{GreetingPhase, GreetingSequence, TimeBucket, TypingStep};
use crate::lock::LockState;
use crate::timers::TimerQueue;
use crate::window::{NoteWindow, Point, Rect};

pub const UNLOCK_DELAY_MS: u64 = 400;
pub const WINDOW_OPEN_DELAY_MS: u64 = 800;
pub const JUST_OPENED_MS: u64 = 600;
pub const DOTS_DELAY_MS: u64 = 1_000;
pub const TYPING_DELAY_MS: u64 = 1_500;
pub const KEYSTROKE_MS: u64 = 35;
pub const HOLD_MS: u64 = 2_000;

/// Where greeting messages come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetingSource {
    /// Local wall-clock hour and an OS-seeded generator.
    Clock,
    /// Fixed hour and seed, for reproducible sessions.
    Fixed { hour: u32, seed: u64 },
}

impl GreetingSource {
    fn pick(self) -> (TimeBucket, &'static str) {
        match self {
            GreetingSource::Clock => {
                let bucket = TimeBucket::from_hour(chrono::Local::now().hour());
                (bucket, bucket.pick(&mut rand::thread_rng()))
            }
            GreetingSource::Fixed { hour, seed } => {
                let bucket = TimeBucket::from_hour(hour);
                (bucket, bucket.pick(&mut StdRng::seed_from_u64(seed)))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MonitorTimer {
    FinishUnlock,
    OpenWindow,
    SettleWindow,
    ShowDots,
    StartTyping,
    TypeNext,
    StartBackspacing,
    EraseNext,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MonitorEventKind {
    LockChanged { state: LockState },
    AudioFailed { cue: String, reason: String },
    UiShown,
    GreetingPicked { bucket: TimeBucket, message: String },
    GreetingPhase { phase: GreetingPhase },
    WindowOpened { x: f32, y: f32 },
    WindowSettled,
    WindowFocused,
    WindowMoved { x: f32, y: f32 },
    WindowClosed,
    DragStarted,
    DragEnded,
    AppLaunched { name: String, action: DockAction },
    TornDown { cancelled_timers: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorEvent {
    pub at_ms: u64,
    #[serde(flatten)]
    pub kind: MonitorEventKind,
}

pub struct VirtualMonitor {
    now_ms: u64,
    container: Rect,
    lock: LockState,
    ui_visible: bool,
    greeting: GreetingSequence,
    greeting_source: GreetingSource,
    window: NoteWindow,
    window_just_opened: bool,
    timers: TimerQueue<MonitorTimer>,
    audio: Box<dyn AudioCue>,
    events: Vec<MonitorEvent>,
}

impl VirtualMonitor {
    pub fn new(container: Rect) -> Self {
        Self::with_parts(container, Box::new(SilentAudioCue), GreetingSource::Clock)
    }

    pub fn with_parts(
        container: Rect,
        audio: Box<dyn AudioCue>,
        greeting_source: GreetingSource,
    ) -> Self {
        Self {
            now_ms: 0,
            container,
            lock: LockState::Locked,
            ui_visible: false,
            greeting: GreetingSequence::new(),
            greeting_source,
            window: NoteWindow::default(),
            window_just_opened: false,
            timers: TimerQueue::new(),
            audio,
            events: Vec::new(),
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn lock_state(&self) -> LockState {
        self.lock
    }

    pub fn is_ui_visible(&self) -> bool {
        self.ui_visible
    }

    pub fn greeting(&self) -> &GreetingSequence {
        &self.greeting
    }

    pub fn window(&self) -> &NoteWindow {
        &self.window
    }

    pub fn is_window_just_opened(&self) -> bool {
        self.window_just_opened
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.next_deadline()
    }

    pub fn events(&self) -> &[MonitorEvent] {
        &self.events
    }

    /// Take every event recorded so far, along with the fired-timer history.
    /// Long-running hosts call this periodically so neither log grows without
    /// bound.
    pub fn drain_events(&mut self) -> Vec<MonitorEvent> {
        let fired = self.timers.take_history().len();
        log::trace!("drained {} events, {fired} fired timers", self.events.len());
        std::mem::take(&mut self.events)
    }

    pub fn events_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.events)
    }

    /// Run every timer due at or before `now_ms`, in deadline order. Timers
    /// scheduled by a handler fire in the same call if they fall due.
    pub fn advance(&mut self, now_ms: u64) {
        while let Some(timer) = self.timers.pop_due(now_ms) {
            self.now_ms = self.now_ms.max(timer.deadline_ms);
            self.fire(timer.event);
        }
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Click on the lock screen. Ignored unless locked.
    pub fn click_lock_screen(&mut self) {
        if self.lock != LockState::Locked {
            return;
        }
        if let Err(err) = self.audio.play(UNLOCK_CUE) {
            log::warn!("unlock cue failed: {err}");
            self.record(MonitorEventKind::AudioFailed {
                cue: UNLOCK_CUE.to_string(),
                reason: err.to_string(),
            });
        }
        if self.lock.begin_unlock() {
            self.record(MonitorEventKind::LockChanged { state: self.lock });
            self.schedule_in(UNLOCK_DELAY_MS, MonitorTimer::FinishUnlock);
        }
    }

    pub fn open_app(&mut self, name: &str) -> DockAction {
        let action = DockAction::for_app(name);
        log::info!("opening {name}");
        self.record(MonitorEventKind::AppLaunched {
            name: name.to_string(),
            action: action.clone(),
        });
        if action == DockAction::ShowNoteWindow {
            if self.window.is_open() {
                self.record(MonitorEventKind::WindowFocused);
            } else {
                self.open_window();
            }
        }
        action
    }

    pub fn close_window(&mut self) {
        if !self.window.is_open() {
            return;
        }
        self.window.close();
        self.record(MonitorEventKind::WindowClosed);
    }

    /// New client rect for the monitor's screen area.
    pub fn resize(&mut self, container: Rect) {
        self.container = container;
        self.window.container_resized(container);
    }

    pub fn pointer_down_on_title(&mut self, pointer: Point) {
        if !self.window.is_open() {
            return;
        }
        self.window.drag_start(pointer, self.container);
        self.record(MonitorEventKind::DragStarted);
    }

    pub fn pointer_move(&mut self, pointer: Point) {
        if let Some(position) = self.window.drag_move(pointer) {
            self.record(MonitorEventKind::WindowMoved {
                x: position.x,
                y: position.y,
            });
        }
    }

    pub fn pointer_up(&mut self) {
        if self.window.drag_end() {
            self.record(MonitorEventKind::DragEnded);
        }
    }

    /// Cancel everything pending and release any drag. The session stays
    /// inspectable but nothing further fires.
    pub fn teardown(&mut self) {
        let cancelled_timers = self.timers.cancel_all();
        self.window.drag_end();
        log::debug!("monitor teardown cancelled {cancelled_timers} timers");
        self.record(MonitorEventKind::TornDown { cancelled_timers });
    }

    fn fire(&mut self, timer: MonitorTimer) {
        match timer {
            MonitorTimer::FinishUnlock => {
                if self.lock.finish_unlock() {
                    self.record(MonitorEventKind::LockChanged { state: self.lock });
                    self.schedule_in(WINDOW_OPEN_DELAY_MS, MonitorTimer::OpenWindow);
                    self.show_ui();
                }
            }
            MonitorTimer::OpenWindow => self.open_window(),
            MonitorTimer::SettleWindow => {
                self.window_just_opened = false;
                self.record(MonitorEventKind::WindowSettled);
            }
            MonitorTimer::ShowDots => {
                self.greeting.show_dots();
                self.record_phase();
                self.schedule_in(TYPING_DELAY_MS, MonitorTimer::StartTyping);
            }
            MonitorTimer::StartTyping => {
                self.greeting.start_typing();
                self.record_phase();
                self.schedule_in(KEYSTROKE_MS, MonitorTimer::TypeNext);
            }
            MonitorTimer::TypeNext => match self.greeting.tick_typing() {
                TypingStep::Continue => self.schedule_in(KEYSTROKE_MS, MonitorTimer::TypeNext),
                TypingStep::Complete => self.schedule_in(HOLD_MS, MonitorTimer::StartBackspacing),
            },
            MonitorTimer::StartBackspacing => {
                self.greeting.start_backspacing();
                self.record_phase();
                self.schedule_in(KEYSTROKE_MS, MonitorTimer::EraseNext);
            }
            MonitorTimer::EraseNext => {
                if self.greeting.tick_backspacing() {
                    self.record_phase();
                } else {
                    self.schedule_in(KEYSTROKE_MS, MonitorTimer::EraseNext);
                }
            }
        }
    }

    fn show_ui(&mut self) {
        self.ui_visible = true;
        self.record(MonitorEventKind::UiShown);

        let (bucket, message) = self.greeting_source.pick();
        self.greeting.begin(message);
        self.record(MonitorEventKind::GreetingPicked {
            bucket,
            message: message.to_string(),
        });
        self.schedule_in(DOTS_DELAY_MS, MonitorTimer::ShowDots);
    }

    fn open_window(&mut self) {
        self.window.open(self.container);
        self.window_just_opened = true;
        let position = self.window.position();
        self.record(MonitorEventKind::WindowOpened {
            x: position.x,
            y: position.y,
        });
        self.schedule_in(JUST_OPENED_MS, MonitorTimer::SettleWindow);
    }

    fn schedule_in(&mut self, delay_ms: u64, timer: MonitorTimer) {
        self.timers.schedule(self.now_ms + delay_ms, timer);
    }

    fn record_phase(&mut self) {
        let phase = self.greeting.phase();
        self.record(MonitorEventKind::GreetingPhase { phase });
    }

    fn record(&mut self, kind: MonitorEventKind) {
        log::debug!("[{} ms] {kind:?}", self.now_ms);
        self.events.push(MonitorEvent {
            at_ms: self.now_ms,
            kind,
        });
    }
}
