//! Scripted headless session for the virtual monitor: unlock, let the
//! greeting play out, drag the note window past the screen edge, use the
//! dock, then tear down.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use bttrfly_monitor::{
    AudioCue, GreetingSource, MonitorEventKind, Point, Rect, VirtualMonitor,
};

/// Screen area of the demo monitor in client pixels.
pub const DEMO_SCREEN: Rect = Rect::new(20.0, 20.0, 1000.0, 800.0);

/// One scripted input, applied once the clock reaches `at_ms`.
#[derive(Debug, Clone, Copy)]
enum Step {
    ClickLockScreen,
    GrabTitle(Point),
    MovePointer(Point),
    ReleasePointer,
    OpenApp(&'static str),
    CloseWindow,
}

const SCRIPT: &[(u64, Step)] = &[
    (500, Step::ClickLockScreen),
    // second click while unlocking is ignored
    (600, Step::ClickLockScreen),
    (2_500, Step::GrabTitle(Point::new(20.0 + 310.0 + 40.0, 20.0 + 130.0 + 12.0))),
    (2_550, Step::MovePointer(Point::new(600.0, 250.0))),
    (2_600, Step::MovePointer(Point::new(5_000.0, 5_000.0))),
    (2_650, Step::ReleasePointer),
    (3_000, Step::OpenApp("Bttrfly")),
    (3_200, Step::OpenApp("Updates here")),
    (4_000, Step::CloseWindow),
    (4_500, Step::OpenApp("Bttrfly")),
];

/// Total simulated time; long enough for the longest greeting to finish.
pub const DEMO_DURATION_MS: u64 = 12_000;

pub fn run_monitor_demo(audio: Box<dyn AudioCue>, greeting: GreetingSource) -> VirtualMonitor {
    let mut monitor = VirtualMonitor::with_parts(DEMO_SCREEN, audio, greeting);
    for &(at_ms, step) in SCRIPT {
        monitor.advance(at_ms);
        match step {
            Step::ClickLockScreen => monitor.click_lock_screen(),
            Step::GrabTitle(pointer) => monitor.pointer_down_on_title(pointer),
            Step::MovePointer(pointer) => monitor.pointer_move(pointer),
            Step::ReleasePointer => monitor.pointer_up(),
            Step::OpenApp(name) => {
                monitor.open_app(name);
            }
            Step::CloseWindow => monitor.close_window(),
        }
    }
    monitor.advance(DEMO_DURATION_MS);
    monitor.teardown();
    monitor
}

pub fn print_summary(monitor: &VirtualMonitor) {
    println!(
        "Monitor demo finished at {} ms ({} events)",
        monitor.now_ms(),
        monitor.events().len()
    );
    for event in monitor.events() {
        match &event.kind {
            MonitorEventKind::LockChanged { state } => {
                println!("  [{:>6} ms] lock -> {state:?}", event.at_ms)
            }
            MonitorEventKind::GreetingPicked { bucket, message } => {
                println!("  [{:>6} ms] greeting ({bucket:?}): {message}", event.at_ms)
            }
            MonitorEventKind::GreetingPhase { phase } => {
                println!("  [{:>6} ms] greeting phase -> {phase:?}", event.at_ms)
            }
            MonitorEventKind::WindowOpened { x, y } => {
                println!("  [{:>6} ms] note window opened at ({x}, {y})", event.at_ms)
            }
            MonitorEventKind::AudioFailed { cue, reason } => {
                println!("  [{:>6} ms] audio cue {cue} failed: {reason}", event.at_ms)
            }
            _ => {}
        }
    }
    let position = monitor.window().position();
    println!(
        "  note window {} at ({}, {})",
        if monitor.window().is_open() { "open" } else { "closed" },
        position.x,
        position.y
    );
}

pub fn write_event_log(monitor: &VirtualMonitor, destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = monitor.events_json().context("serializing monitor events")?;
    fs::write(destination, json)
        .with_context(|| format!("writing monitor log to {}", destination.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bttrfly_monitor::{DockAction, GreetingPhase, LockState, RecordingAudioCue};

    fn demo() -> (VirtualMonitor, RecordingAudioCue) {
        let audio = RecordingAudioCue::new();
        let monitor = run_monitor_demo(
            Box::new(audio.clone()),
            GreetingSource::Fixed { hour: 14, seed: 1 },
        );
        (monitor, audio)
    }

    #[test]
    fn scripted_session_unlocks_once() {
        let (monitor, audio) = demo();
        assert_eq!(monitor.lock_state(), LockState::Unlocked);
        assert_eq!(audio.played().len(), 1);
        assert_eq!(monitor.pending_timers(), 0);
    }

    #[test]
    fn drag_past_the_edge_is_clamped() {
        let (monitor, _) = demo();
        let moves: Vec<(f32, f32)> = monitor
            .events()
            .iter()
            .filter_map(|event| match event.kind {
                MonitorEventKind::WindowMoved { x, y } => Some((x, y)),
                _ => None,
            })
            .collect();
        // grabbed 40,12 inside the window
        assert_eq!(moves, vec![(540.0, 218.0), (620.0, 260.0)]);
        // reopened from the dock, so centred again
        assert_eq!(monitor.window().position(), Point::new(310.0, 130.0));
    }

    #[test]
    fn greeting_completes_within_the_demo() {
        let (monitor, _) = demo();
        let phases: Vec<GreetingPhase> = monitor
            .events()
            .iter()
            .filter_map(|event| match event.kind {
                MonitorEventKind::GreetingPhase { phase } => Some(phase),
                _ => None,
            })
            .collect();
        assert_eq!(
            phases,
            vec![
                GreetingPhase::Dots,
                GreetingPhase::Typing,
                GreetingPhase::Backspacing,
                GreetingPhase::None
            ]
        );
    }

    #[test]
    fn dock_links_are_only_logged() {
        let (monitor, _) = demo();
        let link = monitor.events().iter().find_map(|event| match &event.kind {
            MonitorEventKind::AppLaunched { name, action } if name == "Updates here" => {
                Some(action.clone())
            }
            _ => None,
        });
        assert!(matches!(link, Some(DockAction::OpenLink { .. })));
    }

    #[test]
    fn event_log_lands_on_disk() {
        let (monitor, _) = demo();
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logs").join("monitor.json");
        write_event_log(&monitor, &path).expect("write log");
        let json = fs::read_to_string(&path).expect("read log");
        assert!(json.contains("\"kind\": \"torn_down\""));
    }
}
