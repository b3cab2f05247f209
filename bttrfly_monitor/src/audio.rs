use std::{cell::RefCell, rc::Rc};

use thiserror::Error;

/// Cue played when the lock screen is clicked.
pub const UNLOCK_CUE: &str = "unlock-sound.wav";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AudioError {
    #[error("audio output unavailable")]
    Unavailable,
    #[error("failed to play {cue}: {reason}")]
    Playback { cue: String, reason: String },
}

/// Fire-and-forget sound effects. Failures are reported, never retried.
pub trait AudioCue {
    fn play(&self, cue: &str) -> Result<(), AudioError>;
}

/// No audio device; every cue succeeds silently.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAudioCue;

impl AudioCue for SilentAudioCue {
    fn play(&self, _cue: &str) -> Result<(), AudioError> {
        Ok(())
    }
}

/// Records every requested cue. Can be told to fail, to exercise the
/// non-fatal error path.
#[derive(Clone, Default)]
pub struct RecordingAudioCue {
    played: Rc<RefCell<Vec<String>>>,
    fail_with: Option<AudioError>,
}

impl RecordingAudioCue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(error: AudioError) -> Self {
        Self {
            played: Rc::default(),
            fail_with: Some(error),
        }
    }

    pub fn played(&self) -> Vec<String> {
        self.played.borrow().clone()
    }
}

impl AudioCue for RecordingAudioCue {
    fn play(&self, cue: &str) -> Result<(), AudioError> {
        self.played.borrow_mut().push(cue.to_string());
        match &self.fail_with {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_cue_shares_history_between_clones() {
        let cue = RecordingAudioCue::new();
        let handle = cue.clone();
        cue.play(UNLOCK_CUE).expect("recording cue succeeds");
        assert_eq!(handle.played(), vec![UNLOCK_CUE.to_string()]);
    }

    #[test]
    fn failing_cue_still_records_the_attempt() {
        let cue = RecordingAudioCue::failing(AudioError::Unavailable);
        assert_eq!(cue.play("chime"), Err(AudioError::Unavailable));
        assert_eq!(cue.played(), vec!["chime".to_string()]);
    }
}
