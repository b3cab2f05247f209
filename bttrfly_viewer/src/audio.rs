use std::fs::Metadata;
use std::path::{Path, PathBuf};

use bttrfly_monitor::{AudioCue, AudioError};
#[cfg(feature = "audio")]
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};

/// Plays one clip file for every cue. With the `audio` feature the clip is
/// decoded and played through the default output device; without it the
/// clip is only checked for readability and the cue is logged.
pub struct ClipAudioCue {
    clip: PathBuf,
    #[cfg(feature = "audio")]
    output: std::cell::RefCell<Option<(OutputStream, OutputStreamHandle)>>,
}

impl ClipAudioCue {
    pub fn new(clip: impl Into<PathBuf>) -> Self {
        Self {
            clip: clip.into(),
            #[cfg(feature = "audio")]
            output: std::cell::RefCell::new(None),
        }
    }

    pub fn clip(&self) -> &Path {
        &self.clip
    }

    fn check_clip(&self, cue: &str) -> Result<Metadata, AudioError> {
        let metadata = std::fs::metadata(&self.clip)
            .map_err(|err| playback_error(cue, format!("{}: {err}", self.clip.display())))?;
        if !metadata.is_file() || metadata.len() == 0 {
            return Err(playback_error(
                cue,
                format!("{} is not a playable clip", self.clip.display()),
            ));
        }
        Ok(metadata)
    }

    #[cfg(feature = "audio")]
    fn decode_clip(
        &self,
        cue: &str,
    ) -> Result<Decoder<std::io::BufReader<std::fs::File>>, AudioError> {
        let file = std::fs::File::open(&self.clip)
            .map_err(|err| playback_error(cue, format!("{}: {err}", self.clip.display())))?;
        Decoder::new(std::io::BufReader::new(file))
            .map_err(|err| playback_error(cue, format!("decoding {}: {err}", self.clip.display())))
    }

    /// Decode first so a broken clip is reported even without a device. The
    /// output stream is opened once and kept for later cues; detached sinks
    /// play out while it lives.
    #[cfg(feature = "audio")]
    fn start_playback(&self, cue: &str) -> Result<(), AudioError> {
        let source = self.decode_clip(cue)?;
        let mut output = self.output.borrow_mut();
        if output.is_none() {
            let stream = OutputStream::try_default()
                .map_err(|err| playback_error(cue, format!("opening default output: {err}")))?;
            *output = Some(stream);
        }
        let Some((_, handle)) = output.as_ref() else {
            return Err(AudioError::Unavailable);
        };
        let sink = Sink::try_new(handle)
            .map_err(|err| playback_error(cue, format!("creating sink: {err}")))?;
        sink.append(source);
        sink.detach();
        Ok(())
    }

    #[cfg(not(feature = "audio"))]
    fn start_playback(&self, cue: &str) -> Result<(), AudioError> {
        log::debug!("built without the audio feature; {cue} stays silent");
        Ok(())
    }
}

fn playback_error(cue: &str, reason: String) -> AudioError {
    AudioError::Playback {
        cue: cue.to_string(),
        reason,
    }
}

impl AudioCue for ClipAudioCue {
    fn play(&self, cue: &str) -> Result<(), AudioError> {
        let metadata = self.check_clip(cue)?;
        self.start_playback(cue)?;
        log::info!(
            "playing {cue} from {} ({} bytes)",
            self.clip.display(),
            metadata.len()
        );
        Ok(())
    }
}
