//! Audio cue played once at trigger time.
//!
//! Playback is fire-and-forget: `play()` hands the decoded clip to rodio's
//! output thread and returns. A failure (no output device, missing or
//! undecodable clip) comes back as an error for the caller to log; it never
//! blocks the visual timeline.

use anyhow::{Context, Result, anyhow};
use log::{debug, info, warn};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Something that can start the cue.
pub trait AudioCue {
    /// Start playback. Called at most once per controller.
    fn play(&mut self) -> Result<()>;
}

/// Live output kept alive for as long as the clip plays.
struct Output {
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
}

/// rodio-backed cue. The clip bytes are read eagerly; the output device is
/// opened only when playback starts.
pub struct RodioCue {
    path: PathBuf,
    clip: Option<Vec<u8>>,
    volume: f32,
    output: Option<Output>,
}

impl RodioCue {
    /// Preload the clip at `path`. A missing file is not fatal here; it
    /// surfaces as a playback error later.
    pub fn new(path: &Path, volume: f32) -> Self {
        let clip = match std::fs::read(path) {
            Ok(bytes) => {
                debug!("Preloaded audio cue {} ({} bytes)", path.display(), bytes.len());
                Some(bytes)
            }
            Err(e) => {
                warn!("Failed to preload audio cue {}: {}", path.display(), e);
                None
            }
        };
        Self {
            path: path.to_path_buf(),
            clip,
            volume: volume.clamp(0.0, 1.0),
            output: None,
        }
    }

    /// True while the clip is still audible.
    pub fn is_playing(&self) -> bool {
        self.output.as_ref().is_some_and(|o| !o.sink.empty())
    }
}

impl AudioCue for RodioCue {
    fn play(&mut self) -> Result<()> {
        if self.output.is_some() {
            debug!("Audio cue already started, ignoring");
            return Ok(());
        }
        let clip = self
            .clip
            .clone()
            .ok_or_else(|| anyhow!("audio clip {} not loaded", self.path.display()))?;

        let (stream, handle) =
            OutputStream::try_default().context("No audio output device available")?;
        let sink = Sink::try_new(&handle).context("Failed to open audio sink")?;
        let source = Decoder::new(Cursor::new(clip))
            .with_context(|| format!("Failed to decode {}", self.path.display()))?;

        sink.set_volume(self.volume);
        sink.append(source);
        info!("Audio cue started: {} (volume {:.2})", self.path.display(), self.volume);

        self.output = Some(Output {
            _stream: stream,
            _handle: handle,
            sink,
        });
        Ok(())
    }
}
