//! Sound cues
//!
//! The simulation only emits [`GameEvent`]s. This module turns them into
//! named cues and resolves each cue to a file in the sound folder; actual
//! playback is left to an [`AudioBackend`].

use std::path::{Path, PathBuf};

use crate::settings::Settings;
use crate::sim::GameEvent;

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioCue {
    /// Safe object sliced
    Slash,
    /// Hazard sliced
    Boom,
    /// Level increased
    LevelUp,
}

impl AudioCue {
    pub fn as_str(self) -> &'static str {
        match self {
            AudioCue::Slash => "slash",
            AudioCue::Boom => "boom",
            AudioCue::LevelUp => "level-up",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            AudioCue::Slash => "slash.mp3",
            AudioCue::Boom => "boom.mp3",
            AudioCue::LevelUp => "levelup.mp3",
        }
    }

    /// Cue for a simulation event, if it has one
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Sliced { .. } => Some(AudioCue::Slash),
            GameEvent::HazardHit { .. } => Some(AudioCue::Boom),
            GameEvent::LevelUp { .. } => Some(AudioCue::LevelUp),
            _ => None,
        }
    }
}

/// Cue events of one tick, in order
pub fn cues(events: &[GameEvent]) -> impl Iterator<Item = AudioCue> + '_ {
    events.iter().filter_map(AudioCue::for_event)
}

/// Fire-and-forget receiver of cues
pub trait AudioSink {
    fn play(&mut self, cue: AudioCue);
}

/// Collects cues (tests, headless runs)
impl AudioSink for Vec<AudioCue> {
    fn play(&mut self, cue: AudioCue) {
        self.push(cue);
    }
}

/// Plays a sound file at a volume
pub trait AudioBackend {
    fn play_file(&mut self, path: &Path, volume: f32);
}

/// Cue-to-file mapping with volume control
pub struct SoundBank<B: AudioBackend> {
    dir: Option<PathBuf>,
    backend: B,
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl<B: AudioBackend> SoundBank<B> {
    /// Use the first existing folder among `candidates`
    pub fn discover<P: AsRef<Path>>(candidates: &[P], backend: B) -> Self {
        let dir = candidates
            .iter()
            .map(|p| p.as_ref())
            .find(|p| p.is_dir())
            .map(Path::to_path_buf);
        match &dir {
            Some(d) => log::info!("Sound folder: {}", d.display()),
            None => log::warn!("No sound folder found - audio disabled"),
        }
        Self {
            dir,
            backend,
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    pub fn from_settings(settings: &Settings, backend: B) -> Self {
        let mut bank = Self::discover(&settings.sound_dirs, backend);
        bank.set_master_volume(settings.master_volume);
        bank.set_sfx_volume(settings.sfx_volume);
        bank.set_muted(settings.muted);
        bank
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: AudioBackend> AudioSink for SoundBank<B> {
    fn play(&mut self, cue: AudioCue) {
        let vol = self.effective_volume();
        if vol <= 0.0 {
            return;
        }
        let Some(dir) = &self.dir else { return };

        let path = dir.join(cue.file_name());
        if !path.is_file() {
            log::warn!("Missing sound for '{}': {}", cue.as_str(), path.display());
            return;
        }
        self.backend.play_file(&path, vol);
    }
}
