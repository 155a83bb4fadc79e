//! Audio collaborator interface
//!
//! The core only asks for clips by name; buffers and mixing belong to the host.

use std::collections::BTreeMap;

/// Clips the game asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clip {
    /// Menu, game over and leaderboard background
    MainMenuMusic,
    /// One-shot intro played when a run starts
    GameMusicIntro,
    /// Looping gameplay music after the intro
    GameMusicLoop,
    /// Critical-health alarm
    Damage,
    /// Hazard hit that did not kill
    Hit,
    /// Ship destroyed
    Explosion,
    /// Powerup collected
    Powerup,
}

impl Clip {
    pub fn name(&self) -> &'static str {
        match self {
            Clip::MainMenuMusic => "Main Menu Music",
            Clip::GameMusicIntro => "Game Music Intro",
            Clip::GameMusicLoop => "Game Music Loop",
            Clip::Damage => "Damage",
            Clip::Hit => "Hit",
            Clip::Explosion => "Explosion",
            Clip::Powerup => "Powerup",
        }
    }
}

/// Handle to a playing sound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SoundHandle(pub u64);

/// Sound playback backend
pub trait AudioSink {
    fn play_sound(&mut self, name: &str, looping: bool) -> SoundHandle;

    /// Stopping a finished or unknown handle is a no-op
    fn stop_sound(&mut self, handle: SoundHandle);

    fn pause_all(&mut self, paused: bool);

    /// Clip length in seconds, if known
    fn clip_length(&self, _name: &str) -> Option<f32> {
        None
    }
}

/// A sound started by `LogAudio`
#[derive(Debug, Clone, PartialEq)]
pub struct PlayingSound {
    pub name: String,
    pub looping: bool,
}

/// Audio backend that only logs, used by the headless runner
#[derive(Debug, Default)]
pub struct LogAudio {
    playing: BTreeMap<SoundHandle, PlayingSound>,
    lengths: BTreeMap<String, f32>,
    paused: bool,
    next_handle: u64,
}

impl LogAudio {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known clip length
    pub fn with_clip_length(mut self, clip: Clip, seconds: f32) -> Self {
        self.lengths.insert(clip.name().to_string(), seconds);
        self
    }

    /// Looping sounds still active (one-shots are forgotten once started)
    pub fn playing(&self) -> impl Iterator<Item = &PlayingSound> {
        self.playing.values()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl AudioSink for LogAudio {
    fn play_sound(&mut self, name: &str, looping: bool) -> SoundHandle {
        self.next_handle += 1;
        let handle = SoundHandle(self.next_handle);
        log::debug!("Audio: play '{}' (loop: {})", name, looping);
        if looping {
            self.playing.insert(
                handle,
                PlayingSound {
                    name: name.to_string(),
                    looping,
                },
            );
        }
        handle
    }

    fn stop_sound(&mut self, handle: SoundHandle) {
        if let Some(sound) = self.playing.remove(&handle) {
            log::debug!("Audio: stop '{}'", sound.name);
        }
    }

    fn pause_all(&mut self, paused: bool) {
        log::debug!("Audio: {}", if paused { "paused" } else { "resumed" });
        self.paused = paused;
    }

    fn clip_length(&self, name: &str) -> Option<f32> {
        self.lengths.get(name).copied()
    }
}
