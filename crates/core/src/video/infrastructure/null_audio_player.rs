use std::path::Path;

use crate::video::domain::audio_player::{AudioError, AudioOptions, AudioPlayer};

/// Audio player with no output device.
///
/// Tracks transport state so hosts without sound (or clips without an
/// audio track) can still drive a session.
#[derive(Debug, Default)]
pub struct NullAudioPlayer {
    open: bool,
    paused: bool,
    muted: bool,
    volume: f32,
    position_secs: f64,
}

impl NullAudioPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Last position requested by a seek.
    pub fn position_secs(&self) -> f64 {
        self.position_secs
    }
}

impl AudioPlayer for NullAudioPlayer {
    fn open(&mut self, path: &Path, options: &AudioOptions) -> Result<(), AudioError> {
        log::debug!("No audio output for {}", path.display());
        self.open = true;
        self.paused = options.paused;
        self.muted = options.muted;
        self.volume = options.volume;
        self.position_secs = 0.0;
        Ok(())
    }

    fn set_pause(&mut self, paused: bool) {
        self.paused = paused;
    }

    fn seek(&mut self, seconds: f64, absolute: bool) -> Result<(), AudioError> {
        if !self.open {
            return Err(AudioError::NotOpen);
        }
        self.position_secs = if absolute {
            seconds.max(0.0)
        } else {
            (self.position_secs + seconds).max(0.0)
        };
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
    }

    fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn close(&mut self) {
        self.open = false;
    }
}
