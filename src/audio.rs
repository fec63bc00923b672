//! Audio interface for the simulation
//!
//! The core never synthesizes or mixes sound. Ships hold a looping thruster
//! handle that is played/paused on thrust transitions, and one-shot effects go
//! through the backend. Playback never feeds back into the simulation.

use std::fmt::Debug;

/// One-shot sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Ship slipped into a portal
    EnterPortal,
    /// Ship blew up
    Explosion,
}

/// A looping sound owned by one entity
pub trait AudioHandle: Debug {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_playing(&self) -> bool;
}

/// Creates handles and plays one-shot effects
pub trait AudioBackend: Debug {
    /// New looping thruster handle (starts paused)
    fn thrust_loop(&mut self) -> Box<dyn AudioHandle>;
    /// Fire-and-forget effect
    fn play(&mut self, effect: SoundEffect);
}

/// Loop handle that only tracks its state
#[derive(Debug, Default)]
pub struct SilentLoop {
    playing: bool,
}

impl AudioHandle for SilentLoop {
    fn play(&mut self) {
        log::trace!("thruster loop: play");
        self.playing = true;
    }

    fn pause(&mut self) {
        log::trace!("thruster loop: pause");
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Backend for headless runs and tests
#[derive(Debug, Default)]
pub struct SilentAudio;

impl SilentAudio {
    pub fn new() -> Self {
        Self
    }
}

impl AudioBackend for SilentAudio {
    fn thrust_loop(&mut self) -> Box<dyn AudioHandle> {
        Box::new(SilentLoop::default())
    }

    fn play(&mut self, effect: SoundEffect) {
        log::trace!("sfx {:?}", effect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_loop_tracks_state() {
        let mut audio = SilentAudio::new();
        let mut handle = audio.thrust_loop();
        assert!(!handle.is_playing());
        handle.play();
        assert!(handle.is_playing());
        handle.pause();
        assert!(!handle.is_playing());
    }
}
