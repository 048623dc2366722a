//! Background music toggle and the fading credit banner.

use orrery_engine::SoundEvent;

pub const SOUND_MUSIC_PLAY: SoundEvent = SoundEvent(1);
pub const SOUND_MUSIC_PAUSE: SoundEvent = SoundEvent(2);

/// Looping background track. Starts paused (browsers block autoplay).
#[derive(Debug, Default)]
pub struct Music {
    playing: bool,
}

impl Music {
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Flip play/pause and return the cue for the host's audio manager.
    pub fn toggle(&mut self) -> SoundEvent {
        self.playing = !self.playing;
        if self.playing {
            SOUND_MUSIC_PLAY
        } else {
            SOUND_MUSIC_PAUSE
        }
    }
}

/// Credit banner shown once after load: fade in, hold, fade out.
#[derive(Debug)]
pub struct CreditBanner {
    elapsed: f64,
    duration: f64,
    fade: f64,
    finished: bool,
}

impl CreditBanner {
    pub fn new(duration: f64, fade: f64) -> Self {
        Self { elapsed: 0.0, duration, fade, finished: false }
    }

    fn opacity_at(&self, t: f64) -> f64 {
        if t >= self.duration {
            0.0
        } else if self.fade <= 0.0 {
            1.0
        } else if t < self.fade {
            t / self.fade
        } else if t > self.duration - self.fade {
            (self.duration - t) / self.fade
        } else {
            1.0
        }
    }

    /// Advance by `dt`. Returns the opacity to show, or `None` once the
    /// banner is gone (the final `Some(0.0)` is reported exactly once).
    pub fn tick(&mut self, dt: f64) -> Option<f64> {
        if self.finished {
            return None;
        }
        self.elapsed += dt;
        let opacity = self.opacity_at(self.elapsed).clamp(0.0, 1.0);
        if self.elapsed >= self.duration {
            self.finished = true;
        }
        Some(opacity)
    }

    /// Change the timing, keeping the time already shown.
    pub fn retime(&mut self, duration: f64, fade: f64) {
        self.duration = duration;
        self.fade = fade;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}
