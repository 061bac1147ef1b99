//! Step/pause/free-run playback state machine
//!
//! The controller blocks inside `update` while paused, pumping the backend's
//! event loop until a step is consumed or play is toggled on. While playing,
//! each update pumps exactly once and proceeds. Step requests are one-shot
//! and only accepted while paused.

/// Whether the viewer free-runs or waits for explicit advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackMode {
    Paused,
    Playing,
}

/// Playback state: the level-triggered play flag plus the one-shot step flag
#[derive(Debug, Clone)]
pub struct Playback {
    mode: PlaybackMode,
    step_requested: bool,
}

impl Playback {
    /// Initial state: paused, no step pending
    pub fn new() -> Self {
        Self {
            mode: PlaybackMode::Paused,
            step_requested: false,
        }
    }

    /// The current mode
    pub fn mode(&self) -> PlaybackMode {
        self.mode
    }

    /// Whether the viewer is free-running
    pub fn is_playing(&self) -> bool {
        self.mode == PlaybackMode::Playing
    }

    /// Flip between paused and playing
    ///
    /// A pending step request is dropped when playback starts; it would
    /// otherwise fire spuriously on the next pause.
    pub fn toggle_play(&mut self) {
        self.mode = match self.mode {
            PlaybackMode::Paused => {
                self.step_requested = false;
                PlaybackMode::Playing
            }
            PlaybackMode::Playing => PlaybackMode::Paused,
        };
    }

    /// Request a single-frame advance; ignored while playing
    pub fn request_step(&mut self) {
        if self.mode == PlaybackMode::Paused {
            self.step_requested = true;
        }
    }

    /// Consume a pending step request
    pub fn take_step(&mut self) -> bool {
        std::mem::take(&mut self.step_requested)
    }
}

impl Default for Playback {
    fn default() -> Self {
        Self::new()
    }
}
