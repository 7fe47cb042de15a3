// Playback state machine: turns raw engine signals into ordered player events

use crate::engine::{PlaybackProbe, RawPlaybackState};
use crate::event::PlayerEvent;

/// Lifecycle phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    /// Constructed, engine not yet preparing
    Uninitialized,
    /// Engine preparing; buffering before first ready is part of this phase
    Preparing,
    Ready,
    Buffering,
    /// Terminal
    Ended,
    /// Terminal
    Error,
}

impl PlaybackPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlaybackPhase::Ended | PlaybackPhase::Error)
    }
}

/// Called once, when the natural video size first becomes known.
/// Returns whether picture-in-picture is available for the session.
pub trait PictureInPictureSetup {
    fn prepare(&mut self, width: i32, height: i32) -> bool;
}

/// Buffering/initialization state machine.
///
/// Every input produces its events in a fixed order: the buffering flag
/// update (and its event, if the flag changed) comes first, then the
/// state-specific event.
#[derive(Debug)]
pub struct PlaybackStateMachine {
    phase: PlaybackPhase,
    is_initialized: bool,
    is_buffering: bool,
}

impl PlaybackStateMachine {
    pub fn new() -> Self {
        Self {
            phase: PlaybackPhase::Uninitialized,
            is_initialized: false,
            is_buffering: false,
        }
    }

    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    pub fn is_buffering(&self) -> bool {
        self.is_buffering
    }

    /// The engine has been handed a source and asked to prepare
    pub fn mark_preparing(&mut self) {
        if self.phase == PlaybackPhase::Uninitialized {
            self.transition(PlaybackPhase::Preparing);
        }
    }

    pub fn on_state_changed<P: PlaybackProbe + ?Sized>(
        &mut self,
        state: RawPlaybackState,
        probe: &P,
        pip: &mut dyn PictureInPictureSetup,
    ) -> Vec<PlayerEvent> {
        let mut events = Vec::new();

        match state {
            RawPlaybackState::Buffering => {
                self.set_buffering(true, &mut events);
                events.push(PlayerEvent::buffering_update(probe.buffered_position_ms()));
                if self.is_initialized {
                    self.transition(PlaybackPhase::Buffering);
                }
            }
            RawPlaybackState::Ready => {
                self.set_buffering(false, &mut events);
                self.transition(PlaybackPhase::Ready);
                if !self.is_initialized {
                    self.is_initialized = true;
                    events.push(Self::initialized_event(probe, pip));
                }
            }
            RawPlaybackState::Ended => {
                self.set_buffering(false, &mut events);
                self.transition(PlaybackPhase::Ended);
                events.push(PlayerEvent::Completed);
            }
            RawPlaybackState::Idle => {
                self.set_buffering(false, &mut events);
            }
        }

        events
    }

    /// Engine-reported failure. Does not touch the initialized flag.
    pub fn on_error(&mut self, message: &str) -> Vec<PlayerEvent> {
        let mut events = Vec::new();
        self.set_buffering(false, &mut events);
        self.transition(PlaybackPhase::Error);
        events.push(PlayerEvent::video_error(format!(
            "Video player had error {}",
            message
        )));
        events
    }

    fn set_buffering(&mut self, buffering: bool, events: &mut Vec<PlayerEvent>) {
        if self.is_buffering != buffering {
            self.is_buffering = buffering;
            events.push(if buffering {
                PlayerEvent::BufferingStart
            } else {
                PlayerEvent::BufferingEnd
            });
        }
    }

    fn transition(&mut self, next: PlaybackPhase) {
        if self.phase.is_terminal() || self.phase == next {
            return;
        }
        log::debug!("Playback phase: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    fn initialized_event<P: PlaybackProbe + ?Sized>(
        probe: &P,
        pip: &mut dyn PictureInPictureSetup,
    ) -> PlayerEvent {
        let duration = probe.duration_ms();

        match probe.video_format() {
            Some(format) => {
                let (width, height) = format.display_size();
                let pip_enable = pip.prepare(width, height);
                log::info!(
                    "Initialized: duration={}ms size={}x{} pip={}",
                    duration,
                    width,
                    height,
                    pip_enable
                );
                PlayerEvent::Initialized {
                    duration,
                    width: Some(width),
                    height: Some(height),
                    pip_enable: Some(pip_enable),
                }
            }
            None => {
                log::info!("Initialized without video format: duration={}ms", duration);
                PlayerEvent::Initialized {
                    duration,
                    width: None,
                    height: None,
                    pip_enable: None,
                }
            }
        }
    }
}

impl Default for PlaybackStateMachine {
    fn default() -> Self {
        Self::new()
    }
}
