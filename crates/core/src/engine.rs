// Collaborator traits: decoding engine, render surfaces, and the OS picture-in-picture host
// Platform bindings implement these; the session only talks to the traits.

use crate::error::Result;
use crate::geometry::{Rational, Rect};
use crate::source::MediaSourceSpec;
use crate::tracks::{MappedTrackInfo, TrackSelectionParameters};
use std::sync::Arc;

/// Playback state as reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawPlaybackState {
    Idle,
    Buffering,
    Ready,
    Ended,
}

/// Natural size of the current video track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoFormat {
    pub width: i32,
    pub height: i32,
    pub rotation_degrees: i32,
}

impl VideoFormat {
    /// Width and height as displayed. Portrait recordings report a 90 or 270
    /// degree rotation and get their dimensions swapped.
    pub fn display_size(&self) -> (i32, i32) {
        match self.rotation_degrees {
            90 | 270 => (self.height, self.width),
            _ => (self.width, self.height),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatMode {
    Off,
    All,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackParameters {
    pub speed: f32,
    pub pitch: f32,
}

impl PlaybackParameters {
    /// Linear speed change; pitch stays at its default
    pub fn with_speed(speed: f32) -> Self {
        Self { speed, pitch: 1.0 }
    }
}

impl Default for PlaybackParameters {
    fn default() -> Self {
        Self::with_speed(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioContentType {
    Movie,
    Music,
    Speech,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioAttributes {
    pub content_type: AudioContentType,
}

impl Default for AudioAttributes {
    fn default() -> Self {
        Self {
            content_type: AudioContentType::Movie,
        }
    }
}

/// Handle returned by [`MediaEngine::add_listener`]
pub type ListenerId = u64;

/// Engine state-change subscription.
/// The engine invokes these on one serialized context, never re-entrantly
/// from inside its own control calls.
pub trait EngineListener: Send + Sync {
    fn on_playback_state_changed(&self, state: RawPlaybackState);

    fn on_player_error(&self, message: String);
}

/// Synchronous reads of engine-maintained playback state
pub trait PlaybackProbe {
    fn duration_ms(&self) -> i64;

    fn current_position_ms(&self) -> i64;

    fn buffered_position_ms(&self) -> i64;

    fn video_format(&self) -> Option<VideoFormat>;
}

/// Opaque decode/render engine.
/// Commands are fire-and-forget; failures surface through [`EngineListener::on_player_error`].
pub trait MediaEngine: PlaybackProbe + Send {
    fn set_media_source(&mut self, source: &MediaSourceSpec);

    fn prepare(&mut self);

    fn set_video_surface(&mut self, surface: &dyn VideoSurface);

    fn set_audio_attributes(&mut self, attributes: AudioAttributes, handle_audio_focus: bool);

    fn add_listener(&mut self, listener: Arc<dyn EngineListener>) -> ListenerId;

    fn remove_listener(&mut self, id: ListenerId);

    fn set_play_when_ready(&mut self, play_when_ready: bool);

    fn set_repeat_mode(&mut self, mode: RepeatMode);

    /// Volume in `[0.0, 1.0]`
    fn set_volume(&mut self, volume: f32);

    fn set_playback_parameters(&mut self, parameters: PlaybackParameters);

    fn seek_to(&mut self, position_ms: i64);

    /// `None` until the engine has mapped tracks to renderers
    fn mapped_track_info(&self) -> Option<MappedTrackInfo>;

    fn track_selection_parameters(&self) -> TrackSelectionParameters;

    fn set_track_selection_parameters(&mut self, parameters: TrackSelectionParameters);

    fn stop(&mut self) -> Result<()>;

    fn release(&mut self) -> Result<()>;
}

/// Surface the engine renders frames into
pub trait VideoSurface: Send {
    fn id(&self) -> u64;

    fn release(&mut self) -> Result<()>;
}

/// Host texture allocation backing a [`VideoSurface`]
pub trait TextureEntry: Send {
    fn id(&self) -> i64;

    fn create_surface(&mut self) -> Result<Box<dyn VideoSurface>>;

    fn release(&mut self) -> Result<()>;
}

/// What the host OS offers for picture-in-picture, in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PipSupport {
    Unsupported,
    /// Can enter PiP, but takes no parameters
    Basic,
    /// Accepts aspect ratio and source rect parameters
    Params,
    /// Additionally supports auto-enter and seamless resize flags
    AutoEnter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipParams {
    pub aspect_ratio: Rational,
    pub source_rect_hint: Option<Rect>,
    pub auto_enter_enabled: Option<bool>,
    pub seamless_resize_enabled: Option<bool>,
}

/// OS picture-in-picture capability
pub trait PipHost: Send {
    fn support(&self) -> PipSupport;

    fn set_params(&mut self, params: &PipParams) -> Result<()>;

    /// Enter PiP, with parameters when the host accepts them
    fn enter(&mut self, params: Option<&PipParams>) -> Result<()>;
}
