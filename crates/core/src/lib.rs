// Core types and traits for the Podium video player

pub mod engine;
pub mod error;
pub mod event;
pub mod geometry;
pub mod source;
pub mod state;
pub mod tracks;

// Re-export commonly used types
pub use engine::{
    AudioAttributes, AudioContentType, EngineListener, ListenerId, MediaEngine, PipHost,
    PipParams, PipSupport, PlaybackParameters, PlaybackProbe, RawPlaybackState, RepeatMode,
    TextureEntry, VideoFormat, VideoSurface,
};
pub use error::{PlayerError, Result};
pub use event::{EventListener, EventSink, PlayerEvent, VIDEO_ERROR_CODE};
pub use geometry::{compute_bounds, PictureInPictureBounds, Rational, Rect};
pub use source::{DataSource, MediaSourceResolver, MediaSourceSpec, SourceType};
pub use state::{PictureInPictureSetup, PlaybackPhase, PlaybackStateMachine};
pub use tracks::{
    FormatSupport, MappedRenderer, MappedTrack, MappedTrackGroup, MappedTrackInfo, RendererType,
    SelectionOverride, TrackCatalog, TrackDescriptor, TrackFormat, TrackSelectionParameters,
};
