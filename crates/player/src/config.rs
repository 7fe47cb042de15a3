// Session configuration

use podium_video_core::Rect;
use std::collections::HashMap;

/// Playback options supplied by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoPlayerOptions {
    /// Mix audio with other apps instead of taking audio focus
    pub mix_with_others: bool,
}

/// Everything needed to construct a [`crate::PlayerSession`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub data_source: String,
    pub format_hint: Option<String>,
    pub http_headers: HashMap<String, String>,
    pub options: VideoPlayerOptions,
    /// Screen-space bounds of the video view
    pub screen_bounds: Rect,
}

impl SessionConfig {
    pub fn new(data_source: impl Into<String>) -> Self {
        Self {
            data_source: data_source.into(),
            format_hint: None,
            http_headers: HashMap::new(),
            options: VideoPlayerOptions::default(),
            screen_bounds: Rect::default(),
        }
    }

    pub fn with_format_hint(mut self, hint: impl Into<String>) -> Self {
        self.format_hint = Some(hint.into());
        self
    }

    pub fn with_http_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.http_headers = headers;
        self
    }

    pub fn with_options(mut self, options: VideoPlayerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_screen_bounds(mut self, bounds: Rect) -> Self {
        self.screen_bounds = bounds;
        self
    }
}
