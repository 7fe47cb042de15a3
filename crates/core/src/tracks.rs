// Audio track enumeration and selection over the engine's mapped track info

use std::collections::{BTreeMap, BTreeSet};

/// Fallback display name for tracks without language or MIME type
pub const UNKNOWN_TRACK_NAME: &str = "Unknown";

/// Media type a renderer is specialized for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererType {
    Audio,
    Video,
    Text,
    Metadata,
    Other,
}

/// How well a renderer can play a given track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatSupport {
    Handled,
    ExceedsCapabilities,
    UnsupportedDrm,
    UnsupportedSubtype,
    UnsupportedType,
}

/// Format fields relevant for naming a track
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackFormat {
    pub id: Option<String>,
    pub language: Option<String>,
    pub sample_mime_type: Option<String>,
    pub label: Option<String>,
}

impl TrackFormat {
    /// Display name: language, then MIME type, then "Unknown"
    pub fn display_name(&self) -> String {
        self.language
            .as_deref()
            .or(self.sample_mime_type.as_deref())
            .unwrap_or(UNKNOWN_TRACK_NAME)
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedTrack {
    pub format: TrackFormat,
    pub support: FormatSupport,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedTrackGroup {
    pub tracks: Vec<MappedTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedRenderer {
    pub renderer_type: RendererType,
    pub groups: Vec<MappedTrackGroup>,
}

/// Snapshot of renderers, their track groups and per-track support
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedTrackInfo {
    pub renderers: Vec<MappedRenderer>,
}

/// Structural address of one track plus its display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackDescriptor {
    pub renderer_index: usize,
    pub group_index: usize,
    pub track_index: usize,
    pub name: String,
}

/// Pinned selection within one renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionOverride {
    pub group_index: usize,
    pub tracks: Vec<usize>,
}

impl SelectionOverride {
    pub fn single(group_index: usize, track_index: usize) -> Self {
        Self {
            group_index,
            tracks: vec![track_index],
        }
    }
}

/// Track selector parameters the session pushes to the engine
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackSelectionParameters {
    disabled_renderers: BTreeSet<usize>,
    overrides: BTreeMap<usize, SelectionOverride>,
}

impl TrackSelectionParameters {
    pub fn set_renderer_disabled(&mut self, renderer_index: usize, disabled: bool) {
        if disabled {
            self.disabled_renderers.insert(renderer_index);
        } else {
            self.disabled_renderers.remove(&renderer_index);
        }
    }

    pub fn is_renderer_disabled(&self, renderer_index: usize) -> bool {
        self.disabled_renderers.contains(&renderer_index)
    }

    pub fn clear_selection_override(&mut self, renderer_index: usize) {
        self.overrides.remove(&renderer_index);
    }

    pub fn set_selection_override(&mut self, renderer_index: usize, selection: SelectionOverride) {
        self.overrides.insert(renderer_index, selection);
    }

    pub fn selection_override(&self, renderer_index: usize) -> Option<&SelectionOverride> {
        self.overrides.get(&renderer_index)
    }

    /// Pin exactly one track on the descriptor's renderer, discarding any
    /// previous override there and re-enabling the renderer.
    pub fn pin_track(&mut self, track: &TrackDescriptor) {
        self.clear_selection_override(track.renderer_index);
        self.set_renderer_disabled(track.renderer_index, false);
        self.set_selection_override(
            track.renderer_index,
            SelectionOverride::single(track.group_index, track.track_index),
        );
    }
}

/// Read-only view that enumerates and looks up handled audio tracks.
///
/// Name lookup and index lookup both walk [`TrackCatalog::audio_tracks`],
/// so position `i` of the enumeration is exactly what index `i` selects.
pub struct TrackCatalog<'a> {
    info: &'a MappedTrackInfo,
}

impl<'a> TrackCatalog<'a> {
    pub fn new(info: &'a MappedTrackInfo) -> Self {
        Self { info }
    }

    /// Handled audio tracks in renderer, group, track order
    pub fn audio_tracks(&self) -> impl Iterator<Item = TrackDescriptor> + 'a {
        let info: &'a MappedTrackInfo = self.info;
        info.renderers
            .iter()
            .enumerate()
            .filter(|(_, renderer)| renderer.renderer_type == RendererType::Audio)
            .flat_map(|(renderer_index, renderer)| {
                renderer
                    .groups
                    .iter()
                    .enumerate()
                    .flat_map(move |(group_index, group)| {
                        group
                            .tracks
                            .iter()
                            .enumerate()
                            .filter(|(_, track)| track.support == FormatSupport::Handled)
                            .map(move |(track_index, track)| TrackDescriptor {
                                renderer_index,
                                group_index,
                                track_index,
                                name: track.format.display_name(),
                            })
                    })
            })
    }

    pub fn audio_track_names(&self) -> Vec<String> {
        self.audio_tracks().map(|track| track.name).collect()
    }

    /// First handled audio track whose display name equals `name`
    pub fn find_by_name(&self, name: &str) -> Option<TrackDescriptor> {
        self.audio_tracks().find(|track| track.name == name)
    }

    pub fn find_by_index(&self, index: usize) -> Option<TrackDescriptor> {
        self.audio_tracks().nth(index)
    }
}
