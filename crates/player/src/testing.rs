// Test doubles for the engine, surfaces, PiP host and event listener

use parking_lot::Mutex;
use podium_video_core::{
    AudioAttributes, EngineListener, EventListener, ListenerId, MappedTrackInfo, MediaEngine,
    MediaSourceSpec, PipHost, PipParams, PipSupport, PlaybackParameters, PlaybackProbe,
    PlayerError, PlayerEvent, RawPlaybackState, RepeatMode, Result, TextureEntry,
    TrackSelectionParameters, VideoFormat, VideoSurface,
};
use std::sync::Arc;

/// Everything the fake engine was told, plus the values it reports
#[derive(Default)]
pub struct EngineRecord {
    pub calls: Vec<String>,
    pub media_source: Option<MediaSourceSpec>,
    pub surface_id: Option<u64>,
    pub audio_attributes: Option<(AudioAttributes, bool)>,
    pub play_when_ready: bool,
    pub repeat_mode: Option<RepeatMode>,
    pub volume: Option<f32>,
    pub playback_parameters: Option<PlaybackParameters>,
    pub seeks: Vec<i64>,
    pub listeners: Vec<(ListenerId, Arc<dyn EngineListener>)>,
    pub next_listener_id: ListenerId,
    pub track_info: Option<MappedTrackInfo>,
    pub track_parameters: TrackSelectionParameters,
    pub parameter_updates: usize,
    pub duration_ms: i64,
    pub position_ms: i64,
    pub buffered_ms: i64,
    pub video_format: Option<VideoFormat>,
    pub stop_count: usize,
    pub release_count: usize,
    pub fail_release: bool,
    /// Delivered from a separate thread while `prepare` is running
    pub signals_during_prepare: Vec<RawPlaybackState>,
}

#[derive(Clone, Default)]
pub struct FakeEngine {
    pub record: Arc<Mutex<EngineRecord>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_video(duration_ms: i64, width: i32, height: i32, rotation_degrees: i32) -> Self {
        let engine = Self::new();
        {
            let mut record = engine.record.lock();
            record.duration_ms = duration_ms;
            record.video_format = Some(VideoFormat {
                width,
                height,
                rotation_degrees,
            });
        }
        engine
    }

    /// Deliver a state change to every subscriber, as the engine's
    /// playback thread would
    pub fn emit_state(&self, state: RawPlaybackState) {
        let listeners: Vec<_> = self.record.lock().listeners.iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener.on_playback_state_changed(state);
        }
    }

    pub fn emit_error(&self, message: &str) {
        let listeners: Vec<_> = self.record.lock().listeners.iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener.on_player_error(message.to_string());
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.record.lock().calls.clone()
    }
}

impl PlaybackProbe for FakeEngine {
    fn duration_ms(&self) -> i64 {
        self.record.lock().duration_ms
    }

    fn current_position_ms(&self) -> i64 {
        self.record.lock().position_ms
    }

    fn buffered_position_ms(&self) -> i64 {
        self.record.lock().buffered_ms
    }

    fn video_format(&self) -> Option<VideoFormat> {
        self.record.lock().video_format
    }
}

impl MediaEngine for FakeEngine {
    fn set_media_source(&mut self, source: &MediaSourceSpec) {
        let mut record = self.record.lock();
        record.calls.push("set_media_source".to_string());
        record.media_source = Some(source.clone());
    }

    fn prepare(&mut self) {
        let signals = {
            let mut record = self.record.lock();
            record.calls.push("prepare".to_string());
            record.signals_during_prepare.clone()
        };
        if !signals.is_empty() {
            let engine = self.clone();
            std::thread::spawn(move || {
                for state in signals {
                    engine.emit_state(state);
                }
            })
            .join()
            .expect("playback thread panicked");
        }
    }

    fn set_video_surface(&mut self, surface: &dyn VideoSurface) {
        let mut record = self.record.lock();
        record.calls.push("set_video_surface".to_string());
        record.surface_id = Some(surface.id());
    }

    fn set_audio_attributes(&mut self, attributes: AudioAttributes, handle_audio_focus: bool) {
        let mut record = self.record.lock();
        record.calls.push("set_audio_attributes".to_string());
        record.audio_attributes = Some((attributes, handle_audio_focus));
    }

    fn add_listener(&mut self, listener: Arc<dyn EngineListener>) -> ListenerId {
        let mut record = self.record.lock();
        record.calls.push("add_listener".to_string());
        record.next_listener_id += 1;
        let id = record.next_listener_id;
        record.listeners.push((id, listener));
        id
    }

    fn remove_listener(&mut self, id: ListenerId) {
        let mut record = self.record.lock();
        record.calls.push("remove_listener".to_string());
        record.listeners.retain(|(existing, _)| *existing != id);
    }

    fn set_play_when_ready(&mut self, play_when_ready: bool) {
        self.record.lock().play_when_ready = play_when_ready;
    }

    fn set_repeat_mode(&mut self, mode: RepeatMode) {
        self.record.lock().repeat_mode = Some(mode);
    }

    fn set_volume(&mut self, volume: f32) {
        self.record.lock().volume = Some(volume);
    }

    fn set_playback_parameters(&mut self, parameters: PlaybackParameters) {
        self.record.lock().playback_parameters = Some(parameters);
    }

    fn seek_to(&mut self, position_ms: i64) {
        let mut record = self.record.lock();
        record.seeks.push(position_ms);
        record.position_ms = position_ms;
    }

    fn mapped_track_info(&self) -> Option<MappedTrackInfo> {
        self.record.lock().track_info.clone()
    }

    fn track_selection_parameters(&self) -> TrackSelectionParameters {
        self.record.lock().track_parameters.clone()
    }

    fn set_track_selection_parameters(&mut self, parameters: TrackSelectionParameters) {
        let mut record = self.record.lock();
        record.track_parameters = parameters;
        record.parameter_updates += 1;
    }

    fn stop(&mut self) -> Result<()> {
        let mut record = self.record.lock();
        record.calls.push("stop".to_string());
        record.stop_count += 1;
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let mut record = self.record.lock();
        record.calls.push("release".to_string());
        record.release_count += 1;
        if record.fail_release {
            return Err(PlayerError::Playback("engine release failed".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct SurfaceRecord {
    pub surfaces_created: usize,
    pub surface_releases: usize,
    pub texture_releases: usize,
    pub fail_texture_release: bool,
}

pub struct FakeSurface {
    id: u64,
    record: Arc<Mutex<SurfaceRecord>>,
}

impl VideoSurface for FakeSurface {
    fn id(&self) -> u64 {
        self.id
    }

    fn release(&mut self) -> Result<()> {
        self.record.lock().surface_releases += 1;
        Ok(())
    }
}

#[derive(Clone)]
pub struct FakeTexture {
    id: i64,
    pub record: Arc<Mutex<SurfaceRecord>>,
}

impl FakeTexture {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            record: Arc::new(Mutex::new(SurfaceRecord::default())),
        }
    }
}

impl TextureEntry for FakeTexture {
    fn id(&self) -> i64 {
        self.id
    }

    fn create_surface(&mut self) -> Result<Box<dyn VideoSurface>> {
        let mut record = self.record.lock();
        record.surfaces_created += 1;
        Ok(Box::new(FakeSurface {
            id: 1000 + self.id as u64,
            record: self.record.clone(),
        }))
    }

    fn release(&mut self) -> Result<()> {
        let mut record = self.record.lock();
        record.texture_releases += 1;
        if record.fail_texture_release {
            return Err(PlayerError::Surface("texture already gone".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct PipRecord {
    params_set: Vec<PipParams>,
    enter_calls: Vec<Option<PipParams>>,
}

#[derive(Clone)]
pub struct FakePipHost {
    support: PipSupport,
    fail: bool,
    record: Arc<Mutex<PipRecord>>,
}

impl FakePipHost {
    pub fn new(support: PipSupport) -> Self {
        Self {
            support,
            fail: false,
            record: Arc::new(Mutex::new(PipRecord::default())),
        }
    }

    pub fn failing(support: PipSupport) -> Self {
        Self {
            fail: true,
            ..Self::new(support)
        }
    }

    pub fn params_set(&self) -> Vec<PipParams> {
        self.record.lock().params_set.clone()
    }

    pub fn enter_calls(&self) -> Vec<Option<PipParams>> {
        self.record.lock().enter_calls.clone()
    }
}

impl PipHost for FakePipHost {
    fn support(&self) -> PipSupport {
        self.support
    }

    fn set_params(&mut self, params: &PipParams) -> Result<()> {
        if self.fail {
            return Err(PlayerError::PictureInPicture("activity not resumed".to_string()));
        }
        self.record.lock().params_set.push(*params);
        Ok(())
    }

    fn enter(&mut self, params: Option<&PipParams>) -> Result<()> {
        self.record.lock().enter_calls.push(params.copied());
        if self.fail {
            return Err(PlayerError::PictureInPicture("activity not resumed".to_string()));
        }
        Ok(())
    }
}

/// Records every delivered event
pub struct RecordingListener {
    events: Mutex<Vec<PlayerEvent>>,
}

impl RecordingListener {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(PlayerEvent::name).collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventListener for RecordingListener {
    fn on_event(&self, event: PlayerEvent) {
        self.events.lock().push(event);
    }
}
