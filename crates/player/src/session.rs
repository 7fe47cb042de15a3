// Player session: the public control surface for one video
// Composes source resolution, the state machine, track selection, PiP and the event sink.

use crate::config::SessionConfig;
use crate::pip::PipController;
use parking_lot::Mutex;
use podium_video_core::{
    AudioAttributes, EngineListener, EventListener, EventSink, ListenerId, MediaEngine,
    MediaSourceResolver, PipHost, PlaybackParameters, PlaybackPhase, PlaybackStateMachine,
    PlayerError, PlayerEvent, RawPlaybackState, Rect, RepeatMode, Result, TextureEntry,
    TrackCatalog, TrackDescriptor, VideoSurface,
};
use std::sync::{Arc, Weak};

/// Platform collaborators handed to a session
pub struct SessionResources {
    pub engine: Box<dyn MediaEngine>,
    pub texture: Box<dyn TextureEntry>,
    /// `None` when the host has no picture-in-picture capability at all
    pub pip_host: Option<Box<dyn PipHost>>,
}

/// State that must be read and modified under one lock
struct SessionCore {
    engine: Box<dyn MediaEngine>,
    texture: Box<dyn TextureEntry>,
    surface: Option<Box<dyn VideoSurface>>,
    machine: PlaybackStateMachine,
    pip: PipController,
    listener_id: Option<ListenerId>,
}

impl SessionCore {
    fn apply(&mut self, signal: EngineSignal) -> Vec<PlayerEvent> {
        match signal {
            EngineSignal::State(state) => {
                self.machine
                    .on_state_changed(state, self.engine.as_ref(), &mut self.pip)
            }
            EngineSignal::Error(message) => {
                log::error!("Engine error: {}", message);
                self.machine.on_error(&message)
            }
        }
    }
}

#[derive(Debug)]
enum EngineSignal {
    State(RawPlaybackState),
    Error(String),
}

enum CoreSlot {
    /// Subscribed but still wiring up; signals wait here in arrival order
    Starting(Vec<EngineSignal>),
    Live(SessionCore),
    Disposed,
}

struct SessionShared {
    core: Mutex<CoreSlot>,
    events: EventSink,
}

impl SessionShared {
    fn handle_signal(&self, signal: EngineSignal) {
        let events = {
            let mut guard = self.core.lock();
            match &mut *guard {
                CoreSlot::Starting(pending) => {
                    log::debug!("Deferring {:?} until the session is wired up", signal);
                    pending.push(signal);
                    return;
                }
                CoreSlot::Live(core) => core.apply(signal),
                CoreSlot::Disposed => {
                    log::debug!("Ignoring {:?} after dispose", signal);
                    return;
                }
            }
        };
        self.events.post_all(events);
    }

    /// Install the core and replay anything the engine reported while
    /// the session was still being constructed
    fn go_live(&self, mut core: SessionCore) {
        let events = {
            let mut guard = self.core.lock();
            let pending = match std::mem::replace(&mut *guard, CoreSlot::Disposed) {
                CoreSlot::Starting(pending) => pending,
                _ => Vec::new(),
            };
            if !pending.is_empty() {
                log::debug!("Replaying {} engine signals from startup", pending.len());
            }
            let events: Vec<PlayerEvent> = pending
                .into_iter()
                .flat_map(|signal| core.apply(signal))
                .collect();
            *guard = CoreSlot::Live(core);
            events
        };
        self.events.post_all(events);
    }
}

/// Engine subscription. Holds the session weakly so a lingering engine
/// callback never keeps a disposed session alive.
struct EngineSignalHandler {
    shared: Weak<SessionShared>,
}

impl EngineListener for EngineSignalHandler {
    fn on_playback_state_changed(&self, state: RawPlaybackState) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle_signal(EngineSignal::State(state));
        }
    }

    fn on_player_error(&self, message: String) {
        if let Some(shared) = self.shared.upgrade() {
            shared.handle_signal(EngineSignal::Error(message));
        }
    }
}

/// One playback session bound to a host texture
pub struct PlayerSession {
    texture_id: i64,
    shared: Arc<SessionShared>,
}

impl PlayerSession {
    /// Resolve the source, bind the surface, start preparing and subscribe
    /// to engine state changes.
    ///
    /// Source resolution happens first; an unsupported source fails before
    /// the engine or texture are touched. Engine signals that arrive on
    /// another thread before this returns are held and applied in order.
    pub fn new(config: SessionConfig, resources: SessionResources) -> Result<Self> {
        let source = MediaSourceResolver::resolve_spec(
            &config.data_source,
            config.format_hint.as_deref(),
            &config.http_headers,
        )?;

        let SessionResources {
            mut engine,
            mut texture,
            pip_host,
        } = resources;
        let texture_id = texture.id();
        log::info!(
            "Creating player {} for {} ({:?})",
            texture_id,
            source.uri,
            source.source_type
        );

        let surface = match texture.create_surface() {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface for player {}: {}", texture_id, e);
                if let Err(release_err) = engine.release() {
                    log::error!("Failed to release engine: {}", release_err);
                }
                if let Err(release_err) = texture.release() {
                    log::error!("Failed to release texture: {}", release_err);
                }
                return Err(e);
            }
        };
        engine.set_video_surface(surface.as_ref());
        engine.set_audio_attributes(AudioAttributes::default(), !config.options.mix_with_others);

        let shared = Arc::new(SessionShared {
            core: Mutex::new(CoreSlot::Starting(Vec::new())),
            events: EventSink::new(),
        });

        let handler = Arc::new(EngineSignalHandler {
            shared: Arc::downgrade(&shared),
        });
        let listener_id = engine.add_listener(handler);

        let mut machine = PlaybackStateMachine::new();
        engine.set_media_source(&source);
        engine.prepare();
        machine.mark_preparing();

        shared.go_live(SessionCore {
            engine,
            texture,
            surface: Some(surface),
            machine,
            pip: PipController::new(pip_host, config.screen_bounds),
            listener_id: Some(listener_id),
        });

        Ok(Self { texture_id, shared })
    }

    pub fn texture_id(&self) -> i64 {
        self.texture_id
    }

    fn with_core<R>(&self, f: impl FnOnce(&mut SessionCore) -> R) -> Result<R> {
        let mut guard = self.shared.core.lock();
        match &mut *guard {
            CoreSlot::Live(core) => Ok(f(core)),
            _ => {
                log::warn!("Player {} used after dispose", self.texture_id);
                Err(PlayerError::Disposed)
            }
        }
    }

    /// Attach the event listener, flushing anything queued while detached
    pub fn attach_listener(&self, listener: Arc<dyn EventListener>) {
        log::debug!("Listener attached to player {}", self.texture_id);
        self.shared.events.attach(listener);
    }

    pub fn detach_listener(&self) {
        log::debug!("Listener detached from player {}", self.texture_id);
        self.shared.events.detach();
    }

    pub fn play(&self) -> Result<()> {
        log::info!("play called");
        self.with_core(|core| core.engine.set_play_when_ready(true))
    }

    pub fn pause(&self) -> Result<()> {
        log::info!("pause called");
        self.with_core(|core| core.engine.set_play_when_ready(false))
    }

    pub fn set_looping(&self, looping: bool) -> Result<()> {
        log::info!("set_looping called -> {}", looping);
        let mode = if looping {
            RepeatMode::All
        } else {
            RepeatMode::Off
        };
        self.with_core(|core| core.engine.set_repeat_mode(mode))
    }

    /// Out-of-range values are clamped to `[0.0, 1.0]`; NaN is rejected
    /// and leaves the volume unchanged.
    pub fn set_volume(&self, volume: f64) -> Result<()> {
        if volume.is_nan() {
            log::warn!("set_volume called with NaN, ignoring");
            return self.with_core(|_| ());
        }
        let clamped = volume.clamp(0.0, 1.0) as f32;
        log::info!("set_volume called -> {} (applied {})", volume, clamped);
        self.with_core(|core| core.engine.set_volume(clamped))
    }

    pub fn set_playback_speed(&self, speed: f64) -> Result<()> {
        log::info!("set_playback_speed called -> {}", speed);
        self.with_core(|core| {
            core.engine
                .set_playback_parameters(PlaybackParameters::with_speed(speed as f32))
        })
    }

    pub fn seek_to(&self, position_ms: i64) -> Result<()> {
        log::info!("seek_to called -> {} ms", position_ms);
        self.with_core(|core| core.engine.seek_to(position_ms))
    }

    pub fn position(&self) -> Result<i64> {
        self.with_core(|core| core.engine.current_position_ms())
    }

    /// Display names of the handled audio tracks, in selection order
    pub fn audios(&self) -> Result<Vec<String>> {
        self.with_core(|core| match core.engine.mapped_track_info() {
            Some(info) => TrackCatalog::new(&info).audio_track_names(),
            None => Vec::new(),
        })
    }

    /// Pin the first audio track named `name`. Returns false, changing
    /// nothing, when no handled track has that name.
    pub fn set_audio(&self, name: &str) -> Result<bool> {
        log::info!("set_audio called -> {}", name);
        self.with_core(|core| {
            select_audio_track(core.engine.as_mut(), |catalog| catalog.find_by_name(name))
        })
    }

    /// Pin the audio track at `index` of [`PlayerSession::audios`]
    pub fn set_audio_by_index(&self, index: i32) -> Result<bool> {
        log::info!("set_audio_by_index called -> {}", index);
        let index = match usize::try_from(index) {
            Ok(index) => index,
            Err(_) => {
                log::warn!("Negative audio track index {}", index);
                return self.with_core(|_| false);
            }
        };
        self.with_core(|core| {
            select_audio_track(core.engine.as_mut(), |catalog| catalog.find_by_index(index))
        })
    }

    pub fn enter_picture_in_picture(&self) -> Result<()> {
        log::info!("enter_picture_in_picture called");
        self.with_core(|core| core.pip.enter())
    }

    /// Host notification that the activity entered or left PiP mode
    pub fn on_picture_in_picture_mode_changed(&self, in_pip: bool) -> Result<()> {
        self.with_core(|_| ())?;
        self.shared.events.post(if in_pip {
            PlayerEvent::StartingPiP
        } else {
            PlayerEvent::StoppedPiP
        });
        Ok(())
    }

    pub fn phase(&self) -> Result<PlaybackPhase> {
        self.with_core(|core| core.machine.phase())
    }

    pub fn is_initialized(&self) -> Result<bool> {
        self.with_core(|core| core.machine.is_initialized())
    }

    pub fn is_buffering(&self) -> Result<bool> {
        self.with_core(|core| core.machine.is_buffering())
    }

    /// Session bounds; aspect-corrected after initialization
    pub fn bounds(&self) -> Result<Rect> {
        self.with_core(|core| core.pip.bounds())
    }

    pub fn is_disposed(&self) -> bool {
        matches!(*self.shared.core.lock(), CoreSlot::Disposed)
    }

    /// Release everything the session owns. Every step runs even if an
    /// earlier one fails; the first failures are reported together.
    /// A second call is a no-op.
    pub fn dispose(&self) -> Result<()> {
        let slot = std::mem::replace(&mut *self.shared.core.lock(), CoreSlot::Disposed);
        let mut core = match slot {
            CoreSlot::Live(core) => core,
            _ => {
                log::warn!("Player {} already disposed", self.texture_id);
                return Ok(());
            }
        };
        log::info!("Disposing player {}", self.texture_id);

        let mut failures = Vec::new();

        core.pip.remove_options();

        if let Some(id) = core.listener_id.take() {
            core.engine.remove_listener(id);
        }

        if core.machine.is_initialized() {
            if let Err(e) = core.engine.stop() {
                failures.push(format!("stop: {}", e));
            }
        }

        if let Err(e) = core.texture.release() {
            failures.push(format!("texture: {}", e));
        }

        self.shared.events.detach();

        if let Some(mut surface) = core.surface.take() {
            if let Err(e) = surface.release() {
                failures.push(format!("surface: {}", e));
            }
        }

        if let Err(e) = core.engine.release() {
            failures.push(format!("engine: {}", e));
        }

        if failures.is_empty() {
            Ok(())
        } else {
            for failure in &failures {
                log::error!("Player {} release step failed: {}", self.texture_id, failure);
            }
            Err(PlayerError::Release(failures.join("; ")))
        }
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        if !self.is_disposed() {
            if let Err(e) = self.dispose() {
                log::error!("Dispose on drop failed: {}", e);
            }
        }
    }
}

fn select_audio_track(
    engine: &mut dyn MediaEngine,
    pick: impl FnOnce(&TrackCatalog) -> Option<TrackDescriptor>,
) -> bool {
    let info = match engine.mapped_track_info() {
        Some(info) => info,
        None => {
            log::warn!("No mapped track info yet, ignoring audio selection");
            return false;
        }
    };

    match pick(&TrackCatalog::new(&info)) {
        Some(track) => {
            let mut parameters = engine.track_selection_parameters();
            parameters.pin_track(&track);
            engine.set_track_selection_parameters(parameters);
            log::info!(
                "Selected audio track '{}' at {}/{}/{}",
                track.name,
                track.renderer_index,
                track.group_index,
                track.track_index
            );
            true
        }
        None => {
            log::warn!("No matching audio track, selection unchanged");
            false
        }
    }
}
