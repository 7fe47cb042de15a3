// Player events and the queuing sink that delivers them to a listener

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Error code carried by every engine-reported error event
pub const VIDEO_ERROR_CODE: &str = "VideoError";

/// Lifecycle and error events emitted by a player session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum PlayerEvent {
    BufferingStart,
    BufferingEnd,
    /// Buffered ranges as `[start, end]` pairs in milliseconds
    BufferingUpdate { values: Vec<[i64; 2]> },
    /// Emitted once, the first time the engine is ready.
    /// Video fields are absent for audio-only media.
    Initialized {
        duration: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        width: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<i32>,
        #[serde(rename = "pipEnable", skip_serializing_if = "Option::is_none")]
        pip_enable: Option<bool>,
    },
    Completed,
    Error { code: String, message: String },
    #[serde(rename = "startingPiP")]
    StartingPiP,
    #[serde(rename = "stoppedPiP")]
    StoppedPiP,
}

impl PlayerEvent {
    pub fn buffering_update(buffered_position_ms: i64) -> Self {
        PlayerEvent::BufferingUpdate {
            values: vec![[0, buffered_position_ms]],
        }
    }

    pub fn video_error(message: impl Into<String>) -> Self {
        PlayerEvent::Error {
            code: VIDEO_ERROR_CODE.to_string(),
            message: message.into(),
        }
    }

    /// Wire name of the event tag
    pub fn name(&self) -> &'static str {
        match self {
            PlayerEvent::BufferingStart => "bufferingStart",
            PlayerEvent::BufferingEnd => "bufferingEnd",
            PlayerEvent::BufferingUpdate { .. } => "bufferingUpdate",
            PlayerEvent::Initialized { .. } => "initialized",
            PlayerEvent::Completed => "completed",
            PlayerEvent::Error { .. } => "error",
            PlayerEvent::StartingPiP => "startingPiP",
            PlayerEvent::StoppedPiP => "stoppedPiP",
        }
    }

    /// Map-shaped payload for hosts that forward events over a message channel
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Receiver of player events.
/// Implementations should return quickly and must not call back into the
/// sink that is delivering to them.
pub trait EventListener: Send + Sync {
    fn on_event(&self, event: PlayerEvent);
}

struct SinkState {
    listener: Option<Arc<dyn EventListener>>,
    backlog: VecDeque<PlayerEvent>,
    /// Set while one caller is delivering the backlog
    draining: bool,
}

/// FIFO event queue in front of an optional listener.
///
/// While no listener is attached, events accumulate in a backlog that is
/// flushed, oldest first, on the next `attach`.
///
/// Listeners are called without the sink lock held, so a listener may post,
/// detach, or dispose the owning session from inside `on_event`. Only one
/// caller delivers at a time; events posted meanwhile are delivered by that
/// caller, in order, before it returns.
pub struct EventSink {
    state: Mutex<SinkState>,
}

impl EventSink {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SinkState {
                listener: None,
                backlog: VecDeque::new(),
                draining: false,
            }),
        }
    }

    pub fn post(&self, event: PlayerEvent) {
        {
            let mut state = self.state.lock();
            if state.listener.is_none() {
                log::debug!("No listener, queuing event: {}", event.name());
            }
            state.backlog.push_back(event);
        }
        self.drain();
    }

    /// Queue a batch under a single lock so no other post interleaves
    pub fn post_all(&self, events: impl IntoIterator<Item = PlayerEvent>) {
        self.state.lock().backlog.extend(events);
        self.drain();
    }

    /// Replace the listener and flush the backlog to it
    pub fn attach(&self, listener: Arc<dyn EventListener>) {
        {
            let mut state = self.state.lock();
            if !state.backlog.is_empty() {
                log::debug!("Flushing {} queued events to new listener", state.backlog.len());
            }
            state.listener = Some(listener);
        }
        self.drain();
    }

    pub fn detach(&self) {
        self.state.lock().listener = None;
    }

    pub fn has_listener(&self) -> bool {
        self.state.lock().listener.is_some()
    }

    /// Events queued and not yet handed to a listener
    pub fn pending(&self) -> usize {
        self.state.lock().backlog.len()
    }

    fn drain(&self) {
        {
            let mut state = self.state.lock();
            if state.draining || state.listener.is_none() {
                return;
            }
            state.draining = true;
        }

        loop {
            let (listener, event) = {
                let mut state = self.state.lock();
                let next = match state.listener.clone() {
                    Some(listener) => state.backlog.pop_front().map(|event| (listener, event)),
                    None => None,
                };
                match next {
                    Some(next) => next,
                    None => {
                        state.draining = false;
                        return;
                    }
                }
            };

            log::debug!("Delivering event: {}", event.name());
            listener.on_event(event);
        }
    }
}

impl Default for EventSink {
    fn default() -> Self {
        Self::new()
    }
}

/// Listener that records every event, for tests
#[cfg(test)]
pub struct TestListener {
    events: Mutex<Vec<PlayerEvent>>,
}

#[cfg(test)]
impl TestListener {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<PlayerEvent> {
        self.events.lock().clone()
    }
}

#[cfg(test)]
impl EventListener for TestListener {
    fn on_event(&self, event: PlayerEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_backlog_flushed_on_attach_in_order() {
        let sink = EventSink::new();
        sink.post(PlayerEvent::BufferingStart);
        sink.post(PlayerEvent::buffering_update(500));
        sink.post(PlayerEvent::BufferingEnd);
        assert_eq!(sink.pending(), 3);

        let listener = Arc::new(TestListener::new());
        sink.attach(listener.clone());

        assert_eq!(
            listener.get_events(),
            vec![
                PlayerEvent::BufferingStart,
                PlayerEvent::buffering_update(500),
                PlayerEvent::BufferingEnd,
            ]
        );
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_events_forwarded_while_attached() {
        let sink = EventSink::new();
        let listener = Arc::new(TestListener::new());
        sink.attach(listener.clone());

        sink.post(PlayerEvent::Completed);
        sink.post_all(vec![PlayerEvent::StartingPiP, PlayerEvent::StoppedPiP]);

        assert_eq!(
            listener.get_events(),
            vec![PlayerEvent::Completed, PlayerEvent::StartingPiP, PlayerEvent::StoppedPiP]
        );
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_detach_resumes_backlogging() {
        let sink = EventSink::new();
        let first = Arc::new(TestListener::new());
        sink.attach(first.clone());
        sink.post(PlayerEvent::BufferingStart);

        sink.detach();
        assert!(!sink.has_listener());
        sink.post(PlayerEvent::BufferingEnd);
        sink.post(PlayerEvent::Completed);

        let second = Arc::new(TestListener::new());
        sink.attach(second.clone());
        sink.post(PlayerEvent::StoppedPiP);

        assert_eq!(first.get_events(), vec![PlayerEvent::BufferingStart]);
        assert_eq!(
            second.get_events(),
            vec![PlayerEvent::BufferingEnd, PlayerEvent::Completed, PlayerEvent::StoppedPiP]
        );
    }

    #[test]
    fn test_attach_replaces_listener() {
        let sink = EventSink::new();
        let first = Arc::new(TestListener::new());
        let second = Arc::new(TestListener::new());
        sink.attach(first.clone());
        sink.attach(second.clone());

        sink.post(PlayerEvent::Completed);
        assert!(first.get_events().is_empty());
        assert_eq!(second.get_events(), vec![PlayerEvent::Completed]);
    }

    /// Calls back into the sink from inside `on_event`
    struct ReentrantListener {
        sink: std::sync::Weak<EventSink>,
        events: Mutex<Vec<PlayerEvent>>,
    }

    impl EventListener for ReentrantListener {
        fn on_event(&self, event: PlayerEvent) {
            self.events.lock().push(event.clone());
            let sink = match self.sink.upgrade() {
                Some(sink) => sink,
                None => return,
            };
            match event {
                PlayerEvent::BufferingStart => sink.post(PlayerEvent::buffering_update(100)),
                PlayerEvent::Completed => sink.detach(),
                _ => {}
            }
        }
    }

    fn reentrant(sink: &Arc<EventSink>) -> Arc<ReentrantListener> {
        Arc::new(ReentrantListener {
            sink: Arc::downgrade(sink),
            events: Mutex::new(Vec::new()),
        })
    }

    #[test]
    fn test_post_from_listener_is_queued_in_order() {
        let sink = Arc::new(EventSink::new());
        let listener = reentrant(&sink);
        sink.attach(listener.clone());

        sink.post_all(vec![PlayerEvent::BufferingStart, PlayerEvent::BufferingEnd]);

        assert_eq!(
            *listener.events.lock(),
            vec![
                PlayerEvent::BufferingStart,
                PlayerEvent::BufferingEnd,
                PlayerEvent::buffering_update(100),
            ]
        );
        assert_eq!(sink.pending(), 0);
    }

    #[test]
    fn test_detach_from_listener_keeps_rest_queued() {
        let sink = Arc::new(EventSink::new());
        let listener = reentrant(&sink);
        sink.attach(listener.clone());

        sink.post_all(vec![PlayerEvent::Completed, PlayerEvent::StartingPiP]);

        assert_eq!(*listener.events.lock(), vec![PlayerEvent::Completed]);
        assert!(!sink.has_listener());
        assert_eq!(sink.pending(), 1);

        let next = Arc::new(TestListener::new());
        sink.attach(next.clone());
        assert_eq!(next.get_events(), vec![PlayerEvent::StartingPiP]);
    }

    #[test]
    fn test_wire_shape() {
        assert_eq!(PlayerEvent::BufferingStart.to_json(), json!({"event": "bufferingStart"}));
        assert_eq!(
            PlayerEvent::buffering_update(1500).to_json(),
            json!({"event": "bufferingUpdate", "values": [[0, 1500]]})
        );
        assert_eq!(
            PlayerEvent::Initialized {
                duration: 60_000,
                width: Some(1920),
                height: Some(1080),
                pip_enable: Some(true),
            }
            .to_json(),
            json!({
                "event": "initialized",
                "duration": 60_000,
                "width": 1920,
                "height": 1080,
                "pipEnable": true
            })
        );
        assert_eq!(
            PlayerEvent::Initialized {
                duration: 3_000,
                width: None,
                height: None,
                pip_enable: None,
            }
            .to_json(),
            json!({"event": "initialized", "duration": 3_000})
        );
        assert_eq!(
            PlayerEvent::video_error("boom").to_json(),
            json!({"event": "error", "code": "VideoError", "message": "boom"})
        );
        assert_eq!(PlayerEvent::StartingPiP.to_json(), json!({"event": "startingPiP"}));
    }

    #[test]
    fn test_names_match_wire_tags() {
        let events = [
            PlayerEvent::BufferingStart,
            PlayerEvent::BufferingEnd,
            PlayerEvent::buffering_update(0),
            PlayerEvent::Completed,
            PlayerEvent::video_error("x"),
            PlayerEvent::StartingPiP,
            PlayerEvent::StoppedPiP,
        ];
        for event in events {
            assert_eq!(event.to_json()["event"], event.name());
        }
    }
}
