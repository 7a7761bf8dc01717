// Change notifications from the player screen to the redraw side

use std::sync::Arc;

/// Screen event types
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenEvent {
    /// A new source was opened and its adapter is ready
    SourceLoaded {
        title: Option<String>,
        duration: f32,
    },

    /// The selected source could not be opened
    SourceFailed { message: String },

    /// Duration became known after loading (browser metadata arrives late)
    DurationKnown { duration: f32 },

    /// Visual seek position changed (manual seek or interpolation frame)
    PositionChanged { position: f32 },

    /// Interpolation started or stopped
    PlayingChanged { playing: bool },
}

/// Screen observer trait
/// Implementations should only schedule a redraw; they must not call back into the screen
pub trait ScreenObserver {
    fn on_event(&self, event: &ScreenEvent);
}

/// Observer list for handling multiple redraw targets
#[derive(Default)]
pub struct ObserverList {
    observers: Vec<Arc<dyn ScreenObserver>>,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, observer: Arc<dyn ScreenObserver>) {
        self.observers.push(observer);
    }

    pub fn clear(&mut self) {
        self.observers.clear();
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn dispatch(&self, event: ScreenEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }
}

/// Observer that records every event, for tests
#[cfg(test)]
pub struct RecordingObserver {
    events: parking_lot::Mutex<Vec<ScreenEvent>>,
}

#[cfg(test)]
impl RecordingObserver {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<ScreenEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[cfg(test)]
impl ScreenObserver for RecordingObserver {
    fn on_event(&self, event: &ScreenEvent) {
        self.events.lock().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch_reaches_every_observer() {
        let first = Arc::new(RecordingObserver::new());
        let second = Arc::new(RecordingObserver::new());
        let mut list = ObserverList::new();
        list.add(first.clone());
        list.add(second.clone());

        list.dispatch(ScreenEvent::PlayingChanged { playing: true });

        assert_eq!(first.events(), vec![ScreenEvent::PlayingChanged { playing: true }]);
        assert_eq!(second.events().len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut list = ObserverList::new();
        list.add(Arc::new(RecordingObserver::new()));
        assert_eq!(list.len(), 1);
        list.clear();
        assert!(list.is_empty());
    }
}
