// Player screen: selected adapter, visual seek state and the interpolation driving it

use crate::animation::{SeekAnimation, Tick};
use crate::callback::{ObserverList, ScreenEvent, ScreenObserver};
use crate::config::ScreenConfig;
use crate::error::{AudioError, Result};
use crate::player::{AudioPlayer, PlayerFactory};
use crate::scheduler::FrameScheduler;
use crate::source::AudioSource;
use crate::state::{sanitize_duration, PlaybackState};
use crate::time::time_string;
use std::sync::Arc;
use std::time::Instant;

/// Icon of the play/pause button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayPauseIcon {
    Play,
    Pause,
}

/// Main area of the screen
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenContent {
    /// Nothing picked yet
    NoSelection { placeholder: String },
    /// The last pick could not be opened
    Failed { message: String },
    /// A track is loaded
    Player {
        title: Option<String>,
        position: f32,
        duration: f32,
        elapsed: String,
        total: String,
        icon: PlayPauseIcon,
    },
}

/// Render model handed to whatever draws the screen
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenView {
    pub content: ScreenContent,
    pub pick_label: String,
}

/// Owns the current adapter and keeps the seek bar in step with it.
///
/// Lives on the UI thread. The event loop feeds it user input
/// ([`select_source`](Self::select_source), [`toggle_play_pause`](Self::toggle_play_pause),
/// [`seek`](Self::seek)) and wakes it at [`next_deadline`](Self::next_deadline)
/// to run [`poll`](Self::poll).
pub struct PlayerScreen {
    config: ScreenConfig,
    factory: Box<dyn PlayerFactory>,
    player: Option<Box<dyn AudioPlayer>>,
    state: Option<PlaybackState>,
    last_error: Option<String>,
    animation: SeekAnimation,
    frames: FrameScheduler,
    observers: ObserverList,
}

impl PlayerScreen {
    pub fn new(factory: impl PlayerFactory + 'static, config: ScreenConfig) -> Self {
        let frames = FrameScheduler::new(config.frame_interval);
        Self {
            config,
            factory: Box::new(factory),
            player: None,
            state: None,
            last_error: None,
            animation: SeekAnimation::default(),
            frames,
            observers: ObserverList::new(),
        }
    }

    pub fn add_observer(&mut self, observer: Arc<dyn ScreenObserver>) {
        self.observers.add(observer);
    }

    pub fn config(&self) -> &ScreenConfig {
        &self.config
    }

    /// Playback state of the loaded track, `None` while nothing is selected
    pub fn state(&self) -> Option<&PlaybackState> {
        self.state.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.animation.is_running()
    }

    /// Number of interpolations currently live (0 or 1)
    pub fn active_animations(&self) -> usize {
        usize::from(self.animation.is_running())
    }

    /// Frame callbacks still queued, stale ones included
    pub fn pending_frames(&self) -> usize {
        self.frames.pending()
    }

    /// Handle the file picker result.
    ///
    /// `None` means the picker was cancelled and nothing changes. Otherwise
    /// the current adapter is dropped before the new one is constructed. A
    /// construction failure is returned and leaves the screen in the failed
    /// state until the user picks again.
    pub fn select_source(&mut self, source: Option<AudioSource>) -> Result<()> {
        let Some(source) = source else {
            log::debug!("File picker cancelled");
            return Ok(());
        };

        if !source.is_audio() {
            log::warn!("Rejected non-audio selection: {}", source);
            return Err(AudioError::UnsupportedFormat(format!(
                "{} is not an audio file",
                source.name()
            )));
        }

        self.release_player();

        log::info!("Opening {}", source);
        match self.factory.open(source) {
            Ok(player) => {
                let state = PlaybackState::new(player.duration(), player.title().map(str::to_owned));
                log::info!(
                    "Loaded {:?} ({})",
                    state.title.as_deref().unwrap_or("untitled"),
                    time_string(state.duration)
                );
                self.observers.dispatch(ScreenEvent::SourceLoaded {
                    title: state.title.clone(),
                    duration: state.duration,
                });
                self.player = Some(player);
                self.state = Some(state);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to open source: {}", e);
                self.last_error = Some(e.to_string());
                self.observers.dispatch(ScreenEvent::SourceFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Play/pause button.
    ///
    /// Forwards to the adapter, then starts or cancels the interpolation. A
    /// run that had already reached the end is rewound to zero first.
    pub fn toggle_play_pause(&mut self, now: Instant) -> Result<()> {
        self.refresh_duration();
        let (Some(player), Some(state)) = (self.player.as_mut(), self.state.as_mut()) else {
            return Err(AudioError::NoSource);
        };

        if self.animation.is_running() {
            set_native_playing(player.as_mut(), false);
            let frozen = self.animation.stop(now);
            state.position = frozen;
            state.is_playing = false;
            log::info!("Paused at {}", time_string(frozen));
            self.observers.dispatch(ScreenEvent::PositionChanged { position: frozen });
            self.observers.dispatch(ScreenEvent::PlayingChanged { playing: false });
            return Ok(());
        }

        if !state.duration_known() {
            log::warn!("Play requested before the duration is known");
            return Err(AudioError::PlaybackError("Duration not known yet".to_string()));
        }

        if state.at_end() {
            self.animation.snap_to(0.0);
            state.position = 0.0;
            if let Err(e) = player.seek_to(0.0) {
                log::warn!("Native rewind failed: {}", e);
            }
            self.observers.dispatch(ScreenEvent::PositionChanged { position: 0.0 });
        }

        set_native_playing(player.as_mut(), true);
        let token = self.animation.start(state.duration, now);
        self.frames.schedule(token, now);
        state.is_playing = true;
        log::info!("Playing from {}", time_string(state.position));
        self.observers.dispatch(ScreenEvent::PlayingChanged { playing: true });
        Ok(())
    }

    /// Slider drag.
    ///
    /// Clamps to `[0, duration]`, moves the visual position, restarts the
    /// interpolation if it was running and forwards the position to the adapter.
    pub fn seek(&mut self, position: f32, now: Instant) -> Result<()> {
        self.refresh_duration();
        let (Some(player), Some(state)) = (self.player.as_mut(), self.state.as_mut()) else {
            return Err(AudioError::NoSource);
        };

        let position = state.clamp_position(position);
        let was_running = self.animation.is_running();

        self.animation.snap_to(position);
        state.position = position;
        if was_running {
            let token = self.animation.start(state.duration, now);
            self.frames.schedule(token, now);
        }

        log::debug!("Seek to {}", time_string(position));
        if let Err(e) = player.seek_to(position) {
            log::warn!("Native seek failed: {}", e);
        }
        self.observers.dispatch(ScreenEvent::PositionChanged { position });
        Ok(())
    }

    /// Wake-up time for the event loop
    pub fn next_deadline(&self, now: Instant) -> Option<Instant> {
        let awaiting_duration = self
            .player
            .as_ref()
            .is_some_and(|player| player.duration_pending())
            && self.state.as_ref().is_some_and(|state| !state.duration_known());
        let duration_poll = awaiting_duration.then(|| now + self.config.frame_interval);

        match (self.frames.next_deadline(), duration_poll) {
            (Some(frame), Some(poll)) => Some(frame.min(poll)),
            (frame, poll) => frame.or(poll),
        }
    }

    /// Run every frame callback due at `now`; returns how many moved the seek bar
    pub fn poll(&mut self, now: Instant) -> usize {
        self.refresh_duration();

        let mut applied = 0;
        while let Some(request) = self.frames.pop_due(now) {
            let Some(state) = self.state.as_mut() else {
                continue;
            };
            match self.animation.tick(request.token, now) {
                Tick::Stale => {
                    log::debug!(
                        "Dropping stale frame for animation {}",
                        request.token.generation()
                    );
                }
                Tick::Advanced(position) => {
                    state.position = position;
                    self.frames.schedule(request.token, now);
                    self.observers.dispatch(ScreenEvent::PositionChanged { position });
                    applied += 1;
                }
                Tick::Finished(position) => {
                    state.position = position;
                    state.is_playing = false;
                    log::info!("Reached end of track");
                    self.observers.dispatch(ScreenEvent::PositionChanged { position });
                    self.observers.dispatch(ScreenEvent::PlayingChanged { playing: false });
                    applied += 1;
                }
            }
        }
        applied
    }

    pub fn view(&self) -> ScreenView {
        let content = match (&self.state, &self.last_error) {
            (Some(state), _) => ScreenContent::Player {
                title: state.title.clone(),
                position: state.position,
                duration: state.duration,
                elapsed: time_string(state.position),
                total: time_string(state.duration),
                icon: if self.animation.is_running() {
                    PlayPauseIcon::Pause
                } else {
                    PlayPauseIcon::Play
                },
            },
            (None, Some(message)) => ScreenContent::Failed {
                message: message.clone(),
            },
            (None, None) => ScreenContent::NoSelection {
                placeholder: self.config.placeholder.clone(),
            },
        };
        ScreenView {
            content,
            pick_label: self.config.pick_label.clone(),
        }
    }

    /// Adopt the adapter's duration the first time it becomes known
    fn refresh_duration(&mut self) {
        let (Some(player), Some(state)) = (self.player.as_ref(), self.state.as_mut()) else {
            return;
        };
        if state.duration_known() {
            return;
        }
        let duration = sanitize_duration(player.duration());
        if duration > 0.0 {
            state.duration = duration;
            log::info!("Duration known: {}", time_string(duration));
            self.observers.dispatch(ScreenEvent::DurationKnown { duration });
        }
    }

    fn release_player(&mut self) {
        let was_playing = self.animation.is_running();
        self.animation.snap_to(0.0);
        self.frames.clear();
        self.state = None;
        if let Some(player) = self.player.take() {
            log::info!("Releasing previous player");
            drop(player);
        }
        if was_playing {
            self.observers.dispatch(ScreenEvent::PlayingChanged { playing: false });
        }
    }
}

/// Toggle the native player only when it is not already in the wanted state.
/// It can run on past the visual end (output latency, truncated durations) or
/// stop before a pause arrives.
fn set_native_playing(player: &mut dyn AudioPlayer, playing: bool) {
    if player.is_playing() == playing {
        log::debug!("Native player already {}", if playing { "playing" } else { "paused" });
        return;
    }
    if let Err(e) = player.play_pause() {
        log::warn!("Native {} failed: {}", if playing { "play" } else { "pause" }, e);
    }
}
