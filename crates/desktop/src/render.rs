// Text rendering of the screen model

use musicplayer_core::{PlayPauseIcon, ScreenContent, ScreenEvent, ScreenObserver, ScreenView};
use std::cell::Cell;

/// Width of the seek bar in characters
const BAR_WIDTH: usize = 30;

/// Marks the screen dirty whenever it reports a change
#[derive(Debug, Default)]
pub struct RedrawFlag {
    dirty: Cell<bool>,
}

impl RedrawFlag {
    pub fn new() -> Self {
        Self {
            dirty: Cell::new(true),
        }
    }

    /// Returns whether a redraw was requested and clears the request
    pub fn take(&self) -> bool {
        self.dirty.replace(false)
    }
}

impl ScreenObserver for RedrawFlag {
    fn on_event(&self, event: &ScreenEvent) {
        if !matches!(event, ScreenEvent::PositionChanged { .. }) {
            log::debug!("Screen event: {:?}", event);
        }
        self.dirty.set(true);
    }
}

/// Single status line for the current view
pub fn render(view: &ScreenView) -> String {
    match &view.content {
        ScreenContent::NoSelection { placeholder } => {
            format!("{}  [{}]", placeholder, view.pick_label)
        }
        ScreenContent::Failed { message } => {
            format!("Could not open song: {}  [{}]", message, view.pick_label)
        }
        ScreenContent::Player {
            title,
            position,
            duration,
            elapsed,
            total,
            icon,
        } => {
            let icon = match icon {
                PlayPauseIcon::Play => "|>",
                PlayPauseIcon::Pause => "||",
            };
            format!(
                "{}  {} {} [{}] {}",
                title.as_deref().unwrap_or("Unknown title"),
                icon,
                elapsed,
                seek_bar(*position, *duration),
                total
            )
        }
    }
}

fn seek_bar(position: f32, duration: f32) -> String {
    let filled = if duration > 0.0 {
        ((position / duration).clamp(0.0, 1.0) * BAR_WIDTH as f32).round() as usize
    } else {
        0
    };
    let mut bar = "=".repeat(filled);
    bar.push_str(&" ".repeat(BAR_WIDTH - filled));
    bar
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player_view(position: f32, duration: f32, icon: PlayPauseIcon) -> ScreenView {
        ScreenView {
            content: ScreenContent::Player {
                title: Some("Intro".to_string()),
                position,
                duration,
                elapsed: musicplayer_core::time_string(position),
                total: musicplayer_core::time_string(duration),
                icon,
            },
            pick_label: "Pick a song from storage".to_string(),
        }
    }

    #[test]
    fn test_render_placeholder() {
        let view = ScreenView {
            content: ScreenContent::NoSelection {
                placeholder: "Song not selected.".to_string(),
            },
            pick_label: "Pick a song from storage".to_string(),
        };
        assert_eq!(render(&view), "Song not selected.  [Pick a song from storage]");
    }

    #[test]
    fn test_render_player_line() {
        let line = render(&player_view(30.0, 60.0, PlayPauseIcon::Pause));
        assert!(line.starts_with("Intro  || 00:30 ["));
        assert!(line.ends_with("] 01:00"));
        assert_eq!(line.matches('=').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_seek_bar_bounds() {
        assert_eq!(seek_bar(0.0, 0.0).trim(), "");
        assert_eq!(seek_bar(90.0, 60.0), "=".repeat(BAR_WIDTH));
        assert_eq!(seek_bar(0.0, 60.0).len(), BAR_WIDTH);
    }

    #[test]
    fn test_redraw_flag() {
        let flag = RedrawFlag::new();
        assert!(flag.take());
        assert!(!flag.take());
        flag.on_event(&ScreenEvent::PlayingChanged { playing: true });
        assert!(flag.take());
    }
}
