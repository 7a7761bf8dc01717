// Terminal commands for the desktop front end

use std::fmt;
use std::path::PathBuf;

/// One line of user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Pick a file (the desktop stand-in for the file picker)
    Open(PathBuf),
    /// Play/pause button
    Toggle,
    /// Drag the seek bar to a position in seconds
    Seek(f32),
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    MissingArgument(&'static str),
    InvalidPosition(String),
    Unknown(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "Empty command"),
            ParseError::MissingArgument(cmd) => write!(f, "'{}' needs an argument", cmd),
            ParseError::InvalidPosition(pos) => {
                write!(f, "Invalid position '{}' (use seconds or MM:SS)", pos)
            }
            ParseError::Unknown(cmd) => write!(f, "Unknown command '{}' (try 'help')", cmd),
        }
    }
}

impl std::error::Error for ParseError {}

pub const HELP: &str = "\
Commands:
  open <path>        pick an audio file
  p | play | pause   toggle playback
  seek <secs|MM:SS>  move the seek bar
  help               show this message
  q | quit           exit";

pub fn parse(line: &str) -> Result<Command, ParseError> {
    let line = line.trim();
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    match name.to_ascii_lowercase().as_str() {
        "" => Err(ParseError::Empty),
        "open" | "o" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("open"));
            }
            Ok(Command::Open(PathBuf::from(unquote(rest))))
        }
        "p" | "play" | "pause" => Ok(Command::Toggle),
        "seek" | "s" => {
            if rest.is_empty() {
                return Err(ParseError::MissingArgument("seek"));
            }
            parse_position(rest).map(Command::Seek)
        }
        "help" | "h" | "?" => Ok(Command::Help),
        "q" | "quit" | "exit" => Ok(Command::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Seconds (`93`, `93.5`) or `MM:SS` (`1:33`)
pub fn parse_position(text: &str) -> Result<f32, ParseError> {
    let invalid = || ParseError::InvalidPosition(text.to_string());

    let seconds = match text.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
            let seconds: f32 = seconds.parse().map_err(|_| invalid())?;
            if !(0.0..60.0).contains(&seconds) {
                return Err(invalid());
            }
            minutes as f32 * 60.0 + seconds
        }
        None => text.parse().map_err(|_| invalid())?,
    };

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(invalid());
    }
    Ok(seconds)
}

fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}
