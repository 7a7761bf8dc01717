// User-selected audio file handle

use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions accepted by the audio file picker filter
const AUDIO_EXTENSIONS: &[&str] = &[
    "aac", "aif", "aiff", "alac", "caf", "flac", "m4a", "m4b", "mka", "mp1", "mp2", "mp3",
    "mp4", "oga", "ogg", "opus", "wav", "wave", "weba", "webm",
];

/// Where the selected file lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    /// Local filesystem path
    Path(PathBuf),
    /// URI handed out by the platform picker (`file:`, `content:`, `blob:`)
    Uri(String),
}

/// Opaque handle to a user-chosen audio file.
///
/// Created by the file picker and moved into the adapter constructor. The
/// screen does not keep it once the player is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioSource {
    location: SourceLocation,
    name: String,
}

impl AudioSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            location: SourceLocation::Path(path),
            name,
        }
    }

    pub fn from_uri(uri: impl Into<String>) -> Self {
        let uri = uri.into();
        let segment = uri
            .rsplit('/')
            .find(|segment| !segment.is_empty())
            .unwrap_or(uri.as_str());
        let name = urlencoding::decode(segment)
            .map(|name| name.into_owned())
            .unwrap_or_else(|_| segment.to_string());
        Self {
            location: SourceLocation::Uri(uri),
            name,
        }
    }

    /// Override the display name (pickers usually know the original file name)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn location(&self) -> &SourceLocation {
        &self.location
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Local filesystem path, if the source is a path or a `file://` URI.
    /// Percent escapes in the URI are decoded; an empty or `localhost` host is accepted.
    pub fn local_path(&self) -> Option<PathBuf> {
        match &self.location {
            SourceLocation::Path(path) => Some(path.clone()),
            SourceLocation::Uri(uri) => {
                let rest = uri.strip_prefix("file://")?;
                let path = rest.strip_prefix("localhost").unwrap_or(rest);
                if !path.starts_with('/') {
                    return None;
                }
                let decoded = urlencoding::decode(path).ok()?;
                Some(PathBuf::from(decoded.as_ref()))
            }
        }
    }

    /// The source as a URI string (paths are rendered as `file://` URIs)
    pub fn uri(&self) -> String {
        match &self.location {
            SourceLocation::Path(path) => format!("file://{}", path.display()),
            SourceLocation::Uri(uri) => uri.clone(),
        }
    }

    /// Audio-type filter applied by the picker.
    ///
    /// `content:` and `blob:` URIs come from OS pickers that already filtered
    /// by MIME type, so they are accepted as-is.
    pub fn is_audio(&self) -> bool {
        match &self.location {
            SourceLocation::Path(path) => has_audio_extension(path),
            SourceLocation::Uri(uri) => {
                if uri.starts_with("content:") || uri.starts_with("blob:") {
                    return true;
                }
                has_audio_extension(Path::new(&self.name))
            }
        }
    }
}

impl fmt::Display for AudioSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.location {
            SourceLocation::Path(path) => write!(f, "{}", path.display()),
            SourceLocation::Uri(uri) => write!(f, "{}", uri),
        }
    }
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_source_name_and_uri() {
        let source = AudioSource::from_path("/music/Song One.mp3");
        assert_eq!(source.name(), "Song One.mp3");
        assert_eq!(source.uri(), "file:///music/Song One.mp3");
        assert_eq!(source.local_path(), Some(PathBuf::from("/music/Song One.mp3")));
    }

    #[test]
    fn test_uri_source() {
        let source = AudioSource::from_uri("file:///sdcard/Music/track.flac");
        assert_eq!(source.name(), "track.flac");
        assert_eq!(source.local_path(), Some(PathBuf::from("/sdcard/Music/track.flac")));

        let content = AudioSource::from_uri("content://media/external/audio/media/42");
        assert_eq!(content.local_path(), None);
        assert_eq!(content.uri(), "content://media/external/audio/media/42");
    }

    #[test]
    fn test_file_uri_escapes_are_decoded() {
        let source = AudioSource::from_uri("file:///Music/My%20Song.mp3");
        assert_eq!(source.name(), "My Song.mp3");
        assert_eq!(source.local_path(), Some(PathBuf::from("/Music/My Song.mp3")));
        assert!(source.is_audio());

        let localhost = AudioSource::from_uri("file://localhost/Music/%C3%A9t%C3%A9.ogg");
        assert_eq!(localhost.local_path(), Some(PathBuf::from("/Music/été.ogg")));

        // Remote hosts and broken escapes are not local files
        assert_eq!(AudioSource::from_uri("file://server/share/a.mp3").local_path(), None);
        assert_eq!(AudioSource::from_uri("file:///Music/%FF.mp3").local_path(), None);
    }

    #[test]
    fn test_audio_filter() {
        assert!(AudioSource::from_path("a/b/c.MP3").is_audio());
        assert!(AudioSource::from_path("c.ogg").is_audio());
        assert!(!AudioSource::from_path("notes.txt").is_audio());
        assert!(!AudioSource::from_path("no_extension").is_audio());
        assert!(AudioSource::from_uri("content://media/external/audio/media/42").is_audio());
        assert!(AudioSource::from_uri("blob:https://example.org/1f2e").is_audio());
        assert!(!AudioSource::from_uri("file:///tmp/cover.jpg").is_audio());
    }

    #[test]
    fn test_with_name() {
        let source = AudioSource::from_uri("blob:https://example.org/1f2e").with_name("song.wav");
        assert_eq!(source.name(), "song.wav");
    }
}
