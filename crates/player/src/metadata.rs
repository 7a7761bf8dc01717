// Title extraction from symphonia metadata
// Container tags (Vorbis comments, MP4 atoms, RIFF INFO) take precedence over
// tags found while probing (ID3v2 ahead of an MP3 stream)

use symphonia::core::formats::FormatReader;
use symphonia::core::meta::{MetadataRevision, StandardTagKey};
use symphonia::core::probe::ProbedMetadata;

/// Title of the track, or `None` when no metadata carries one
pub fn extract_title(probed: &mut ProbedMetadata, reader: &mut dyn FormatReader) -> Option<String> {
    if let Some(title) = reader.metadata().skip_to_latest().and_then(title_from_revision) {
        return Some(title);
    }

    probed
        .get()
        .and_then(|mut metadata| metadata.skip_to_latest().and_then(title_from_revision))
}

/// First non-blank `TrackTitle` tag of a metadata revision
pub fn title_from_revision(revision: &MetadataRevision) -> Option<String> {
    revision
        .tags()
        .iter()
        .filter(|tag| tag.std_key == Some(StandardTagKey::TrackTitle))
        .map(|tag| tag.value.to_string().trim().to_string())
        .find(|title| !title.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use symphonia::core::meta::{MetadataBuilder, Tag, Value};

    fn revision(tags: Vec<Tag>) -> MetadataRevision {
        let mut builder = MetadataBuilder::new();
        for tag in tags {
            builder.add_tag(tag);
        }
        builder.metadata()
    }

    #[test]
    fn test_title_found() {
        let rev = revision(vec![
            Tag::new(Some(StandardTagKey::Artist), "TPE1", Value::String("Someone".to_string())),
            Tag::new(Some(StandardTagKey::TrackTitle), "TIT2", Value::String("Morning".to_string())),
        ]);
        assert_eq!(title_from_revision(&rev), Some("Morning".to_string()));
    }

    #[test]
    fn test_blank_title_skipped() {
        let rev = revision(vec![
            Tag::new(Some(StandardTagKey::TrackTitle), "TIT2", Value::String("   ".to_string())),
            Tag::new(Some(StandardTagKey::TrackTitle), "TITLE", Value::String(" Dusk ".to_string())),
        ]);
        assert_eq!(title_from_revision(&rev), Some("Dusk".to_string()));
    }

    #[test]
    fn test_no_title() {
        let rev = revision(vec![Tag::new(None, "COMMENT", Value::String("hi".to_string()))]);
        assert_eq!(title_from_revision(&rev), None);
    }
}
