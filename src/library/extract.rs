use std::path::Path;

use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};

use crate::error::ExtractError;

use super::model::TrackTags;

/// Reads tag fields from one audio file.
pub trait MetadataExtractor {
    fn extract(&self, path: &Path) -> Result<TrackTags, ExtractError>;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TagField {
    Album,
    Artist,
    Title,
    Track,
    Genre,
}

const TAG_FIELDS: [TagField; 5] = [
    TagField::Album,
    TagField::Artist,
    TagField::Title,
    TagField::Track,
    TagField::Genre,
];

impl TagField {
    fn item_key(self) -> ItemKey {
        match self {
            TagField::Album => ItemKey::AlbumTitle,
            TagField::Artist => ItemKey::TrackArtist,
            TagField::Title => ItemKey::TrackTitle,
            TagField::Track => ItemKey::TrackNumber,
            TagField::Genre => ItemKey::Genre,
        }
    }

    fn store(self, tags: &mut TrackTags, value: String) {
        match self {
            TagField::Album => tags.album = Some(value),
            TagField::Artist => tags.artist = Some(value),
            TagField::Title => tags.title = Some(value),
            TagField::Track => tags.track = Some(value),
            TagField::Genre => {
                tags.genre_code = genre_code(&value);
                if tags.genre_code.is_none() {
                    tags.genre_description = Some(value);
                }
            }
        }
    }
}

/// `lofty`-backed extractor.
///
/// The primary tag wins field by field; any other tag in the file (an ID3v1
/// block behind an ID3v2 one, say) fills the gaps.
#[derive(Debug, Default, Clone, Copy)]
pub struct TagExtractor;

impl MetadataExtractor for TagExtractor {
    fn extract(&self, path: &Path) -> Result<TrackTags, ExtractError> {
        if std::fs::metadata(path)?.len() == 0 {
            return Err(ExtractError::Read("empty file".to_string()));
        }

        let tagged = Probe::open(path)
            .map_err(|e| ExtractError::Read(e.to_string()))?
            .read()
            .map_err(|e| ExtractError::Read(e.to_string()))?;

        let mut ordered: Vec<&Tag> = Vec::new();
        if let Some(primary) = tagged.primary_tag() {
            ordered.push(primary);
        }
        for tag in tagged.tags() {
            if !ordered.iter().any(|t| t.tag_type() == tag.tag_type()) {
                ordered.push(tag);
            }
        }
        if ordered.is_empty() {
            return Err(ExtractError::Read("no tags found".to_string()));
        }

        let mut tags = TrackTags::default();
        for field in TAG_FIELDS {
            let value = ordered
                .iter()
                .find_map(|tag| tag.get_string(field.item_key()))
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                field.store(&mut tags, value.to_string());
            }
        }
        Ok(tags)
    }
}

/// Numeric ID3v1 genre references such as `17` or `(17)`.
fn genre_code(value: &str) -> Option<i32> {
    let inner = value
        .strip_prefix('(')
        .and_then(|v| v.strip_suffix(')'))
        .unwrap_or(value);
    if inner.is_empty() || !inner.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    inner.parse().ok()
}
