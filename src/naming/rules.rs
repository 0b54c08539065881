use serde::Deserialize;

use crate::library::Track;

/// Tag fields a rule can render. The vocabulary is fixed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalField {
    #[serde(alias = "GENRE")]
    Genre,
    #[serde(alias = "ARTIST")]
    Artist,
    #[serde(alias = "ALBUM")]
    Album,
    #[serde(alias = "TRACK")]
    Track,
    #[serde(alias = "TITLE")]
    Title,
}

impl LogicalField {
    /// Raw (unsanitized) value of this field on `track`.
    pub fn value(self, track: &Track) -> Option<&str> {
        match self {
            LogicalField::Genre => track.genre_description.as_deref(),
            LogicalField::Artist => track.artist.as_deref(),
            LogicalField::Album => track.album.as_deref(),
            LogicalField::Track => track.track.as_deref(),
            LogicalField::Title => track.title.as_deref(),
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMode {
    /// Sanitized value, or the default when nothing survives sanitizing.
    #[default]
    Default,
    /// Like `Default`, but preceded by an upper-case group letter.
    Group,
    /// First run of digits in the value, optionally zero padded.
    Numeric,
    /// Lookup in the rule's fixed value table.
    Value,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FixedValue {
    pub from: String,
    pub to: String,
}

/// One entry of the naming rule table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldRule {
    pub field: LogicalField,
    #[serde(default)]
    pub mode: FieldMode,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub suffix: Option<String>,
    /// Used by `FieldMode::Value`.
    #[serde(default)]
    pub values: Vec<FixedValue>,
    /// Zero-pad width for `FieldMode::Numeric`.
    #[serde(default)]
    pub width: Option<usize>,
}

impl FieldRule {
    pub fn new(field: LogicalField, mode: FieldMode) -> Self {
        Self {
            field,
            mode,
            default: None,
            prefix: None,
            suffix: None,
            values: Vec::new(),
            width: None,
        }
    }

    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.suffix = Some(suffix.to_string());
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    pub fn with_value(mut self, from: &str, to: &str) -> Self {
        self.values.push(FixedValue {
            from: from.to_string(),
            to: to.to_string(),
        });
        self
    }

    pub fn lookup(&self, raw: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.from == raw)
            .map(|v| v.to.as_str())
    }
}

/// The built-in table: `/<genre>/<letter>/<artist>/<album>/<nnn>.<title>.mp3`.
pub fn default_rules() -> Vec<FieldRule> {
    vec![
        FieldRule::new(LogicalField::Genre, FieldMode::Value)
            .with_prefix("/")
            .with_default("Music")
            .with_value("Podcast", "Podcast")
            .with_value("Soundtrack", "Soundtrack")
            .with_value("Audiobook", "Audiobook"),
        FieldRule::new(LogicalField::Artist, FieldMode::Group)
            .with_prefix("/")
            .with_default("_no_artist_"),
        FieldRule::new(LogicalField::Album, FieldMode::Default)
            .with_prefix("/")
            .with_default("_no_album_"),
        FieldRule::new(LogicalField::Track, FieldMode::Numeric)
            .with_prefix("/")
            .with_width(3),
        FieldRule::new(LogicalField::Title, FieldMode::Default)
            .with_prefix(".")
            .with_suffix(".mp3")
            .with_default("_no_title_"),
    ]
}
