use serde::{Deserialize, Deserializer};

/// Track metadata reported by the media session helper.
///
/// The five string fields are required. The helper emits `null` for fields the
/// player leaves unset, which is read as an empty string.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct TrackMetadata {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub artist: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub album_artist: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub album_title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub id: String,

    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub track_number: Option<u32>,
    #[serde(default)]
    pub album_track_count: Option<u32>,
    #[serde(default)]
    pub genres: Option<Vec<String>>,
    #[serde(default)]
    pub playback_type: Option<u8>,
}

impl TrackMetadata {
    pub fn playback_type_name(&self) -> &'static str {
        match self.playback_type {
            Some(1) => "Music",
            Some(2) => "Video",
            Some(3) => "Image",
            _ => "Unknown",
        }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Result of asking the helper for the focused media session.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    Playing(TrackMetadata),
    /// Nothing is playing. Expected, not an error.
    NoSession,
    /// The helper could not be run or exited abnormally.
    Unavailable(String),
}

impl SessionOutcome {
    pub fn into_track(self) -> Option<TrackMetadata> {
        match self {
            SessionOutcome::Playing(track) => Some(track),
            _ => None,
        }
    }
}

/// Result of a shareable-URL lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlLookup {
    Found(String),
    NotFound,
    Failed(String),
}

impl UrlLookup {
    /// The resolved URL, or an empty string when there is none.
    pub fn into_url(self) -> String {
        match self {
            UrlLookup::Found(url) => url,
            UrlLookup::NotFound | UrlLookup::Failed(_) => String::new(),
        }
    }
}

/// Result of submitting a note.
#[derive(Debug, Clone, PartialEq)]
pub enum PublishOutcome {
    Posted,
    Rejected { status: u16, body: String },
    Failed(String),
}

impl PublishOutcome {
    pub fn is_posted(&self) -> bool {
        matches!(self, PublishOutcome::Posted)
    }
}
