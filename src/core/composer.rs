use log::warn;

use crate::config::{AppleMusicConfig, ConfigError, SourceMatcher};
use crate::models::TrackMetadata;
use crate::sources::UrlResolver;

/// Separates artist and album in the composite album-artist field.
pub const COMPOSITE_DELIMITER: &str = " — ";

/// Placeholder for an empty artist or album.
const MISSING: &str = "None";

/// Builds the now-playing note text for a track.
pub struct Composer {
    matcher: SourceMatcher,
    append_url: bool,
}

impl Composer {
    pub fn new(config: &AppleMusicConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            matcher: SourceMatcher::new(&config.source_pattern)?,
            append_url: config.append_url,
        })
    }

    /// `resolver` is only consulted for composite-field sessions with URL
    /// augmentation enabled.
    pub fn compose(&self, track: &TrackMetadata, resolver: &dyn UrlResolver) -> String {
        if self.matcher.matches(&track.id) {
            match split_composite(&track.album_artist) {
                Some((artist, album)) => {
                    let url = if self.append_url {
                        resolver.resolve(&track.title, artist, album).into_url()
                    } else {
                        String::new()
                    };
                    return format_note(&track.title, artist, album, &url);
                }
                None => warn!(
                    "Expected \"artist{}album\" in AlbumArtist, got {:?}; using raw fields",
                    COMPOSITE_DELIMITER, track.album_artist
                ),
            }
        }

        format_note(
            &track.title,
            fallback_artist(&track.artist, &track.album_artist),
            fallback_album(&track.album_title),
            "",
        )
    }
}

/// Splits `"artist — album"`. The delimiter must occur exactly once.
pub fn split_composite(field: &str) -> Option<(&str, &str)> {
    let mut parts = field.split(COMPOSITE_DELIMITER);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(artist), Some(album), None) => Some((artist, album)),
        _ => None,
    }
}

pub fn fallback_artist<'a>(artist: &'a str, album_artist: &'a str) -> &'a str {
    match (artist, album_artist) {
        ("", "") => MISSING,
        ("", album_artist) => album_artist,
        (artist, _) => artist,
    }
}

pub fn fallback_album(album: &str) -> &str {
    match album {
        "" => MISSING,
        album => album,
    }
}

pub fn format_note(title: &str, artist: &str, album: &str, url: &str) -> String {
    format!("#NowPlaying: {} / {} - {}\n{}", title, artist, album, url)
}
