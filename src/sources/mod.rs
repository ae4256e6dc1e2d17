pub mod apple_music;
pub mod misskey;

use crate::models::{PublishOutcome, UrlLookup};

/// Looks up a shareable catalog URL for a track.
/// Failures are reported through `UrlLookup`, never as errors.
pub trait UrlResolver {
    fn resolve(&self, title: &str, artist: &str, album: &str) -> UrlLookup;
}

/// Destination for the composed now-playing note.
pub trait NotePublisher {
    fn publish(&self, text: &str) -> PublishOutcome;
}
