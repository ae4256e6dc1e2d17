use log::{error, info};

use crate::core::composer::Composer;
use crate::core::session::{SessionError, SessionSource};
use crate::models::PublishOutcome;
use crate::sources::{NotePublisher, UrlResolver};

/// How a single run ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RunStatus {
    /// A note was composed and handed to the publisher, whatever it answered.
    Published(PublishOutcome),
    /// A note was composed but publishing was skipped.
    Composed(String),
    /// No track metadata was available.
    NothingToPost,
}

/// Reads the session once, composes the note and publishes it.
/// With no publisher the composed text is returned instead.
pub fn run_once(
    session: &dyn SessionSource,
    composer: &Composer,
    resolver: &dyn UrlResolver,
    publisher: Option<&dyn NotePublisher>,
) -> Result<RunStatus, SessionError> {
    let Some(track) = session.read()?.into_track() else {
        error!("Failed to get song information.");
        return Ok(RunStatus::NothingToPost);
    };

    let text = composer.compose(&track, resolver);
    match publisher {
        Some(publisher) => Ok(RunStatus::Published(publisher.publish(&text))),
        None => {
            info!("Dry run, not posting");
            Ok(RunStatus::Composed(text))
        }
    }
}
