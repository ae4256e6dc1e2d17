use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::string::FromUtf8Error;

use log::{error, info};
use thiserror::Error;

use crate::config::SessionConfig;
use crate::models::{SessionOutcome, TrackMetadata};

/// Printed by the helper when no media session is focused.
pub const NO_SESSION_SENTINEL: &str = "No session found.";

/// Helper output that cannot be turned into a track record.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("helper output is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] FromUtf8Error),

    #[error("helper output is not a track document: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Source of the currently playing track.
pub trait SessionSource {
    fn read(&self) -> Result<SessionOutcome, SessionError>;
}

/// Runs the media session helper executable and reads its stdout.
pub struct HelperProcess {
    path: PathBuf,
}

impl HelperProcess {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            path: config.helper.clone(),
        }
    }
}

impl SessionSource for HelperProcess {
    fn read(&self) -> Result<SessionOutcome, SessionError> {
        info!("Getting song information");
        info!("Helper: {}", self.path.display());

        let output = match Command::new(&self.path)
            .stdin(Stdio::null())
            .stderr(Stdio::piped())
            .output()
        {
            Ok(output) => output,
            Err(e) => {
                error!("Failed to run {}: {}", self.path.display(), e);
                return Ok(SessionOutcome::Unavailable(e.to_string()));
            }
        };

        let outcome = interpret_output(output.status.success(), output.stdout)?;
        match &outcome {
            SessionOutcome::NoSession => info!("No session found (Not playing music)."),
            SessionOutcome::Unavailable(reason) => {
                error!("{}", reason);
                let stderr = String::from_utf8_lossy(&output.stderr);
                if !stderr.trim().is_empty() {
                    error!("helper stderr: {}", stderr.trim());
                }
            }
            SessionOutcome::Playing(_) => {}
        }
        Ok(outcome)
    }
}

/// Classifies helper stdout.
///
/// The sentinel wins over the exit status. A failed run without the sentinel is
/// `Unavailable`. Anything else must be a track document.
pub fn interpret_output(success: bool, stdout: Vec<u8>) -> Result<SessionOutcome, SessionError> {
    let text = String::from_utf8(stdout);
    match text {
        Ok(ref t) if t.contains(NO_SESSION_SENTINEL) => Ok(SessionOutcome::NoSession),
        _ if !success => Ok(SessionOutcome::Unavailable(
            "helper exited with a failure status".to_string(),
        )),
        Ok(t) => {
            let track: TrackMetadata = serde_json::from_str(&t)?;
            Ok(SessionOutcome::Playing(track))
        }
        Err(e) => Err(e.into()),
    }
}
