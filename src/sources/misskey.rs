use anyhow::{bail, Context, Result};
use log::{error, info};
use serde::Serialize;

use crate::config::MisskeyConfig;
use crate::models::PublishOutcome;
use crate::sources::NotePublisher;

/// Misskey `notes/create` client.
pub struct MisskeyClient {
    client: reqwest::blocking::Client,
    endpoint: String,
    token: String,
    visibility: Option<String>,
}

#[derive(Serialize)]
struct CreateNoteRequest<'a> {
    i: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    visibility: Option<&'a str>,
}

impl MisskeyClient {
    pub fn new(config: &MisskeyConfig) -> Result<Self> {
        if !config.is_configured() {
            bail!("Misskey server or token is not set. Run 'nowplaying config' or pass --token");
        }
        let token = config.token.as_ref().context("Misskey token is not set")?;

        Ok(Self {
            client: reqwest::blocking::Client::new(),
            endpoint: Self::endpoint(&config.server),
            token: token.clone(),
            visibility: config.visibility.clone(),
        })
    }

    pub fn endpoint(server: &str) -> String {
        format!("{}/api/notes/create", server.trim_end_matches('/'))
    }

    /// Error response body, re-serialized compactly when it is JSON.
    fn describe_body(body: &str) -> String {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => value.to_string(),
            Err(_) => body.to_string(),
        }
    }
}

impl NotePublisher for MisskeyClient {
    fn publish(&self, text: &str) -> PublishOutcome {
        info!("Posting a new note");
        info!("URL: {}", self.endpoint);
        info!("Text: {}", text);

        let request = CreateNoteRequest {
            i: &self.token,
            text,
            visibility: self.visibility.as_deref(),
        };

        // `.json()` sets `Content-Type: application/json`.
        let response = match self.client.post(&self.endpoint).json(&request).send() {
            Ok(response) => response,
            Err(e) => {
                error!("Failed to reach Misskey: {}", e);
                return PublishOutcome::Failed(e.to_string());
            }
        };

        let status = response.status().as_u16();
        if status == 200 {
            info!("Successfully posted a new note.");
            return PublishOutcome::Posted;
        }

        let body = Self::describe_body(&response.text().unwrap_or_default());
        error!("{}", body);
        PublishOutcome::Rejected { status, body }
    }
}
