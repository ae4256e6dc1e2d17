use anyhow::{Context, Result};
use log::{error, info, warn};
use regex::Regex;

use crate::config::AppleMusicConfig;
use crate::models::UrlLookup;
use crate::sources::UrlResolver;

/// Apple Music web search scraper.
/// Scans the public search page for the first track link, no authentication.
pub struct AppleMusicClient {
    client: reqwest::blocking::Client,
    search_base: String,
    country_code: String,
    track_url: Regex,
}

impl AppleMusicClient {
    pub fn new(config: &AppleMusicConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .context("failed to build Apple Music HTTP client")?;

        let track_url = Regex::new(&format!(
            r#"https://music\.apple\.com/{}/album/[^/"'\s<>]*?/[^/"'\s<>?]*?\?i=[0-9]+"#,
            regex::escape(&config.country_code)
        ))
        .context("failed to build track URL pattern")?;

        Ok(Self {
            client,
            search_base: config.search_base.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
            track_url,
        })
    }

    /// Joins the fields with spaces and percent-encodes the result.
    pub fn build_query(title: &str, artist: &str, album: &str) -> String {
        urlencoding::encode(&format!("{} {} {}", title, artist, album)).into_owned()
    }

    fn search_url(&self, query: &str) -> String {
        format!(
            "{}/{}/search?term={}",
            self.search_base, self.country_code, query
        )
    }

    /// First track link in `body`, if any.
    pub fn find_track_url(&self, body: &str) -> Option<String> {
        self.track_url.find(body).map(|m| m.as_str().to_string())
    }

    fn fetch_search_page(&self, url: &str) -> Result<String> {
        self.client
            .get(url)
            .send()
            .context("Apple Music search failed")?
            .error_for_status()
            .context("Apple Music search request was rejected")?
            .text()
            .context("failed to read Apple Music search response")
    }
}

impl UrlResolver for AppleMusicClient {
    fn resolve(&self, title: &str, artist: &str, album: &str) -> UrlLookup {
        let query = Self::build_query(title, artist, album);
        info!("Searching Apple Music URL");
        info!("Search Text: {}", query);

        let body = match self.fetch_search_page(&self.search_url(&query)) {
            Ok(body) => body,
            Err(e) => {
                error!("{:#}", e);
                return UrlLookup::Failed(format!("{:#}", e));
            }
        };

        match self.find_track_url(&body) {
            Some(url) => UrlLookup::Found(url),
            None => {
                warn!("No Apple Music track URL in search results");
                UrlLookup::NotFound
            }
        }
    }
}
