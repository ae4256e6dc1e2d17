use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::Input;

use crate::config::{self, Config};
use crate::core::composer::Composer;
use crate::core::pipeline::{self, RunStatus};
use crate::core::session::{HelperProcess, SessionSource};
use crate::models::{SessionOutcome, TrackMetadata};
use crate::sources::apple_music::AppleMusicClient;
use crate::sources::misskey::MisskeyClient;
use crate::sources::NotePublisher;

#[derive(Parser)]
#[command(
    name = "nowplaying",
    version,
    about = "Post the currently playing track to Misskey"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Config file (default: ~/.config/nowplaying-note/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Media session helper executable
    #[arg(long, env = "NOWPLAYING_HELPER", global = true)]
    pub helper: Option<PathBuf>,

    /// Misskey instance URL
    #[arg(long, env = "MISSKEY_SERVER", global = true)]
    pub server: Option<String>,

    /// Misskey API token (needs note write permission)
    #[arg(long, env = "MISSKEY_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read the media session and post a now-playing note (default)
    Post {
        /// Print the note instead of posting it
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the current media session without posting
    Show,
    /// Set up the Misskey server and token
    Config,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(config::config_path)
    }

    /// Loads the config file, then applies flag and environment overrides.
    fn load_config(&self) -> Result<Config> {
        let mut cfg = config::load_config(&self.config_path())?;
        if let Some(ref helper) = self.helper {
            cfg.session.helper = helper.clone();
        }
        if let Some(ref server) = self.server {
            cfg.misskey.server = server.clone();
        }
        if let Some(ref token) = self.token {
            cfg.misskey.token = Some(token.clone());
        }
        Ok(cfg)
    }
}

/// Exit status when no track metadata could be obtained.
pub const EXIT_NOTHING_PLAYING: u8 = 1;
/// Exit status for bad config, a missing token or malformed helper output.
pub const EXIT_FAILURE: u8 = 1;

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Some(Commands::Post { dry_run }) => cmd_post(&cli, dry_run),
        Some(Commands::Show) => cmd_show(&cli),
        Some(Commands::Config) => cmd_config(&cli),
        None => cmd_post(&cli, false),
    }
}

fn cmd_post(cli: &Cli, dry_run: bool) -> Result<ExitCode> {
    let cfg = cli.load_config()?;
    let composer = Composer::new(&cfg.apple_music)?;
    let resolver = AppleMusicClient::new(&cfg.apple_music)?;
    let session = HelperProcess::new(&cfg.session);

    let publisher = if dry_run {
        None
    } else {
        Some(MisskeyClient::new(&cfg.misskey)?)
    };

    let status = pipeline::run_once(
        &session,
        &composer,
        &resolver,
        publisher.as_ref().map(|p| p as &dyn NotePublisher),
    )
    .context("failed to read the media session")?;

    match status {
        RunStatus::NothingToPost => Ok(ExitCode::from(EXIT_NOTHING_PLAYING)),
        RunStatus::Composed(text) => {
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        RunStatus::Published(outcome) => {
            if !outcome.is_posted() {
                log::warn!("The note was not posted");
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn cmd_show(cli: &Cli) -> Result<ExitCode> {
    let cfg = cli.load_config()?;
    let session = HelperProcess::new(&cfg.session);

    let track = match session.read().context("failed to read the media session")? {
        SessionOutcome::Playing(track) => track,
        SessionOutcome::NoSession => {
            println!("Nothing is playing.");
            return Ok(ExitCode::from(EXIT_NOTHING_PLAYING));
        }
        SessionOutcome::Unavailable(reason) => {
            println!("Media session helper is unavailable: {}", reason);
            return Ok(ExitCode::from(EXIT_NOTHING_PLAYING));
        }
    };

    println!("{}", track_table(&track));

    let composer = Composer::new(&cfg.apple_music)?;
    let resolver = AppleMusicClient::new(&cfg.apple_music)?;
    let text = composer.compose(&track, &resolver);
    println!("\n{}", text);
    Ok(ExitCode::SUCCESS)
}

fn track_table(track: &TrackMetadata) -> Table {
    let optional_number = |n: Option<u32>| n.map(|n| n.to_string()).unwrap_or_default();

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    let rows = [
        ("Title", track.title.clone()),
        ("Subtitle", track.subtitle.clone().unwrap_or_default()),
        ("Artist", track.artist.clone()),
        ("Album artist", track.album_artist.clone()),
        ("Album", track.album_title.clone()),
        ("Track", optional_number(track.track_number)),
        ("Track count", optional_number(track.album_track_count)),
        (
            "Genres",
            track.genres.as_ref().map(|g| g.join(", ")).unwrap_or_default(),
        ),
        ("Playback type", track.playback_type_name().to_string()),
        ("Session id", track.id.clone()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

fn cmd_config(cli: &Cli) -> Result<ExitCode> {
    let path = cli.config_path();
    let mut cfg = config::load_config(&path)?;

    println!("Misskey setup");
    println!("(Create a token under Settings > API with the \"Compose or delete notes\" permission)\n");

    let server: String = Input::new()
        .with_prompt("Server URL")
        .with_initial_text(cfg.misskey.server.clone())
        .interact_text()?;

    let token: String = Input::new()
        .with_prompt("API token")
        .with_initial_text(cfg.misskey.token.clone().unwrap_or_default())
        .interact_text()?;

    cfg.misskey.server = server.trim().to_string();
    cfg.misskey.token = Some(token.trim().to_string());

    config::save_config(&path, &cfg)?;
    println!("\nSaved {}", path.display());
    Ok(ExitCode::SUCCESS)
}
