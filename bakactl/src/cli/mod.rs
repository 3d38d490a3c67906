use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tempfile::NamedTempFile;

use client::{BooruClient, BooruError, LocalStorage, QueueError};

use crate::VERSION;
use crate::config::{Config, ConfigError};
use crate::router::{Route, RouteError};
use crate::theme::{Palette, ThemeStore};

mod auth;
mod images;
mod open;
mod search;
mod system;
mod tags;
mod theme;
mod upload;

#[derive(Parser, Debug)]
#[command(name = "bakactl")]
#[command(about = "Browse, tag and feed a BaKaBooru gallery", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, value_name = "FILE", env = "BAKACTL_CONFIG")]
    pub config: Option<PathBuf>,
    /// Backend base URL, overrides server.url
    #[arg(short, long, value_name = "URL", env = "BAKACTL_SERVER")]
    pub server: Option<String>,
    /// Log filter, overrides logging.level
    #[arg(long, value_name = "FILTER")]
    pub log_level: Option<String>,
    /// Disable colours
    #[arg(long)]
    pub no_color: bool,
    #[arg(long, hide = true)]
    pub markdown_help: bool,
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Booru error: {0}")]
    Booru(#[from] BooruError),
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Upload queue error: {0}")]
    Queue(#[from] QueueError),
    #[error("Route error: {0}")]
    Route(#[from] RouteError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Generic(String),
}

impl CommandError {
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Booru(BooruError::Unauthorized))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Auth(auth::AuthCommand),
    Images(images::ImagesCommand),
    Search(search::SearchCommand),
    Tags(tags::TagsCommand),
    Upload(upload::UploadCommand),
    System(system::SystemCommand),
    Theme(theme::ThemeCommand),
    Open(open::OpenCommand),
}

impl Commands {
    /// Screen the command belongs to.
    pub fn route(&self) -> Result<Route, RouteError> {
        match self {
            Self::Auth(_) => Ok(Route::Login),
            Self::Upload(_) => Ok(Route::Upload),
            Self::System(_) => Ok(Route::Settings),
            Self::Open(cmd) => cmd.route(),
            Self::Images(_) | Self::Search(_) | Self::Tags(_) | Self::Theme(_) => {
                Ok(Route::Gallery)
            }
        }
    }
}

/// Everything a command may touch.
pub struct Context {
    pub client: Arc<BooruClient>,
    pub storage: LocalStorage,
    pub theme: ThemeStore,
    pub config: Config,
    pub color: bool,
}

impl Context {
    #[must_use]
    pub const fn palette(&self) -> Palette {
        self.theme.palette(self.color)
    }
}

/// Screen to show once `route` failed with `err`: the login screen when
/// the backend asked for a session, unless it is the one that failed.
#[must_use]
pub fn redirect_on(route: Route, err: &CommandError) -> Option<Route> {
    route.on_unauthorized().filter(|_| err.is_unauthorized())
}

pub fn execute(ctx: &mut Context, command: &Commands) -> Result<(), CommandError> {
    match command {
        Commands::Auth(cmd) => cmd.execute(ctx),
        Commands::Images(cmd) => cmd.execute(ctx),
        Commands::Search(cmd) => cmd.execute(ctx),
        Commands::Tags(cmd) => cmd.execute(ctx),
        Commands::Upload(cmd) => cmd.execute(ctx),
        Commands::System(cmd) => cmd.execute(ctx),
        Commands::Theme(cmd) => cmd.execute(ctx),
        Commands::Open(cmd) => cmd.execute(ctx),
    }
}

pub trait Command {
    fn execute(&self, ctx: &mut Context) -> Result<(), CommandError>;
}

/// Streams a download into `output`. Bytes land in a temporary file next to
/// it, renamed over `output` only once `download` succeeded.
fn write_output<F>(output: &Path, download: F) -> Result<u64, CommandError>
where
    F: FnOnce(&mut dyn Write) -> Result<u64, BooruError>,
{
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    let written = {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        let written = download(&mut writer)?;
        writer.flush()?;
        written
    };
    tmp.persist(output).map_err(|e| e.error)?;
    Ok(written)
}

/// Reads a password from `value`, or from the first line of stdin when
/// absent, so it stays out of the shell history.
fn read_password(value: Option<&str>) -> Result<String, CommandError> {
    let password = match value {
        Some(p) => p.to_string(),
        None => {
            eprint!("Password: ");
            let mut line = String::new();
            io::stdin().read_line(&mut line)?;
            line.trim_end_matches(['\r', '\n']).to_string()
        }
    };
    if password.is_empty() {
        return Err(CommandError::Generic("Password cannot be empty".to_string()));
    }
    Ok(password)
}
