use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotdwn::{cli, config, error};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Search for a song by name and artist
    Search(SearchOptions),

    /// Search for a song and download it
    Download(DownloadOptions),

    /// Download every song listed in an import file
    Import(ImportOptions),

    /// Edit the stored API keys
    Keys(KeysOptions),

    /// Start the web front end
    Serve(ServeOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Song name
    pub song: String,

    /// Artist name
    #[clap(default_value = "")]
    pub artist: String,

    /// Number of results to show (1-50)
    #[clap(long)]
    pub limit: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct DownloadOptions {
    /// Song name
    pub song: String,

    /// Artist name
    #[clap(default_value = "")]
    pub artist: String,

    /// Destination root; songs land in <path>/<artist>/<album>
    #[clap(long)]
    pub path: Option<PathBuf>,

    /// Which search result to download (1 = best match)
    #[clap(long, default_value_t = 1)]
    pub pick: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct ImportOptions {
    /// JSON file with `download_path` and a `songs` list
    pub file: PathBuf,

    /// Override the file's download_path
    #[clap(long)]
    pub path: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct KeysOptions {
    /// Client ID of the Spotify developer application
    #[clap(long)]
    pub client_id: Option<String>,

    /// Client Secret of the Spotify developer application
    #[clap(long)]
    pub client_secret: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeOptions {
    /// Open the front end in the default browser
    #[clap(long)]
    pub open: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();
    let config = Arc::new(config::Config::from_env());

    match cli.command {
        Command::Search(opt) => cli::search(&config, opt.song, opt.artist, opt.limit).await,
        Command::Download(opt) => {
            cli::download(&config, opt.song, opt.artist, opt.path, opt.pick).await
        }
        Command::Import(opt) => cli::import(Arc::clone(&config), opt.file, opt.path).await,
        Command::Keys(opt) => cli::keys(&config, opt.client_id, opt.client_secret).await,
        Command::Serve(opt) => cli::serve(Arc::clone(&config), opt.open).await,
        Command::Completions(opt) => {
            let mut cmd = Cli::command_for_update();
            let name = cmd.get_name().to_string();
            generate(opt.shell, &mut cmd, name, &mut std::io::stdout())
        }
    }
}
