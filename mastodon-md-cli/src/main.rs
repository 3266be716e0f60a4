mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mastodon_md_lib::Config;
use tracing::Level;

#[derive(Parser)]
#[command(name = "mastodon-to-markdown")]
#[command(about = "Export your Mastodon posts from a time period to a markdown document")]
struct Cli {
    /// Config file (default: ./mastodon-to-markdown.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mastodon instance URL, overrides mastodon.server
    #[arg(long, global = true, env = "MASTODON_SERVER")]
    server: Option<String>,

    /// Access token, overrides mastodon.access_token
    #[arg(long, global = true, env = "MASTODON_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Debug output
    #[arg(long, global = true)]
    debug: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch posts for a time period and render them to markdown
    ///
    /// Examples:
    ///   mastodon-to-markdown fetch --since 7d --output posts.md
    ///   mastodon-to-markdown fetch --start 2025-11-01 --end 2025-11-07
    ///   mastodon-to-markdown fetch --since 24h --exclude-replies
    Fetch(commands::FetchArgs),

    /// Show the account behind the configured access token
    Whoami,

    /// Write a starter config file and a copy of the default template
    Init(commands::InitArgs),

    /// Print version information
    Version,
}

impl Cli {
    /// Only commands that talk to the server read the config file.
    fn needs_config_file(&self) -> bool {
        matches!(self.command, Command::Fetch(_) | Command::Whoami)
    }

    /// Load the config file and lay flags and environment on top of it.
    fn load_config(&self) -> Result<Config> {
        let config = Config::discover(self.config.as_deref()).context("Error loading config")?;
        Ok(self.apply_overrides(config))
    }

    fn apply_overrides(&self, mut config: Config) -> Config {
        if let Some(server) = &self.server {
            config.mastodon.server = server.clone();
        }
        if let Some(token) = &self.access_token {
            config.mastodon.access_token = token.clone();
        }
        config.logging.verbose |= self.verbose;
        config.logging.debug |= self.debug;
        config.logging.json |= self.log_json;
        config
    }
}

fn init_logging(config: &Config) {
    let level = if config.logging.debug {
        Level::DEBUG
    } else if config.logging.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    // Logs go to stderr so stdout carries only the document.
    let builder = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = if cli.needs_config_file() {
        cli.load_config()?
    } else {
        cli.apply_overrides(Config::default())
    };
    init_logging(&config);

    match cli.command {
        Command::Fetch(args) => commands::fetch(&config, args).await,
        Command::Whoami => commands::whoami(&config).await,
        Command::Init(args) => commands::init(args),
        Command::Version => {
            commands::version();
            Ok(())
        }
    }
}
