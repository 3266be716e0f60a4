use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use mastodon_md_lib::config::{DEFAULT_CONFIG, DEFAULT_CONFIG_FILE};
use mastodon_md_lib::output::is_stdout;
use mastodon_md_lib::{
    authenticate, export, resolve, write_document, Config, ExportOptions, FilterOptions,
    MastodonClient, Renderer, SortOrder, DEFAULT_TEMPLATE,
};
use tracing::info;

#[derive(Args)]
pub struct FetchArgs {
    /// Time period to fetch (e.g., '24h', '7d', '2w')
    #[arg(long, default_value = "")]
    since: String,

    /// Start date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    start: String,

    /// End date (YYYY-MM-DD)
    #[arg(long, default_value = "")]
    end: String,

    /// Output file (default: stdout)
    #[arg(short, long, default_value = "")]
    output: String,

    /// Sort order: 'asc' (oldest first) or 'desc' (newest first)
    #[arg(long)]
    sort_order: Option<String>,

    /// Exclude reply posts
    #[arg(long)]
    exclude_replies: bool,

    /// Exclude boosted posts
    #[arg(long)]
    exclude_boosts: bool,

    /// Filter by visibility (comma-separated: public,unlisted,private,direct)
    #[arg(long, default_value = "")]
    visibility: String,

    /// Custom template file, overrides output.template
    #[arg(long)]
    template: Option<String>,

    /// Also include posts you favourited in the time period
    #[arg(long)]
    include_favourites: bool,

    /// Group posts into per-day sections
    #[arg(long)]
    group_by_day: bool,
}

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite existing files
    #[arg(long)]
    force: bool,

    /// Name of custom template file to create
    #[arg(long, default_value = "mastodon-to-markdown.md")]
    template_file: String,
}

fn client(config: &Config) -> Result<MastodonClient> {
    MastodonClient::new(&config.mastodon.server, &config.mastodon.access_token)
        .context("Failed to create Mastodon client (set mastodon.server and mastodon.access_token)")
}

pub async fn fetch(config: &Config, args: FetchArgs) -> Result<()> {
    let range = resolve(&args.since, &args.start, &args.end, chrono::Utc::now())
        .context("Invalid time range")?;

    let template = args.template.as_deref().unwrap_or(&config.output.template);
    // Fail on a bad template before any network traffic.
    let renderer = Renderer::new(template).context("Failed to initialize template")?;

    let sort_order = match &args.sort_order {
        Some(order) => order.parse::<SortOrder>().unwrap_or_default(),
        None => config.output.sort_order,
    };

    let options = ExportOptions {
        range,
        filter: FilterOptions {
            exclude_replies: args.exclude_replies,
            exclude_boosts: args.exclude_boosts,
            visibilities: FilterOptions::parse_visibilities(&args.visibility),
        },
        sort_order,
        include_favourites: args.include_favourites || config.output.include_favourites,
        group_by_day: args.group_by_day || config.output.group_by_day,
    };

    let client = client(config)?;
    let document = export(&client, &renderer, &options).await?;

    write_document(&args.output, &document).context("Failed to render output")?;
    if !is_stdout(&args.output) {
        info!("Output written to {}", args.output);
    }

    Ok(())
}

pub async fn whoami(config: &Config) -> Result<()> {
    let client = client(config)?;
    let account = authenticate(&client).await?;

    println!("\nSuccessfully authenticated!\n");
    println!("Server:        {}", client.server());
    println!("Username:      @{}", account.username);
    println!("Display Name:  {}", account.display_name);
    println!("Account ID:    {}", account.id);
    println!("Account URL:   {}", account.url);
    println!("Created:       {}", account.created_at.format("%Y-%m-%d"));
    println!("\nStatistics:");
    println!("  Posts:       {}", account.statuses_count);
    println!("  Following:   {}", account.following_count);
    println!("  Followers:   {}", account.followers_count);
    println!();

    Ok(())
}

fn write_new_file(path: &Path, contents: &str, existed: bool) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    if existed {
        info!("Overwrote {}", path.display());
    } else {
        info!("Created {}", path.display());
    }
    Ok(())
}

pub fn init(args: InitArgs) -> Result<()> {
    let config_path = Path::new(DEFAULT_CONFIG_FILE);
    let template_path = Path::new(&args.template_file);

    let config_exists = config_path.exists();
    if config_exists && !args.force {
        bail!(
            "config file {} already exists (use --force to overwrite)",
            config_path.display()
        );
    }
    let template_exists = template_path.exists();
    if template_exists && !args.force {
        bail!(
            "template file {} already exists (use --force to overwrite)",
            template_path.display()
        );
    }

    write_new_file(config_path, DEFAULT_CONFIG, config_exists)?;
    write_new_file(template_path, DEFAULT_TEMPLATE, template_exists)?;

    println!("\nInitialization complete!\n");
    println!("Next steps:");
    println!(
        "  1. Edit {} and add your Mastodon server and access token",
        config_path.display()
    );
    println!(
        "  2. (Optional) Customize {} and set output.template to use it",
        template_path.display()
    );
    println!("  3. Run: mastodon-to-markdown fetch --since 7d --output posts.md\n");

    Ok(())
}

pub fn version() {
    println!(
        "mastodon-to-markdown {} (commit: {}, built: {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("MASTODON_MD_COMMIT").unwrap_or("unknown"),
        option_env!("MASTODON_MD_BUILD_DATE").unwrap_or("unknown"),
    );
}
