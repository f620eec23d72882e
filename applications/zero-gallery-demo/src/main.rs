/// ZeroGallery Demo - walks through every client operation against a live server
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use zero_gallery_client::GalleryClient;
use zero_gallery_demo::{config::DemoConfig, scenario};

#[derive(Parser)]
#[command(name = "zero-gallery-demo")]
#[command(about = "ZeroGallery API client walkthrough", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./zerogallery.toml if present)
    #[arg(short, long, env = "ZEROGALLERY_CONFIG")]
    config: Option<PathBuf>,

    /// Server base URL
    #[arg(short, long)]
    url: Option<String>,

    /// Access token sent as X-Access-Token
    #[arg(short, long)]
    token: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Directory for generated and downloaded files
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Name of the album to create
    #[arg(long)]
    album_name: Option<String>,

    /// Delete the created album and data when done
    #[arg(long)]
    cleanup: bool,
}

impl Cli {
    fn apply(self, config: &mut DemoConfig) {
        if let Some(url) = self.url {
            config.server.url = url;
        }
        if let Some(token) = self.token {
            config.server.access_token = Some(token);
        }
        if let Some(timeout) = self.timeout {
            config.server.timeout_secs = timeout;
        }
        if let Some(work_dir) = self.work_dir {
            config.demo.work_dir = work_dir;
        }
        if let Some(album_name) = self.album_name {
            config.demo.album_name = album_name;
        }
        if self.cleanup {
            config.demo.cleanup = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "zero_gallery_demo=info,zero_gallery_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration, then let flags override it
    let mut config = DemoConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    tracing::info!(url = %config.server.url, "Starting ZeroGallery demo");

    let client =
        GalleryClient::new(config.gallery_config()).context("Failed to create client")?;
    let report = scenario::run(&client, &config.demo).await?;

    tracing::info!(
        album_id = report.album_id,
        items = report.listed.len(),
        cleaned_up = report.album_deleted,
        "Demo finished"
    );

    Ok(())
}
