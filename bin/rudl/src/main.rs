use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;
use rutube::RutubeClient;

#[derive(Parser, Debug, Clone)]
struct RudlArgs {
    /// Debug output
    #[clap(long, alias = "debug")]
    verbose: bool,

    /// Workers for the concurrent download. 0 downloads sequentially.
    #[clap(short, long, default_value = "0")]
    workers: u32,

    /// Target directory for the output file, created when absent
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Pick the rendition with this vertical resolution
    #[clap(short, long)]
    resolution: Option<u64>,

    /// Pick the worst rendition instead of the best one
    #[clap(long)]
    worst: bool,

    /// Only list available resolutions
    #[clap(long)]
    list: bool,

    /// Video page URL
    url: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = RudlArgs::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .try_from_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let client = RutubeClient::new();
    let mut playlist = client.resolve(&args.url).await?;

    if playlist.is_empty() {
        bail!("No renditions available for {}", args.url);
    }

    if args.list {
        for video in playlist.iter() {
            println!("{}", video.resolution());
        }
        return Ok(());
    }

    let video = if let Some(height) = args.resolution {
        playlist.by_resolution_mut(height)
    } else if args.worst {
        playlist.worst_mut()
    } else {
        playlist.best_mut()
    };
    let Some(video) = video else {
        bail!("No rendition matches the requested resolution");
    };

    log::info!("Downloading {}", video.title());
    let path = video
        .download_to(&client, args.output.as_deref(), args.workers)
        .await?;
    println!("{}", path.display());

    Ok(())
}
