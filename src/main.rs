use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use beluga::config::Config;
use beluga::render::{render_snapshot, status_message, RenderOptions};
use beluga::util::normalize_instance_url;
use beluga::{FeedClient, FeedSession, FeedSnapshot, FeedState};

#[derive(Parser, Debug)]
#[command(name = "beluga", about = "Terminal reader for Beluga JSON blog feeds")]
struct Args {
    /// Instance URL, e.g. https://beluga.example (defaults to `instance_url` in the config)
    url: Option<String>,

    /// Config file (default: ~/.config/beluga/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output width in columns, 0 disables wrapping
    #[arg(long, default_value_t = 80)]
    width: usize,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path.cloned().or_else(Config::default_path) {
        Some(path) => Config::load(&path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => {
            tracing::debug!("HOME not set, using default configuration");
            Ok(Config::default())
        }
    }
}

/// Follows session transitions until the load settles, reporting progress on stderr.
async fn watch_until_settled(session: &FeedSession) -> FeedSnapshot {
    let mut rx = session.subscribe();
    let mut last_state = None;

    loop {
        let snapshot = rx.borrow_and_update().clone();
        if last_state != Some(snapshot.state) && snapshot.state == FeedState::Loading {
            if let Some(msg) = status_message(&snapshot) {
                eprintln!("{}", msg);
            }
        }
        last_state = Some(snapshot.state);

        if !snapshot.is_pending() {
            return snapshot;
        }
        if rx.changed().await.is_err() {
            return session.current();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_ref())?;

    let input = args.url.as_deref().unwrap_or(&config.instance_url);
    let instance = normalize_instance_url(input)
        .with_context(|| format!("Invalid instance URL '{}'", input.trim()))?;

    let client = FeedClient::with_options(config.transport_options())
        .context("Failed to create HTTP client")?;
    let session = FeedSession::new(client);
    session.load(&instance);

    let snapshot = tokio::select! {
        snapshot = watch_until_settled(&session) => snapshot,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("Cancelled.");
            std::process::exit(130);
        }
    };

    let options = RenderOptions {
        width: args.width,
        date_format: config.date_format.clone(),
    };
    print!("{}", render_snapshot(&snapshot, &options));

    match snapshot.state {
        FeedState::Success => Ok(()),
        FeedState::NotFound => std::process::exit(2),
        _ => std::process::exit(1),
    }
}
