use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rss_ingest::config::{Config, OutputFormat};
use rss_ingest::feed::{Feed, FeedParser};
use rss_ingest::util::{strip_control_chars, truncate_to_width};

/// Get the default config file path (~/.config/rss-ingest/config.toml)
fn default_config_path() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home)
        .join(".config")
        .join("rss-ingest")
        .join("config.toml"))
}

#[derive(Parser, Debug)]
#[command(name = "rss-ingest", about = "Parse RSS documents into channel and item records")]
struct Args {
    /// RSS documents to parse
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Config file (defaults to ~/.config/rss-ingest/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Output format (overrides the config file)
    #[arg(long, value_enum)]
    format: Option<OutputFormat>,

    /// Parse as a stream without the buffer pre-checks
    #[arg(long)]
    no_validate: bool,
}

/// Reads and parses one file. Runs on the blocking pool.
fn parse_one(parser: &FeedParser, path: &Path, skip_validation: bool) -> Result<Feed> {
    if skip_validation {
        return parser
            .parse_file(path)
            .with_context(|| format!("Failed to parse '{}'", path.display()));
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read '{}'", path.display()))?;
    parser
        .parse(&bytes)
        .with_context(|| format!("Failed to parse '{}'", path.display()))
}

fn print_summary(path: &Path, feed: &Feed, title_width: usize) {
    let clean = |s: Option<&str>| strip_control_chars(s.unwrap_or("")).into_owned();

    println!("{}", path.display());
    if let Some(channel) = feed.channel() {
        println!("  channel: {}", clean(channel.title()));
        if let Some(link) = channel.link() {
            println!("  link:    {}", strip_control_chars(link));
        }
        if let Some(image) = &channel.image {
            println!("  image:   {}", strip_control_chars(image));
        }
    } else {
        println!("  (no channel)");
    }

    println!("  items:   {}", feed.len());
    for (index, item) in feed.iter().enumerate() {
        let title = clean(item.title());
        let date = item
            .published()
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!(
            "  {:>4}  {}  {}",
            index + 1,
            date,
            truncate_to_width(&title, title_width)
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => default_config_path()?,
    };
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config '{}'", config_path.display()))?;

    let format = args.format.unwrap_or(config.format);
    let skip_validation = args.no_validate || config.skip_validation;
    let parser = Arc::new(FeedParser::new(config.whitelist()));

    // Parsing is synchronous; fan each file out to the blocking pool.
    let tasks = args.files.iter().cloned().map(|path| {
        let parser = Arc::clone(&parser);
        tokio::task::spawn_blocking(move || {
            let result = parse_one(&parser, &path, skip_validation);
            (path, result)
        })
    });
    let results = futures::future::join_all(tasks).await;

    let mut failures = 0usize;
    let mut parsed = Vec::new();
    for joined in results {
        let (path, result) = joined.context("Parse task panicked")?;
        match result {
            Ok(feed) => parsed.push((path, feed)),
            Err(e) => {
                failures += 1;
                tracing::warn!(path = %path.display(), error = %e, "Feed failed");
                eprintln!("Error: {:#}", e);
            }
        }
    }

    match format {
        OutputFormat::Json => {
            let docs: Vec<_> = parsed
                .iter()
                .map(|(path, feed)| {
                    serde_json::json!({
                        "path": path.display().to_string(),
                        "feed": feed,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&docs).context("Failed to encode JSON")?
            );
        }
        OutputFormat::Summary => {
            for (path, feed) in &parsed {
                print_summary(path, feed, config.title_width);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} of {} feed(s) failed", failures, args.files.len());
    }
    Ok(())
}
