//! `filmviewer` CLI - resolve links the way the player does

use std::fmt::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use filmviewer::applink::{self, LinkTarget, QuadLink};
use filmviewer::embed::{self, YOUTUBE_BASE_URL};
use filmviewer::{CachedResolver, Config, Resolver, StreamSource};

#[derive(Parser)]
#[command(name = "filmviewer")]
#[command(about = "Classify video links into HLS, YouTube or web-embed sources")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/filmviewer/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print one JSON object per line instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve one or more raw inputs
    Resolve {
        /// Links or identifiers to resolve
        #[arg(required = true)]
        inputs: Vec<String>,
    },

    /// Decode a queue (base64 payload, `?q=` link, or single URL) and resolve each entry
    Queue {
        /// Payload or link
        payload: String,
    },

    /// Resolve the four tiles of a quad link
    Quad {
        /// `filmviewer://quad?u1=..` or `https://<host>/quad?u1=..`
        link: String,
    },

    /// Open whatever a pasted entry asks for (quad link, queue, or single URL)
    Open {
        /// Text from the link entry box
        entry: String,
    },

    /// Print the YouTube embed document for a video id
    Embed {
        /// YouTube video id
        video_id: String,

        /// Start muted
        #[arg(short, long)]
        muted: bool,
    },
}

#[derive(Serialize)]
struct Resolved<'a> {
    index: usize,
    input: &'a str,
    #[serde(flatten)]
    source: &'a StreamSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    start_muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    volume: Option<f32>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout stays clean for results
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;

    match cli.command {
        Commands::Resolve { inputs } => {
            cmd_resolve(&config, inputs, cli.json).await?;
        }
        Commands::Queue { payload } => {
            let links = applink::queue_from_link(&payload)?;
            cmd_queue(&config, &links, cli.json).await?;
        }
        Commands::Quad { link } => {
            let quad = QuadLink::parse(&link)?;
            cmd_quad(&config, &quad, cli.json).await?;
        }
        Commands::Open { entry } => match applink::parse_entry(&entry)? {
            LinkTarget::Quad(quad) => cmd_quad(&config, &quad, cli.json).await?,
            LinkTarget::Queue(links) => cmd_queue(&config, &links, cli.json).await?,
        },
        Commands::Embed { video_id, muted } => {
            cmd_embed(&video_id, muted);
        }
    }

    Ok(())
}

async fn cmd_resolve(config: &Config, inputs: Vec<String>, json: bool) -> Result<()> {
    let resolver = Resolver::http(config)?;
    let inputs: Vec<Option<String>> = inputs.into_iter().map(Some).collect();
    let results = resolver.resolve_all(&inputs).await;

    for (index, (input, source)) in inputs.iter().zip(&results).enumerate() {
        let (Some(input), Some(source)) = (input, source) else {
            continue;
        };
        print_resolved(
            &Resolved {
                index,
                input,
                source,
                start_muted: None,
                volume: None,
            },
            json,
        )?;
    }
    Ok(())
}

async fn cmd_queue(config: &Config, links: &[String], json: bool) -> Result<()> {
    let resolver = Resolver::http(config)?;

    // Entries play in order, so resolve in order; the cache collapses repeats.
    match config.cache_ttl() {
        Some(ttl) => {
            let cached = CachedResolver::new(resolver, ttl);
            for (index, input) in links.iter().enumerate() {
                let source = cached.resolve(input).await;
                print_queue_entry(index, input, &source, json)?;
            }
        }
        None => {
            for (index, input) in links.iter().enumerate() {
                let source = resolver.resolve(input).await;
                print_queue_entry(index, input, &source, json)?;
            }
        }
    }
    Ok(())
}

async fn cmd_quad(config: &Config, quad: &QuadLink, json: bool) -> Result<()> {
    let resolver = Resolver::http(config)?;
    if !json {
        eprintln!("🎬 Quad: {} of {} tiles", quad.filled(), applink::TILE_COUNT);
    }

    let mut pending = resolver.resolve_unordered(quad.to_vec());
    let tiles = async {
        while let Some((index, source)) = pending.next().await {
            let input = quad.inputs[index].as_deref().unwrap_or_default();
            // Embeds take a mute hint at load; native players take a volume.
            let (start_muted, volume) = if source.is_web() {
                (Some(embed::start_muted(index)), None)
            } else {
                (None, Some(embed::tile_volume(index)))
            };
            print_resolved(
                &Resolved {
                    index,
                    input,
                    source: &source,
                    start_muted,
                    volume,
                },
                json,
            )?;
        }
        Ok::<(), anyhow::Error>(())
    };

    tokio::select! {
        result = tiles => result?,
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted, dropping pending tiles");
        }
    }
    Ok(())
}

fn cmd_embed(video_id: &str, muted: bool) {
    eprintln!("🌐 Base URL: {YOUTUBE_BASE_URL}");
    print!("{}", embed::youtube_embed_html(video_id, muted));
}

fn print_queue_entry(index: usize, input: &str, source: &StreamSource, json: bool) -> Result<()> {
    print_resolved(
        &Resolved {
            index,
            input,
            source,
            start_muted: None,
            volume: None,
        },
        json,
    )
}

fn print_resolved(resolved: &Resolved<'_>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string(resolved)?);
        return Ok(());
    }

    let mut line = format!("[{}] {}", resolved.index, resolved.source);
    match resolved.start_muted {
        Some(true) => line.push_str(" (muted)"),
        Some(false) => line.push_str(" (audio)"),
        None => {}
    }
    if let Some(volume) = resolved.volume {
        let _ = write!(line, " (volume {volume:.1})");
    }
    if let StreamSource::Hls { headers, .. } = resolved.source {
        for (name, value) in headers {
            let _ = write!(line, "\n    {name}: {value}");
        }
    }
    println!("{line}");
    Ok(())
}
