// ClipFetch - Media Retrieval Client
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use clipfetch_core::channel::ChannelKind;
use clipfetch_core::config::{ClientConfig, SaveConfig, UiTimings, DEFAULT_BASE_URL};
use clipfetch_core::ui::{ChannelEvent, UiUpdate};
use clipfetch_core::{ServiceClient, Workspace};
use serde_json::json;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "clipfetch-cli")]
#[command(about = "ClipFetch CLI - resolve and download media through a ClipFetch service", long_about = None)]
struct Cli {
    /// Base URL of the service
    #[arg(long, env = "CLIPFETCH_SERVER", default_value = DEFAULT_BASE_URL, global = true)]
    server: String,

    /// Request timeout in seconds (none by default)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metadata and quality choices for a URL
    Info {
        url: String,
        /// video or audio
        #[arg(short, long, default_value = "video")]
        mode: ChannelKind,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resolve and download a URL
    Download {
        url: String,
        /// video or audio
        #[arg(short, long, default_value = "video")]
        mode: ChannelKind,
        /// Format id from `info` (defaults to best)
        #[arg(short, long)]
        quality: Option<String>,
        /// Output format, e.g. mp4 or mp3
        #[arg(short, long)]
        format: Option<String>,
        /// Directory to save into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
        /// Replace an existing file of the same name
        #[arg(long)]
        overwrite: bool,
    },
    /// Check that the service is up
    Health,
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .init();
}

/// Render progress updates as a single rewritten stderr line
fn render_event(event: ChannelEvent) {
    let mut err = std::io::stderr();
    match event.update {
        UiUpdate::Progress { visible: true, status_text, .. } => {
            let _ = write!(err, "\r\x1b[2K[{}] {}", event.channel, status_text);
            let _ = err.flush();
        }
        UiUpdate::Saved(_) => {
            let _ = writeln!(err);
        }
        UiUpdate::Banner { message, .. } => {
            let _ = writeln!(err, "\r\x1b[2K[{}] {}", event.channel, message);
        }
        _ => {}
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut builder = ClientConfig::builder().base_url(&cli.server);
    if let Some(secs) = cli.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    let config = builder.build();

    match cli.command {
        Commands::Health => {
            let client = ServiceClient::with_config(config).context("Failed to create client")?;
            let health = client
                .health()
                .await
                .with_context(|| format!("Service at {} is not reachable", client.base_url()))?;
            println!("{}: {}", client.base_url(), health.status);
        }
        Commands::Info { url, mode, json } => {
            let mut workspace = Workspace::connect(config, SaveConfig::default(), UiTimings::immediate())
                .context("Failed to create workspace")?;
            let channel = workspace.channel_mut(mode);
            let metadata = channel
                .submit_url(&url)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))
                .context("Failed to resolve URL")?;

            let selection = channel.selection();
            if json {
                let out = json!({
                    "metadata": metadata,
                    "view": selection.metadata_view(),
                    "qualities": selection.quality_options(),
                    "output_formats": selection.output_formats(),
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                if let Some(view) = selection.metadata_view() {
                    println!("{}", view.title);
                    println!("  by {}", view.channel_name);
                    println!("  {}  |  {}", view.duration_text, view.views_text);
                }
                println!("Qualities ({}):", mode);
                for option in selection.quality_options() {
                    println!("  {:<12} {}", option.format_id, option.label);
                }
                println!("Output formats: {}", selection.output_formats().join(", "));
            }
        }
        Commands::Download {
            url,
            mode,
            quality,
            format,
            output_dir,
            overwrite,
        } => {
            let save = SaveConfig {
                output_directory: output_dir,
                overwrite,
            };
            let mut workspace =
                Workspace::connect(config, save, UiTimings::immediate()).context("Failed to create workspace")?;
            workspace.activate_tab(mode);
            workspace.set_event_callback(Arc::new(render_event));

            let channel = workspace.channel_mut(mode);
            channel
                .submit_url(&url)
                .await
                .map_err(|e| anyhow::anyhow!(e.user_message()))
                .context("Failed to resolve URL")?;
            if let Some(format_id) = quality {
                channel
                    .select_quality(&format_id)
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            }
            if let Some(output_format) = format {
                channel
                    .select_output_format(&output_format)
                    .map_err(|e| anyhow::anyhow!(e.user_message()))?;
            }

            let saved = match channel.download().await {
                Ok(saved) => saved,
                Err(e) => bail!("Download failed: {}", e.user_message()),
            };
            match &saved.path {
                Some(path) => println!("Saved {} ({} bytes)", path.display(), saved.size_bytes),
                None => println!("Saved {} ({} bytes)", saved.filename, saved.size_bytes),
            }
        }
    }

    Ok(())
}
