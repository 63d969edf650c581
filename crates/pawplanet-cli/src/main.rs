//! PawPlanet CLI: signed media uploads from a terminal.
//!
//! Reads configuration from PAWPLANET_* environment variables (and `.env`).
//! Set PAWPLANET_API_TOKEN to sign requests with a session token.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pawplanet_api_client::{MediaUploadOrchestrator, UploadHandlers};
use pawplanet_cli::{format_progress, init_tracing, resolve_target};
use pawplanet_core::{MediaClientConfig, MediaFile, UploadContext};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "pawplanet", about = "PawPlanet media upload CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file for an avatar, gallery, post or encyclopedia entry
    Upload {
        /// Path to the file to upload
        file: std::path::PathBuf,
        /// Upload context, e.g. USER_AVATAR or encyclopedia-breed
        #[arg(long)]
        context: UploadContext,
        /// Owning user, pet or post id (owner-keyed contexts)
        #[arg(long, conflicts_with = "slug")]
        owner_id: Option<i64>,
        /// Encyclopedia entry slug (encyclopedia contexts)
        #[arg(long)]
        slug: Option<String>,
    },
    /// List upload contexts and the identifier each one needs
    Contexts,
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Upload {
            file,
            context,
            owner_id,
            slug,
        } => {
            let target = resolve_target(context, owner_id, slug)?;
            let config = MediaClientConfig::from_env()
                .context("Invalid configuration. Check PAWPLANET_* environment variables")?;

            let media = MediaFile::from_path(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;

            let handlers = UploadHandlers::new()
                .on_progress(|progress| eprintln!("{}", format_progress(progress)));
            let orchestrator = MediaUploadOrchestrator::from_config(config, handlers)
                .context("Failed to create upload client")?;

            let result = orchestrator
                .upload(media, context, target)
                .await
                .context("Upload failed")?;
            print_json(&result)?;
        }
        Commands::Contexts => {
            let contexts: Vec<_> = UploadContext::all()
                .iter()
                .map(|context| {
                    serde_json::json!({
                        "context": context.as_str(),
                        "key": context.key_kind().to_string(),
                        "avatar": context.is_avatar(),
                    })
                })
                .collect();
            print_json(&contexts)?;
        }
    }

    Ok(())
}
