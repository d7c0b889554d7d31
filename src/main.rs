use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};

mod api;
mod client;
mod components;
mod config;
mod error;
mod files;
mod logging;
mod menu;
mod screens;
mod statusbar;
mod ui;

use config::QualAiConfig;
use files::upload::{collect_upload_files, UploadItem};
use ui::App;

#[derive(Parser)]
#[command(name = "qualai", about = "Terminal client for the QualAI transcript backend")]
struct Cli {
    /// Backend base URL
    #[arg(long)]
    server_url: Option<String>,

    /// Project to associate uploads with
    #[arg(long)]
    project: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Upload files or folders without starting the TUI
    Upload {
        /// Files or directories to upload
        paths: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = QualAiConfig::default();
    if let Some(url) = cli.server_url {
        config.server_url = url;
    }
    if let Some(project) = cli.project {
        config.project = Some(project);
    }

    match cli.command {
        Some(Command::Upload { paths }) => {
            logging::init_logger();
            upload_headless(config, paths).await
        }
        None => {
            tui_logger::init_logger(log::LevelFilter::Info)
                .map_err(|e| anyhow!("Failed to initialize logger: {e}"))?;
            tui_logger::set_default_level(log::LevelFilter::Info);
            logging::switch_to_tui_logging();

            let mut app = App::new(config)?;
            app.run().await
        }
    }
}

async fn upload_headless(config: QualAiConfig, paths: Vec<PathBuf>) -> Result<()> {
    use api::{QualAiApi, UploadParams};

    if paths.is_empty() {
        return Err(anyhow!("No paths given; nothing to upload"));
    }

    let mut items = Vec::new();
    for path in paths {
        items.push(UploadItem::from_path(&path)?);
    }
    let files = collect_upload_files(items).await?;
    if files.is_empty() {
        return Err(anyhow!("No files found under the given paths"));
    }

    let count = files.len();
    log::info!("Uploading {count} file(s) to {}", config.server_url);

    let client = api::v1::QualAiApiV1::new(&config)?;
    client
        .upload(UploadParams {
            files,
            project: config.project.clone(),
        })
        .await?;

    println!("Uploaded {count} file(s)");
    Ok(())
}
