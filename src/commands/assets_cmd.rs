//! Inspect and download archived assets for a bookmark.

use std::path::PathBuf;

use clap::Args;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::sync::BookmarkClient;

/// List or download a bookmark's archived assets
#[derive(Debug, Args)]
pub struct AssetsCommand {
    /// Bookmark identifier
    id: i64,

    /// Download all completed assets into this directory
    #[arg(long)]
    download: Option<PathBuf>,
}

impl AssetsCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let client = BookmarkClient::from_config(&config.sync)?;
        let cancel = CancellationToken::new();

        let page = client.list_assets(self.id, &cancel).await?;
        if page.results.is_empty() {
            println!("No assets for bookmark #{}", self.id);
            return Ok(());
        }

        for asset in &page.results {
            println!(
                "  #{} {} ({}, {})",
                asset.id, asset.display_name, asset.content_type, asset.status
            );
        }

        if let Some(dir) = &self.download {
            std::fs::create_dir_all(dir)?;
            println!();
            for asset in page.results.iter().filter(|a| a.status == "complete") {
                let name = if asset.display_name.is_empty() {
                    format!("asset-{}", asset.id)
                } else {
                    asset.display_name.clone()
                };
                let destination = dir.join(name);
                client
                    .download_asset(self.id, asset.id, &destination, &cancel)
                    .await?;
                println!("  ✓ downloaded {}", destination.display());
            }
        }

        Ok(())
    }
}
