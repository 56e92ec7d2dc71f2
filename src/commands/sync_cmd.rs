//! Sync CLI commands for reconciling documents with the bookmark service.

use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::document::DocumentError;
use crate::scanner::scan_documents;
use crate::sync::{
    sync_documents, BookmarkClient, SyncAction, SyncError, SyncOutcome,
};

/// Sync documents with the bookmark service
#[derive(Debug, Args)]
pub struct SyncCommand {
    /// Compute actions without touching the service or local files
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<SyncSubcommand>,
}

#[derive(Debug, Subcommand)]
enum SyncSubcommand {
    /// Show sync configuration and server status
    Status,
}

impl SyncCommand {
    pub async fn run(&self, config: &Config) -> Result<(), SyncCommandError> {
        match &self.command {
            None => self.sync(config).await,
            Some(SyncSubcommand::Status) => self.status(config).await,
        }
    }

    async fn sync(&self, config: &Config) -> Result<(), SyncCommandError> {
        let client = BookmarkClient::from_config(&config.sync)?;

        let mut documents = scan_documents(&config.documents_dir)?;
        if documents.is_empty() {
            println!("No documents found in {}", config.documents_dir.display());
            return Ok(());
        }

        let mut options = config.sync.options();
        options.dry_run = self.dry_run;

        if self.dry_run {
            println!("Dry run: no changes will be made.");
        }
        println!("Syncing {} document(s)...", documents.len());
        println!();

        // Ctrl-C cancels the batch; in-flight work winds down promptly.
        let cancel = CancellationToken::new();
        {
            let cancel = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    cancel.cancel();
                }
            });
        }

        let progress = |outcome: &SyncOutcome| print_outcome(outcome);
        let result =
            sync_documents(&client, &mut documents, &options, Some(&progress), &cancel).await;

        // Persist identifiers picked up during the run
        if !self.dry_run {
            for document in documents.iter_mut().filter(|d| d.is_modified()) {
                document.save()?;
            }
        }

        let counts = result.counts();
        println!();
        if result.cancelled {
            println!("Cancelled after {} document(s).", result.outcomes.len());
        }
        println!(
            "{} created, {} updated, {} verified, {} skipped, {} error(s)",
            counts.created, counts.updated, counts.verified, counts.skipped, counts.errors
        );

        Ok(())
    }

    async fn status(&self, config: &Config) -> Result<(), SyncCommandError> {
        println!("Sync Configuration");
        println!("==================");
        println!();

        if !config.sync.is_configured() {
            println!("Status: Not configured");
            println!();
            println!("To enable sync, add to your config file:");
            println!();
            println!("  sync:");
            println!("    server_url: \"https://linkding.example.com\"");
            println!("    api_token: \"your-api-token\"");
            println!();
            println!("Or set environment variables:");
            println!("  MARKDING_SERVER_URL");
            println!("  MARKDING_API_TOKEN");
            return Ok(());
        }

        let server_url = config.sync.server_url.as_deref().unwrap_or_default();
        let api_token = config.sync.api_token.as_deref().unwrap_or_default();

        println!("Server:    {}", server_url);
        println!("API Token: {}...", &api_token[..api_token.len().min(8)]);
        println!("Documents: {}", config.documents_dir.display());
        println!();

        // Try a list call to check server reachability
        print!("Server status: ");

        let client = BookmarkClient::from_config(&config.sync)?;
        let cancel = CancellationToken::new();
        match client.list(None, &cancel).await {
            Ok(page) => println!("✓ connected ({} bookmark(s))", page.count),
            Err(SyncError::Transport(_)) => println!("✗ unreachable"),
            Err(e) => println!("✗ error: {}", e),
        }

        Ok(())
    }
}

fn print_outcome(outcome: &SyncOutcome) {
    let path = outcome.path.display();
    match outcome.action {
        SyncAction::Created => match outcome.remote_id {
            Some(id) => println!("  ✓ created   {} (#{})", path, id),
            None => println!("  ✓ created   {}", path),
        },
        SyncAction::Updated => println!("  ✓ updated   {}", path),
        SyncAction::Verified => println!("  ✓ verified  {}", path),
        SyncAction::Skipped => println!("  - skipped   {}", path),
        SyncAction::Error => {
            let detail = outcome
                .error
                .as_ref()
                .map(|e| e.to_string())
                .unwrap_or_default();
            println!("  ✗ error     {}: {}", path, detail);
        }
    }
}

/// Errors from sync commands
#[derive(Debug)]
pub enum SyncCommandError {
    Sync(SyncError),
    Document(DocumentError),
}

impl std::fmt::Display for SyncCommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncCommandError::Sync(e) => write!(f, "{}", e),
            SyncCommandError::Document(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SyncCommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SyncCommandError::Sync(e) => Some(e),
            SyncCommandError::Document(e) => Some(e),
        }
    }
}

impl From<SyncError> for SyncCommandError {
    fn from(e: SyncError) -> Self {
        SyncCommandError::Sync(e)
    }
}

impl From<DocumentError> for SyncCommandError {
    fn from(e: DocumentError) -> Self {
        SyncCommandError::Document(e)
    }
}
