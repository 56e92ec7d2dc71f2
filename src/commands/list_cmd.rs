//! List documents and their sync eligibility.

use clap::Args;

use crate::config::Config;
use crate::scanner::scan_documents;
use crate::sync::{eligible, unsynced};

/// List syncable documents
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Only show documents that have never been synced
    #[arg(long)]
    unsynced: bool,
}

impl ListCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let documents = scan_documents(&config.documents_dir)?;
        let options = config.sync.options();

        let selected = if self.unsynced {
            unsynced(&documents, &options)
        } else {
            eligible(&documents, &options)
        };

        if selected.is_empty() {
            println!("No matching documents in {}", config.documents_dir.display());
            return Ok(());
        }

        for document in &selected {
            let id = document.field_int(&options.id_field).unwrap_or(0);
            let marker = if id > 0 {
                format!("#{}", id)
            } else {
                "unsynced".to_string()
            };
            println!("  {} ({})", document.path().display(), marker);
        }
        println!();
        println!(
            "{} of {} document(s) {}",
            selected.len(),
            documents.len(),
            if self.unsynced { "unsynced" } else { "eligible" }
        );

        Ok(())
    }
}
