use clap::{Args, Subcommand, ValueEnum};

use crate::config::Config;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Manage configuration
#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        println!("documents_dir: {}", config.documents_dir.display());
                        println!();

                        println!("sync:");
                        println!(
                            "  server_url: {}",
                            config.sync.server_url.as_deref().unwrap_or("(not set)")
                        );
                        println!(
                            "  api_token: {}",
                            if config.sync.api_token.is_some() {
                                "(set)"
                            } else {
                                "(not set)"
                            }
                        );
                        println!("  url_field: {}", config.sync.url_field);
                        println!("  title_field: {}", config.sync.title_field);
                        println!("  tags_field: {}", config.sync.tags_field);
                        println!("  id_field: {}", config.sync.id_field);
                        println!("  sync_title: {}", config.sync.sync_title);
                        println!("  sync_tags: {}", config.sync.sync_tags);
                        println!(
                            "  check_before_create: {}",
                            config.sync.check_before_create
                        );
                        println!(
                            "  recheck_on_recreate: {}",
                            config.sync.recheck_on_recreate
                        );
                    }
                }
                Ok(())
            }
        }
    }
}
