//! CLI command handlers

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{self, ConfigLoader, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Get configuration value, or the whole configuration without a key
    Get {
        /// Configuration key (e.g., "server.listen", "events.globalEventsCap")
        key: Option<String>,
    },
    /// Set configuration value in the configuration file
    Set {
        /// Configuration key (e.g., "server.listen", "events.globalEventsCap")
        key: String,
        /// Configuration value
        value: String,
    },
    /// List the keys `get` and `set` accept
    Keys,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
    /// Write an annotated configuration file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: ConfigSubcommand) -> Result<()> {
    match cmd {
        ConfigSubcommand::Get { key } => {
            let config = ConfigLoader::load().context("Failed to load configuration")?;

            if let Some(key) = key {
                let value = config::get_config_value(&config, &key)?;
                println!("{}", value);
            } else {
                let yaml =
                    serde_yaml::to_string(&config).context("Failed to serialize configuration")?;
                print!("{}", yaml);
            }
        }
        ConfigSubcommand::Set { key, value } => {
            // Only the file is written, so environment overrides stay out of it
            let mut config = ConfigLoader::load_root().context("Failed to load configuration")?;

            config::set_config_value(&mut config, &key, &value)
                .with_context(|| format!("Failed to set {} = {}", key, value))?;
            config
                .validate()
                .with_context(|| format!("Invalid value for {}", key))?;

            ConfigLoader::save_root(&config).context("Failed to save configuration")?;
            println!("Configuration saved");
        }
        ConfigSubcommand::Keys => {
            for key in config::KEYS {
                println!("{}", key);
            }
        }
        ConfigSubcommand::Path => {
            println!("{}", paths::root_config_path().display());
        }
        ConfigSubcommand::Validate => match ConfigLoader::validate() {
            Ok(_) => {
                println!("Configuration is valid");
            }
            Err(e) => {
                eprintln!("Configuration validation failed: {:#}", e);
                std::process::exit(1);
            }
        },
        ConfigSubcommand::Init { force } => {
            let path = paths::root_config_path();
            if path.exists() && !force {
                anyhow::bail!(
                    "{} already exists, pass --force to overwrite it",
                    path.display()
                );
            }
            if let Some(parent) = path.parent() {
                paths::ensure_dir(parent)?;
            }
            std::fs::write(&path, config::template())
                .with_context(|| format!("Failed to write config file: {}", path.display()))?;
            println!("Configuration written to {}", path.display());
        }
    }

    Ok(())
}
