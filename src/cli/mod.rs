// src/cli/mod.rs
// Headless commands. Without a subcommand the desktop window is launched.

pub mod analyze;
pub mod key;
pub mod report;

use bevy::app::App;
use bevy::log::{Level, LogPlugin};
use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::analysis::error::AnalysisError;
use crate::settings::credential::CredentialError;

#[derive(Parser)]
#[command(name = "chromadev")]
#[command(about = "ChromaDev - multi-component chromatographic method advisor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze SMILES strings and/or structure images without opening the window
    Analyze(analyze::AnalyzeArgs),

    /// Store the Gemini API key in the system keyring
    SetKey {
        /// The API key
        key: String,
    },

    /// Remove the stored API key
    ClearKey,

    /// Show where the API key would be loaded from
    KeyStatus,
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Credential(#[from] CredentialError),
    /// The unified method could not be obtained; carries the top-level message.
    #[error("{0}")]
    RunFailed(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Could not serialize the report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Installs the global log subscriber the same way the window does.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    App::new().add_plugins(LogPlugin {
        level,
        filter: "wgpu=error,naga=warn,reqwest=warn,hyper=warn,hyper_util=warn".to_string(),
        ..Default::default()
    });
}

pub fn run(command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Analyze(args) => {
            init_logging(args.verbose);
            analyze::run(args)
        }
        Commands::SetKey { key } => {
            init_logging(false);
            key::set_key(&key)
        }
        Commands::ClearKey => {
            init_logging(false);
            key::clear_key()
        }
        Commands::KeyStatus => {
            init_logging(false);
            key::key_status();
            Ok(())
        }
    }
}
