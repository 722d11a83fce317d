use crate::config::ConfigOverrides;
use crate::mock::ResponseShape;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "toxiscan")]
#[command(author, version, about = "Classify comments as toxic or non-toxic")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "toxiscan.yaml")]
    pub config: PathBuf,

    /// Directory for the history file
    #[arg(long, global = true)]
    pub history_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP API for the web UI
    Serve {
        /// Listen address
        #[arg(short, long)]
        listen: Option<String>,

        /// Listen port
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,

        /// Prediction service URL
        #[arg(short, long)]
        upstream: Option<String>,

        /// Keep history in memory only
        #[arg(long)]
        ephemeral: bool,
    },

    /// Classify a single comment and record it in history
    Classify {
        /// Comment text
        comment: String,

        /// Prediction service URL
        #[arg(short, long)]
        upstream: Option<String>,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show past classifications, newest first
    History {
        /// Maximum records to show
        #[arg(short = 'n', long, default_value = "20")]
        limit: usize,

        /// Print records as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete the local classification history
    ClearHistory,

    /// Run a keyword-based stand-in for the prediction service
    MockModel {
        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1")]
        listen: String,

        /// Listen port
        #[arg(short, long, default_value = "5000")]
        port: u16,

        /// Response shape: prediction or is-toxic
        #[arg(long, default_value = "prediction", value_parser = parse_shape)]
        shape: ResponseShape,
    },
}

impl Cli {
    /// Config overrides carried by the selected command
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides {
            history_dir: self.history_dir.clone(),
            ..Default::default()
        };

        match &self.command {
            Commands::Serve {
                listen,
                port,
                upstream,
                ephemeral,
            } => {
                overrides.listen = listen.clone();
                overrides.port = *port;
                overrides.upstream = upstream.clone();
                overrides.ephemeral = *ephemeral;
            }
            Commands::Classify { upstream, .. } => {
                overrides.upstream = upstream.clone();
            }
            _ => {}
        }

        overrides
    }
}

fn parse_shape(s: &str) -> Result<ResponseShape, String> {
    s.parse()
}
