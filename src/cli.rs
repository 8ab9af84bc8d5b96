//! Command-line argument parsing for webcat.

use clap::Parser;
use std::path::PathBuf;
use webcat::config::Config;

/// Shows a text file next to the results of configured database queries.
#[derive(Parser, Debug)]
#[command(name = "webcat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(long, value_name = "PATH", env = "WEBCAT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Address to listen on (overrides http.bind)
    #[arg(short = 'b', long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Stream results to the client as they are produced
    #[arg(long, conflicts_with = "eager")]
    pub streaming: bool,

    /// Compute every result before responding
    #[arg(long)]
    pub eager: bool,

    /// Validate the configuration, print a summary and exit
    #[arg(long)]
    pub check: bool,

    /// Write logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses --config (or WEBCAT_CONFIG) if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(Config::default_path)
    }

    /// Returns the aggregation mode requested on the command line, if any.
    pub fn streaming_override(&self) -> Option<bool> {
        if self.streaming {
            Some(true)
        } else if self.eager {
            Some(false)
        } else {
            None
        }
    }

    /// Applies command-line overrides to a loaded configuration.
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(bind) = &self.bind {
            config.http.bind = bind.clone();
        }
        if let Some(streaming) = self.streaming_override() {
            config.streaming = Some(streaming);
        }
    }
}
