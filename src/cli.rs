use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vidserve")]
#[command(author, version, about = "Serve a local video directory over HTTP with range requests")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config and VIDSERVE_HOST)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config and VIDSERVE_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory to serve (overrides config and VIDSERVE_MEDIA_ROOT)
        #[arg(short, long)]
        media_root: Option<PathBuf>,
    },

    /// List the video files under the media root
    List {
        /// Directory to scan (overrides config)
        #[arg(short, long)]
        media_root: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the media id for a path relative to the media root
    Encode {
        /// Relative path, `/`-separated
        path: String,
    },

    /// Print the relative path a media id stands for
    Decode {
        /// Media id
        id: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
