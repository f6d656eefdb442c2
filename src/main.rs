mod cli;

use vidserve::{config, server};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use vidserve_common::MediaToken;

async fn start_server(
    config_path: Option<&Path>,
    host: Option<String>,
    port: Option<u16>,
    media_root: Option<PathBuf>,
) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;

    // CLI flags win over the config file and environment
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }
    if let Some(root) = media_root {
        config.media.root = root;
    }
    config::expand_paths(&mut config);
    config::validate_config(&config)?;

    tracing::info!("Starting vidserve");
    tracing::info!(
        "Server will listen on {}:{}",
        config.server.host,
        config.server.port
    );

    server::start_server(config).await
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "vidserve=trace,vidserve_media=trace,vidserve_common=debug,tower_http=debug".to_string()
        } else {
            "vidserve=debug,vidserve_media=debug,tower_http=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    match cli.command {
        Commands::Start {
            host,
            port,
            media_root,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(start_server(cli.config.as_deref(), host, port, media_root))
        }
        Commands::List { media_root, json } => list_media(cli.config.as_deref(), media_root, json),
        Commands::Encode { path } => {
            println!("{}", MediaToken::encode(&path));
            Ok(())
        }
        Commands::Decode { id } => {
            let path = vidserve_common::token::decode(&id)
                .with_context(|| format!("Not a valid media id: {id}"))?;
            println!("{}", path);
            Ok(())
        }
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("vidserve {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn list_media(config_path: Option<&Path>, media_root: Option<PathBuf>, json: bool) -> Result<()> {
    let mut config = config::load_config_or_default(config_path)?;
    if let Some(root) = media_root {
        config.media.root = root;
    }
    config::expand_paths(&mut config);

    let mut entries = config
        .media
        .index()
        .list()
        .with_context(|| format!("Failed to list media under {:?}", config.media.root))?;
    entries.sort_by(|a, b| a.path.cmp(&b.path));

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!("{}  {:>12}  {:<18}  {}", entry.id, entry.size, entry.mime, entry.path);
    }
    println!("\n{} video files under {}", entries.len(), config.media.root.display());

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let mut config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            config::load_config(p)?
        }
        None => {
            println!("No config file specified, using defaults and environment");
            config::load_config_or_default(None)?
        }
    };
    config::expand_paths(&mut config);
    config::validate_config(&config)?;

    println!("✓ Configuration is valid");
    println!("  Server: {}:{}", config.server.host, config.server.port);
    println!(
        "  Access key: {}",
        if config.server.access_key.is_some() {
            "required"
        } else {
            "disabled"
        }
    );
    println!("  Media root: {}", config.media.root.display());
    println!("  Extensions: {}", config.media.extensions.join(", "));
    println!("  Follow symlinks: {}", config.media.follow_symlinks);
    println!("  On unreadable directories: {:?}", config.media.scan_errors);

    Ok(())
}
