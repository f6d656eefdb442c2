mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variables that override the config file.
pub const ENV_HOST: &str = "VIDSERVE_HOST";
pub const ENV_PORT: &str = "VIDSERVE_PORT";
pub const ENV_MEDIA_ROOT: &str = "VIDSERVE_MEDIA_ROOT";
pub const ENV_ACCESS_KEY: &str = "VIDSERVE_ACCESS_KEY";

/// Load configuration from a TOML file, then apply environment overrides
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Load config from default locations or fall back to defaults.
///
/// Environment overrides are applied either way.
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./vidserve.toml",
        "./config.toml",
        "~/.config/vidserve/config.toml",
        "/etc/vidserve/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    let mut config = Config::default();
    apply_env_overrides(&mut config)?;
    Ok(config)
}

/// Apply `VIDSERVE_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    apply_overrides_from(config, |name| std::env::var(name).ok())
}

/// Apply overrides using `lookup` as the variable source. Empty values are
/// treated as unset.
pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(host) = get(ENV_HOST) {
        config.server.host = host;
    }
    if let Some(port) = get(ENV_PORT) {
        config.server.port = port
            .trim()
            .parse()
            .with_context(|| format!("{ENV_PORT} is not a valid port: {port:?}"))?;
    }
    if let Some(root) = get(ENV_MEDIA_ROOT) {
        config.media.root = PathBuf::from(root);
    }
    if let Some(key) = get(ENV_ACCESS_KEY) {
        config.server.access_key = Some(key);
    }

    Ok(())
}

/// Expand `~` in the media root.
pub fn expand_paths(config: &mut Config) {
    let root = config.media.root.to_string_lossy().into_owned();
    let expanded = shellexpand::tilde(&root);
    if expanded != root {
        config.media.root = PathBuf::from(expanded.as_ref());
    }
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    let root = &config.media.root;
    let metadata = std::fs::metadata(root)
        .with_context(|| format!("Media root does not exist: {:?}", root))?;
    if !metadata.is_dir() {
        anyhow::bail!("Media root is not a directory: {:?}", root);
    }

    if config
        .media
        .extensions
        .iter()
        .all(|ext| ext.trim_start_matches('.').is_empty())
    {
        anyhow::bail!("Media extension allow-list is empty");
    }

    match config.server.access_key.as_deref() {
        Some(key) if key.trim().is_empty() => {
            anyhow::bail!("Access key is set but empty");
        }
        None if config.server.host != "127.0.0.1" && config.server.host != "localhost" => {
            tracing::warn!(
                "No access key configured; media on {} is readable by anyone who can reach it",
                config.server.host
            );
        }
        _ => {}
    }

    Ok(())
}
