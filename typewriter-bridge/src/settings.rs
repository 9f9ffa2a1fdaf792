//! Config resolution: file, then command-line overrides.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use typewriter_core::{DelayPolicy, SpanDelimiter, TypewriterConfig};

use crate::cli::CliArgs;

/// `<config dir>/typewriter/config.json`, if the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "typewriter").map(|dirs| dirs.config_dir().join("config.json"))
}

/// Build the run config for `args`.
///
/// An explicit `--config` must exist; the default location is optional.
pub fn resolve(args: &CliArgs) -> Result<TypewriterConfig> {
    let mut config = match &args.config {
        Some(path) => load(path)?,
        None => match default_config_path() {
            Some(path) if path.exists() => load(&path)?,
            _ => {
                debug!("no config file, using defaults");
                TypewriterConfig::default()
            }
        },
    };

    apply_overrides(&mut config, args)?;
    config.validate()?;
    Ok(config)
}

fn load(path: &Path) -> Result<TypewriterConfig> {
    let config = TypewriterConfig::load(path)?;
    info!(path = %path.display(), "loaded config");
    Ok(config)
}

pub fn apply_overrides(config: &mut TypewriterConfig, args: &CliArgs) -> Result<()> {
    if let Some(marker) = &args.delimiter {
        config.delimiter = SpanDelimiter::symmetric(marker.as_str())
            .with_context(|| format!("--delimiter {marker:?}"))?;
    }
    if let Some(speed) = &args.speed {
        config.delay =
            DelayPolicy::parse_speed(speed).with_context(|| format!("--speed {speed:?}"))?;
    }
    if args.strip {
        config.strip_delimiters = true;
    }
    if let Some(strategy) = args.strategy() {
        config.strategy = strategy;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    Ok(())
}
