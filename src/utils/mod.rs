pub mod retry;

use alloy_primitives::{Address, B256};
use config::{Config, Environment, File};
use std::{collections::HashMap, path::Path, str::FromStr};
use tracing::{info, warn};

use crate::models::common::{Settings, DEFAULT_RPC_URL};
use crate::models::errors::ConfigurationError;

pub const DEFAULT_CONFIG_FILE: &str = "config.yml";
const ENV_PREFIX: &str = "BRIDGE_SNAPSHOT";

/// Loads settings from defaults, the optional config file and the process environment.
/// An explicitly passed `path` must exist; the default `config.yml` may be absent.
pub fn load_settings(path: Option<&Path>) -> Result<Settings, ConfigurationError> {
    let env: HashMap<String, String> = std::env::vars().collect();
    build_settings(path, env)
}

pub fn build_settings(
    path: Option<&Path>,
    env: HashMap<String, String>,
) -> Result<Settings, ConfigurationError> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    info!("Config path: {}", file.to_string_lossy());

    let rpc_url = env.get("RPC_URL").cloned();

    let config = Config::builder()
        .set_default("rpc_url", DEFAULT_RPC_URL)
        .and_then(|b| b.set_default("blocks", 2000))
        .and_then(|b| b.set_default("max_logs", 5000))
        .and_then(|b| b.set_default("max_block_range", 0))
        .and_then(|b| b.set_default("concurrency", 4))
        .and_then(|b| b.set_default("deadline_secs", 120))
        .and_then(|b| b.set_default("retry.max_attempts", 5))
        .and_then(|b| b.set_default("retry.base_delay_ms", 500))
        .and_then(|b| b.set_default("retry.max_delay_ms", 10_000))
        .map_err(settings_error)?
        .add_source(File::from(file).required(path.is_some()))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(env)),
        )
        // RPC_URL is the conventional name and takes precedence over every other source
        .set_override_option("rpc_url", rpc_url)
        .map_err(settings_error)?
        .build()
        .map_err(settings_error)?;

    config
        .try_deserialize::<Settings>()
        .map_err(settings_error)
}

fn settings_error(e: config::ConfigError) -> ConfigurationError {
    ConfigurationError::Settings(e.to_string())
}

pub fn parse_address(value: &str) -> Result<Address, ConfigurationError> {
    Address::from_str(value.trim()).map_err(|_| ConfigurationError::InvalidAddress {
        value: value.to_string(),
    })
}

/// Parses a topic0 filter. Hex digits are accepted in either case.
pub fn parse_topic0(value: &str) -> Result<B256, ConfigurationError> {
    let trimmed = value.trim();
    if !trimmed.starts_with("0x") || trimmed.len() != 66 {
        return Err(ConfigurationError::InvalidTopic0 {
            value: value.to_string(),
        });
    }
    B256::from_str(trimmed).map_err(|_| ConfigurationError::InvalidTopic0 {
        value: value.to_string(),
    })
}

/// Resolves the requested block bounds against the chain tip.
///
/// Without explicit bounds the last `blocks` blocks up to the tip are used. A missing lower
/// bound is derived from the upper one. An upper bound beyond the tip is clamped to the tip.
pub fn resolve_block_range(
    from_block: Option<u64>,
    to_block: Option<u64>,
    blocks: u64,
    tip: u64,
) -> Result<(u64, u64), ConfigurationError> {
    if blocks == 0 {
        return Err(ConfigurationError::InvalidBlockCount);
    }

    let mut to = to_block.unwrap_or(tip);
    if to > tip {
        warn!(
            "Requested toBlock {} is beyond the chain tip {}; clamping to the tip",
            to, tip
        );
        to = tip;
    }
    let from = from_block.unwrap_or_else(|| to.saturating_sub(blocks - 1));

    if from > to {
        return Err(ConfigurationError::InvalidRange {
            from_block: from,
            to_block: to,
        });
    }
    Ok((from, to))
}

pub fn strip_html(error: &str) -> String {
    // If the error contains HTML tags, extract just the text content
    if error.contains("<!doctype html>") || error.contains("<html>") {
        // Remove all HTML tags and return the first non-empty line of text
        error
            .lines()
            .map(|line| line.trim())
            .find(|line| {
                !line.starts_with('<')
                    && !line.ends_with('>')
                    && !line.is_empty()
                    && *line != "html"
                    && *line != "body"
            })
            .unwrap_or(error)
            .to_string()
    } else {
        error.to_string()
    }
}
