pub mod env;
pub mod types;

use anyhow::{Context, Result};
use std::path::Path;

pub use types::{Config, DiscoveryConfig, DnsConfig, LogConfig, TimeoutConfig};

pub fn load_config(path: &str) -> Result<Config> {
    let content = load_config_content(path)?;
    let config = parse_config(&content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_config_content(path: &str) -> Result<String> {
    let raw_content = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read config file {}", path))?;
    Ok(env::expand_env_vars(&raw_content))
}

/// 空文件视为全部默认值
pub fn parse_config(content: &str) -> Result<Config> {
    if content.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yml::from_str(content)?)
}
