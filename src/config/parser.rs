use crate::config::CrawlProfile;
use crate::ConfigError;
use std::path::Path;

/// Loads a crawl profile from a TOML file
///
/// # Arguments
///
/// * `path` - Path to the TOML profile
///
/// # Returns
///
/// * `Ok(CrawlProfile)` - Parsed profile
/// * `Err(ConfigError)` - The file could not be read or parsed
pub fn load_profile(path: &Path) -> Result<CrawlProfile, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let profile = toml::from_str(&content)?;
    Ok(profile)
}
