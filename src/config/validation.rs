use crate::config::CrawlConfig;
use crate::url::canonicalize;
use crate::ConfigError;

/// Validates a crawl configuration
///
/// Every check here is fatal: a crawl with an invalid configuration never
/// starts, so nothing downstream needs to defend against these cases.
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_seed(&config.seed_url)?;
    validate_bounds(config)?;
    Ok(())
}

/// Validates the seed URL
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if seed.is_empty() {
        return Err(ConfigError::InvalidSeed {
            url: seed.to_string(),
            reason: "seed URL cannot be empty".to_string(),
        });
    }

    canonicalize(seed).map_err(|e| ConfigError::InvalidSeed {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    Ok(())
}

/// Validates worker, pool, page, and depth bounds
fn validate_bounds(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_pages == 0 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }

    if config.max_workers == 0 || config.max_workers > 100 {
        return Err(ConfigError::Validation(format!(
            "max_workers must be between 1 and 100, got {}",
            config.max_workers
        )));
    }

    if config.pool_size == 0 {
        return Err(ConfigError::Validation(
            "pool_size must be >= 1".to_string(),
        ));
    }

    if config.max_depth > 64 {
        return Err(ConfigError::Validation(format!(
            "max_depth must be <= 64, got {}",
            config.max_depth
        )));
    }

    Ok(())
}
