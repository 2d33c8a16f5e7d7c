//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::Result;
use photobox_core::Config;

/// Validate critical configuration values
///
/// Fails fast on settings that would make the service insecure or unable to
/// serve requests.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    // Validate CORS configuration in production
    if config.is_production() && config.cors_origins().iter().any(|o| o == "*") {
        return Err(anyhow::anyhow!(
            "CORS configured to allow all origins (*) in production - this is a security risk. \
            Please set specific allowed origins via CORS_ORIGINS environment variable."
        ));
    }

    if config.max_upload_body_bytes() == usize::MAX {
        tracing::warn!("Upload body size is effectively unlimited");
    }

    Ok(())
}
