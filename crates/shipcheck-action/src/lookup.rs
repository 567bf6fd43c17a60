//! Release lookup by release name

use shipcheck_core::{Release, shorten_name};

use crate::config::Configuration;
use crate::error::{Result, VerifyError};

/// Fetch the highest revision stored for `release_name`
///
/// The name is shortened the same way it was when the release was written.
/// A missing release is reported as [`VerifyError::ReleaseNotFound`]; every
/// other storage failure is passed through.
pub async fn last_release(config: &Configuration, release_name: &str) -> Result<Release> {
    let name = shorten_name(release_name);
    match config.driver.last(&config.storage_namespace, &name).await {
        Ok(release) => {
            tracing::debug!(release = %release.full_name(), "found last release");
            Ok(release)
        }
        Err(e) if e.is_not_found() => Err(VerifyError::ReleaseNotFound),
        Err(e) => Err(VerifyError::Storage(e)),
    }
}

/// Check whether any revision is stored for `release_name`
///
/// Storage failures other than not-found are returned as errors, never as
/// `false`.
pub async fn is_installed(config: &Configuration, release_name: &str) -> Result<bool> {
    match last_release(config, release_name).await {
        Ok(_) => Ok(true),
        Err(VerifyError::ReleaseNotFound) => Ok(false),
        Err(e) => Err(e),
    }
}
