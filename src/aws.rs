//! Shared AWS settings.

use aws_config::{BehaviorVersion, Region, SdkConfig};

use crate::config::Config;

/// Resolve credentials through the default provider chain for the configured region.
///
/// The returned settings are handed to every AWS-backed client explicitly.
pub async fn load_sdk_config(config: &Config) -> SdkConfig {
    let sdk_config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await;
    tracing::debug!(
        region = %config.aws_region,
        has_credentials = sdk_config.credentials_provider().is_some(),
        "Loaded AWS settings"
    );
    sdk_config
}
