//! Shared AWS SDK configuration
//!
//! Builds one `SdkConfig` for both the Glue and S3 clients. Static
//! credentials and an endpoint override come from our config when set
//! (minio/localstack in development); otherwise the default provider
//! chain applies.

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;

use txp_common::config::AwsConfig;

pub async fn load_sdk_config(config: &AwsConfig) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.region.clone()));

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            access_key,
            secret_key,
            None,
            None,
            "txp-config",
        ));
    }

    if let Some(endpoint) = &config.endpoint {
        loader = loader.endpoint_url(endpoint);
    }

    loader.load().await
}
