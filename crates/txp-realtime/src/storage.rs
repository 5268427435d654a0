//! Object-store upload

use std::path::Path;

use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::info;

use txp_common::config::AwsConfig;
use txp_common::{EtlError, Result};

use crate::aws::load_sdk_config;

/// S3 client bound to the configured bucket.
pub struct Storage {
    client: Client,
    bucket: String,
}

impl Storage {
    pub async fn new(config: &AwsConfig) -> Self {
        let sdk_config = load_sdk_config(config).await;
        // Path-style addressing is what minio/localstack endpoints expect.
        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(config.endpoint.is_some())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            bucket: config.s3_bucket.clone(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Upload a local file under the given object key.
    pub async fn upload_file(&self, key: &str, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let body = ByteStream::from_path(path)
            .await
            .map_err(|err| EtlError::Storage(err.to_string()))?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(body)
            .send()
            .await
            .map_err(|err| EtlError::Storage(err.to_string()))?;

        info!(
            file = %path.display(),
            bucket = %self.bucket,
            key,
            "uploaded to object storage"
        );
        Ok(())
    }
}
