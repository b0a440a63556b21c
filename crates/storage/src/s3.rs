use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use bytes::Bytes;

use relay_common::config::RelayConfig;
use relay_common::error::StorageError;

use crate::ObjectStore;

/// [`ObjectStore`] backed by Amazon S3 or an S3-compatible service.
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    /// Build a client for the configured region.
    ///
    /// Credentials come from the default AWS provider chain. A custom endpoint
    /// switches the client to path-style addressing.
    pub async fn new(config: &RelayConfig) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &config.s3_endpoint_url {
            tracing::debug!(endpoint = %endpoint, "Using custom S3 endpoint");
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        tracing::info!(region = %config.aws_region, "S3 client initialized");
        Self::from_client(Client::from_conf(builder.build()))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

/// `CopySource` header value; the key part must be URL-encoded.
fn copy_source(bucket: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", bucket, encoded.join("/"))
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(service) if service.is_no_such_key() => StorageError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                },
                _ => StorageError::Service(DisplayErrorContext(&e).to_string()),
            })?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Stream(e.to_string()))?;

        Ok(body.into_bytes())
    }

    async fn copy(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), StorageError> {
        self.client
            .copy_object()
            .bucket(bucket)
            .copy_source(copy_source(bucket, source_key))
            .key(dest_key)
            .send()
            .await
            .map_err(|e| StorageError::Service(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Service(DisplayErrorContext(&e).to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_source_plain_key() {
        assert_eq!(
            copy_source("intake", "process/db1.json"),
            "intake/process/db1.json"
        );
    }

    #[test]
    fn test_copy_source_encodes_segments() {
        assert_eq!(
            copy_source("intake", "process/my report+v2.json"),
            "intake/process/my%20report%2Bv2.json"
        );
    }
}
