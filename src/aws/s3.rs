//! S3-backed object store for the cleanup sweep

use crate::aws::context::AwsContext;
use crate::aws::error::classify;
use crate::control_plane::ObjectStore;
use crate::error::ControlPlaneError;
use async_trait::async_trait;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use tracing::debug;

/// Batch size limit for DeleteObjects.
const DELETE_BATCH: usize = 1000;

pub struct S3Client {
    client: aws_sdk_s3::Client,
}

impl S3Client {
    pub fn from_context(ctx: &AwsContext) -> Self {
        Self {
            client: ctx.s3_client(),
        }
    }
}

fn build_error(err: aws_sdk_s3::error::BuildError) -> ControlPlaneError {
    ControlPlaneError::Api(Box::new(err))
}

#[async_trait]
impl ObjectStore for S3Client {
    async fn list_buckets(&self) -> Result<Vec<String>, ControlPlaneError> {
        let response = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify("bucket", "list", e))?;

        Ok(response
            .buckets()
            .iter()
            .filter_map(|b| b.name().map(str::to_string))
            .collect())
    }

    async fn list_keys(
        &self,
        bucket: &str,
        prefix: &str,
    ) -> Result<Vec<String>, ControlPlaneError> {
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;

        loop {
            let mut request = self.client.list_objects_v2().bucket(bucket).prefix(prefix);
            if let Some(token) = &continuation_token {
                request = request.continuation_token(token);
            }

            let response = request
                .send()
                .await
                .map_err(|e| classify("bucket", bucket, e))?;

            for object in response.contents() {
                if let Some(key) = object.key() {
                    keys.push(key.to_string());
                }
            }

            if response.is_truncated() == Some(true) {
                continuation_token = response.next_continuation_token().map(str::to_string);
            } else {
                break;
            }
        }

        debug!(bucket = %bucket, prefix = %prefix, count = keys.len(), "Listed keys");
        Ok(keys)
    }

    async fn has_keys(&self, bucket: &str, prefix: &str) -> Result<bool, ControlPlaneError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(bucket)
            .prefix(prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| classify("bucket", bucket, e))?;

        Ok(response.key_count().unwrap_or(0) > 0)
    }

    async fn delete_keys(&self, bucket: &str, keys: &[String]) -> Result<(), ControlPlaneError> {
        for chunk in keys.chunks(DELETE_BATCH) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(build_error)?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .build()
                .map_err(build_error)?;

            self.client
                .delete_objects()
                .bucket(bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| classify("bucket", bucket, e))?;
        }

        debug!(bucket = %bucket, count = keys.len(), "Deleted keys");
        Ok(())
    }
}
