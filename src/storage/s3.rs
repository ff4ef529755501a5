//! S3 blob backend.

use crate::storage::{BlobBackend, ObjectSummary, PutObject, StoreError};
use async_trait::async_trait;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use chrono::DateTime;
use tracing::{error, info};

pub struct S3Blob {
    client: Client,
    bucket: String,
}

impl S3Blob {
    pub fn new(client: Client, bucket: String) -> Self {
        info!(bucket = %bucket, "S3 blob backend initialized");
        Self { client, bucket }
    }

    pub fn from_sdk_config(config: &aws_config::SdkConfig, bucket: String) -> Self {
        Self::new(Client::new(config), bucket)
    }
}

#[async_trait]
impl BlobBackend for S3Blob {
    async fn put_object(&self, object: PutObject) -> Result<(), StoreError> {
        let size = object.body.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&object.key)
            .body(ByteStream::from(object.body))
            .content_type(object.content_type)
            .set_metadata(Some(object.metadata.into_iter().collect()))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                error!(bucket = %self.bucket, key = %object.key, error = %message, "Failed to upload to S3");
                StoreError::Write(message)
            })?;

        info!(bucket = %self.bucket, key = %object.key, size, "Uploaded object to S3");
        Ok(())
    }

    async fn get_object(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(err) => {
                let service_error = err.into_service_error();
                if service_error.is_no_such_key() {
                    return Ok(None);
                }
                return Err(StoreError::Read(
                    DisplayErrorContext(&service_error).to_string(),
                ));
            }
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StoreError::Read(e.to_string()))?;

        Ok(Some(data.into_bytes().to_vec()))
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<ObjectSummary>, StoreError> {
        let mut objects = Vec::new();
        let mut continuation = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StoreError::Read(DisplayErrorContext(&e).to_string()))?;

            for object in output.contents() {
                objects.push(ObjectSummary {
                    key: object.key().unwrap_or_default().to_string(),
                    size: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: object
                        .last_modified()
                        .and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos())),
                });
            }

            match output.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        Ok(objects)
    }

    fn name(&self) -> &'static str {
        "s3"
    }
}
