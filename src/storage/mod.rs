//! Persistence for weather records (table store) and archives (blob store).
//!
//! Each store is split into a thin async backend trait, implemented for the
//! in-memory stores and (with the `aws` feature) DynamoDB and S3, and an
//! accessor that owns the domain rules: keys, lenient decoding, ordering.

pub mod blob;
pub mod memory;
pub mod table;

#[cfg(feature = "aws")]
pub mod dynamodb;
#[cfg(feature = "aws")]
pub mod s3;

pub use blob::*;
pub use memory::*;
pub use table::*;

use crate::config::{ConfigError, StorageBackend, StorageConfig};
use std::sync::Arc;

/// Build the table and blob backends selected by configuration.
pub async fn connect_backends(
    config: &StorageConfig,
) -> Result<(Arc<dyn TableBackend>, Arc<dyn BlobBackend>), ConfigError> {
    match config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; records are lost on restart");
            Ok((Arc::new(MemoryTable::new()), Arc::new(MemoryBlob::new())))
        }
        #[cfg(feature = "aws")]
        StorageBackend::Aws => {
            let sdk = load_aws_config(&config.region, config.endpoint_url.as_deref()).await;
            Ok((
                Arc::new(dynamodb::DynamoTable::from_sdk_config(
                    &sdk,
                    config.dynamodb_table.clone(),
                )),
                Arc::new(s3::S3Blob::from_sdk_config(&sdk, config.s3_bucket.clone())),
            ))
        }
        #[cfg(not(feature = "aws"))]
        StorageBackend::Aws => Err(ConfigError::BackendUnavailable(StorageBackend::Aws)),
    }
}

/// Shared SDK configuration for the DynamoDB and S3 backends.
#[cfg(feature = "aws")]
pub async fn load_aws_config(region: &str, endpoint: Option<&str>) -> aws_config::SdkConfig {
    let mut loader = aws_config::from_env().region(aws_config::Region::new(region.to_string()));

    if let Some(endpoint_url) = endpoint {
        tracing::info!(endpoint = %endpoint_url, "Using custom AWS endpoint");
        loader = loader.endpoint_url(endpoint_url);
    }

    loader.load().await
}

/// Errors raised by either store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store write failed: {0}")]
    Write(String),

    #[error("store read failed: {0}")]
    Read(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("failed to decode stored data: {0}")]
    Decode(#[from] serde_json::Error),
}
