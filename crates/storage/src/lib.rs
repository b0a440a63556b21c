//! Object storage access and the post-dispatch archive transition.

pub mod archive;
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use relay_common::error::StorageError;

pub use archive::{LifecycleTransition, archive_key};
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// The three object operations the relay needs from a storage service.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Read the full content of an object.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Copy an object to another key in the same bucket.
    async fn copy(&self, bucket: &str, source_key: &str, dest_key: &str)
    -> Result<(), StorageError>;

    /// Remove an object.
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}
