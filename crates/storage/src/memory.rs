//! In-memory object store.
//!
//! Records every call so callers can assert on the exact sequence of storage
//! operations, and can be told to fail a given operation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use relay_common::error::StorageError;

use crate::ObjectStore;

/// Kind of storage operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOp {
    Get,
    Copy,
    Delete,
}

/// One recorded call against a [`MemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageCall {
    Get { bucket: String, key: String },
    Copy { bucket: String, from: String, to: String },
    Delete { bucket: String, key: String },
}

impl StorageCall {
    pub fn op(&self) -> StorageOp {
        match self {
            StorageCall::Get { .. } => StorageOp::Get,
            StorageCall::Copy { .. } => StorageOp::Copy,
            StorageCall::Delete { .. } => StorageOp::Delete,
        }
    }
}

#[derive(Default)]
struct Inner {
    objects: HashMap<(String, String), Bytes>,
    calls: Vec<StorageCall>,
    failures: HashMap<StorageOp, String>,
}

#[derive(Default)]
pub struct MemoryObjectStore {
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an object, replacing any previous content.
    pub fn put(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.lock()
            .objects
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    /// Make every subsequent call of `op` fail with a service error.
    pub fn fail(&self, op: StorageOp, message: impl Into<String>) {
        self.lock().failures.insert(op, message.into());
    }

    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.lock()
            .objects
            .contains_key(&(bucket.to_string(), key.to_string()))
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.lock()
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// All calls received so far, in order.
    pub fn calls(&self) -> Vec<StorageCall> {
        self.lock().calls.clone()
    }

    /// Number of calls of a given kind.
    pub fn count(&self, op: StorageOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn check_failure(&self, op: StorageOp) -> Result<(), StorageError> {
        match self.failures.get(&op) {
            Some(message) => Err(StorageError::Service(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Get {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        inner.check_failure(StorageOp::Get)?;

        inner
            .objects
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn copy(
        &self,
        bucket: &str,
        source_key: &str,
        dest_key: &str,
    ) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Copy {
            bucket: bucket.to_string(),
            from: source_key.to_string(),
            to: dest_key.to_string(),
        });
        inner.check_failure(StorageOp::Copy)?;

        // S3 refuses to copy an object onto itself without changing anything.
        if source_key == dest_key {
            return Err(StorageError::Service(format!(
                "InvalidRequest: copy of {bucket}/{source_key} to itself is not allowed"
            )));
        }

        let body = inner
            .objects
            .get(&(bucket.to_string(), source_key.to_string()))
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                bucket: bucket.to_string(),
                key: source_key.to_string(),
            })?;
        inner
            .objects
            .insert((bucket.to_string(), dest_key.to_string()), body);
        Ok(())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.calls.push(StorageCall::Delete {
            bucket: bucket.to_string(),
            key: key.to_string(),
        });
        inner.check_failure(StorageOp::Delete)?;

        // Deleting a missing key succeeds, as in S3.
        inner.objects.remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_missing_object() {
        let store = MemoryObjectStore::new();
        let err = store.get("intake", "process/none.json").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
        assert_eq!(store.count(StorageOp::Get), 1);
    }

    #[tokio::test]
    async fn test_copy_and_delete() {
        let store = MemoryObjectStore::new();
        store.put("intake", "process/a.json", "{}");

        store
            .copy("intake", "process/a.json", "archive/a.json")
            .await
            .unwrap();
        store.delete("intake", "process/a.json").await.unwrap();

        assert!(!store.contains("intake", "process/a.json"));
        assert_eq!(
            store.object("intake", "archive/a.json"),
            Some(Bytes::from("{}"))
        );
    }

    #[tokio::test]
    async fn test_injected_failure_still_recorded() {
        let store = MemoryObjectStore::new();
        store.put("intake", "process/a.json", "{}");
        store.fail(StorageOp::Delete, "AccessDenied");

        let err = store.delete("intake", "process/a.json").await.unwrap_err();
        assert_eq!(err.to_string(), "Storage service error: AccessDenied");
        assert!(store.contains("intake", "process/a.json"));
        assert_eq!(store.count(StorageOp::Delete), 1);
    }
}
