//! Post-dispatch lifecycle: move a processed object under the archive prefix.
//!
//! S3 has no rename, so the move is a copy followed by a delete of the
//! original. A failed delete leaves the object in both places; nothing here
//! tries to undo the copy.

use relay_common::error::RelayError;
use relay_common::types::{ARCHIVE_MARKER, NotificationRecord, PROCESS_MARKER};

use crate::ObjectStore;

/// Destination key for an archived object.
///
/// Replaces the first `process/` in `key` with `archive/`. A key without the
/// marker maps to itself.
pub fn archive_key(key: &str) -> String {
    key.replacen(PROCESS_MARKER, ARCHIVE_MARKER, 1)
}

/// Copy-then-delete transition for one record.
pub struct LifecycleTransition<'a, S: ObjectStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: ObjectStore + ?Sized> LifecycleTransition<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Archive the record's object and remove the original.
    ///
    /// Returns the archive key on success.
    pub async fn run(&self, record: &NotificationRecord) -> Result<String, RelayError> {
        let destination = self.archive(record).await?;
        self.cleanup(record).await?;
        Ok(destination)
    }

    /// Copy the object to its archive key, returning that key.
    pub async fn archive(&self, record: &NotificationRecord) -> Result<String, RelayError> {
        let destination = archive_key(&record.key);
        if destination == record.key {
            tracing::warn!(
                bucket = %record.bucket,
                key = %record.key,
                "Key has no process/ marker, archive key equals source key"
            );
        }

        self.store
            .copy(&record.bucket, &record.key, &destination)
            .await
            .map_err(|source| RelayError::Archive {
                bucket: record.bucket.clone(),
                from: record.key.clone(),
                to: destination.clone(),
                source,
            })?;

        tracing::debug!(
            bucket = %record.bucket,
            from = %record.key,
            to = %destination,
            "Object copied to archive"
        );
        Ok(destination)
    }

    /// Delete the original object. Only meaningful after [`Self::archive`].
    pub async fn cleanup(&self, record: &NotificationRecord) -> Result<(), RelayError> {
        self.store
            .delete(&record.bucket, &record.key)
            .await
            .map_err(|source| RelayError::Cleanup {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_archive_key_replaces_marker() {
        assert_eq!(archive_key("process/db1.json"), "archive/db1.json");
        assert_eq!(
            archive_key("tenants/acme/process/db1.json"),
            "tenants/acme/archive/db1.json"
        );
    }

    #[test]
    fn test_archive_key_only_first_occurrence() {
        assert_eq!(
            archive_key("process/process/db1.json"),
            "archive/process/db1.json"
        );
    }

    #[test]
    fn test_archive_key_without_marker_is_identity() {
        assert_eq!(archive_key("incoming/db1.json"), "incoming/db1.json");
        assert_eq!(archive_key("processed.json"), "processed.json");
        assert_eq!(archive_key(""), "");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]
        #[test]
        fn test_archive_key_swaps_single_marker(
            prefix in "[a-z0-9_./-]{0,24}",
            suffix in "[a-z0-9_./-]{0,24}"
        ) {
            prop_assume!(!prefix.contains(PROCESS_MARKER));
            let key = format!("{prefix}{PROCESS_MARKER}{suffix}");
            prop_assert_eq!(archive_key(&key), format!("{prefix}{ARCHIVE_MARKER}{suffix}"));
        }

        #[test]
        fn test_archive_key_identity_without_marker(key in "\\PC*") {
            prop_assume!(!key.contains(PROCESS_MARKER));
            prop_assert_eq!(archive_key(&key), key);
        }
    }
}
