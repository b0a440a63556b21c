//! S3 event notification model and record extraction.
//!
//! Only the bucket name and object key of each record are used; everything
//! else in the document is accepted and ignored.

use serde::Deserialize;

use relay_common::error::RelayError;
use relay_common::types::NotificationRecord;

/// Batch of storage-change events delivered in one invocation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct S3Event {
    #[serde(rename = "Records", default)]
    pub records: Vec<S3EventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3EventRecord {
    #[serde(rename = "eventName", default)]
    pub event_name: Option<String>,
    pub s3: S3Entity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Entity {
    pub bucket: S3Bucket,
    pub object: S3Object,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Bucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3Object {
    pub key: String,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Interpret the invocation payload as a notification document.
pub fn parse_event(raw: serde_json::Value) -> Result<S3Event, RelayError> {
    serde_json::from_value(raw).map_err(RelayError::Notification)
}

/// Pull `(bucket, key)` out of every record, preserving delivery order.
pub fn extract_records(event: &S3Event) -> Vec<NotificationRecord> {
    event
        .records
        .iter()
        .map(|record| {
            NotificationRecord::new(
                record.s3.bucket.name.clone(),
                decode_object_key(&record.s3.object.key),
            )
        })
        .collect()
}

/// Undo the form-URL encoding S3 applies to keys in notifications.
///
/// Keys that do not decode to valid UTF-8 are returned unchanged.
pub fn decode_object_key(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            tracing::warn!(key = raw, error = %e, "Object key is not valid percent-encoding");
            raw.to_string()
        }
    }
}
