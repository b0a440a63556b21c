//! Per-notification processing pipeline.
//!
//! For every record of a batch, in order:
//! 1. Fetch the object the notification points at
//! 2. Decode it and map it into a dispatch envelope
//! 3. Deliver the envelope to GitHub
//! 4. Copy the object under `archive/` and delete the original
//!
//! The first failure aborts the record and every record after it.

use tracing::Instrument;

use relay_common::error::RelayError;
use relay_common::types::{NotificationRecord, RecordStage, SUCCESS_MESSAGE};
use relay_decoders::{S3Event, decode_payload, extract_records, map_to_envelope, parse_event};
use relay_notifier::GithubDispatcher;
use relay_storage::{LifecycleTransition, ObjectStore};

pub struct Pipeline<S> {
    store: S,
    dispatcher: GithubDispatcher,
}

impl<S: ObjectStore> Pipeline<S> {
    pub fn new(store: S, dispatcher: GithubDispatcher) -> Self {
        Self { store, dispatcher }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Parse a raw invocation payload as a storage notification and process it.
    pub async fn handle_payload(
        &self,
        payload: serde_json::Value,
    ) -> Result<&'static str, RelayError> {
        let event = parse_event(payload)?;
        self.handle_event(&event).await
    }

    /// Process every record of a storage notification.
    pub async fn handle_event(&self, event: &S3Event) -> Result<&'static str, RelayError> {
        let records = extract_records(event);
        self.process_batch(&records).await
    }

    /// Process records one at a time, stopping at the first error.
    pub async fn process_batch(
        &self,
        records: &[NotificationRecord],
    ) -> Result<&'static str, RelayError> {
        tracing::info!(records = records.len(), "Processing notification batch");

        for (index, record) in records.iter().enumerate() {
            let span = tracing::info_span!(
                "record",
                index,
                bucket = %record.bucket,
                key = %record.key
            );
            self.process_record(record).instrument(span).await?;
        }

        Ok(SUCCESS_MESSAGE)
    }

    /// Run a single record through fetch, decode, dispatch and archive.
    pub async fn process_record(&self, record: &NotificationRecord) -> Result<(), RelayError> {
        advance(RecordStage::Received);

        let raw = self
            .store
            .get(&record.bucket, &record.key)
            .await
            .map_err(|source| RelayError::StorageRead {
                bucket: record.bucket.clone(),
                key: record.key.clone(),
                source,
            })?;
        tracing::debug!(bytes = raw.len(), "Payload fetched");
        advance(RecordStage::Fetched);

        let payload = decode_payload(&record.key, &raw)?;
        let envelope = map_to_envelope(payload);
        advance(RecordStage::Decoded);

        self.dispatcher.dispatch(&envelope).await?;
        advance(RecordStage::Dispatched);

        let lifecycle = LifecycleTransition::new(&self.store);
        let archived = lifecycle.archive(record).await?;
        advance(RecordStage::Archived);

        lifecycle.cleanup(record).await?;
        advance(RecordStage::Deleted);

        tracing::info!(archive_key = %archived, "Record processed");
        Ok(())
    }
}

fn advance(stage: RecordStage) {
    tracing::debug!(stage = %stage, "Record stage reached");
}
