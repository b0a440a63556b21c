use serde::{Deserialize, Deserializer, Serialize};

/// `event_type` sent with every dispatch; selects the workflow to trigger.
pub const DISPATCH_EVENT_TYPE: &str = "trigger-workflow";

/// Key segment marking objects waiting to be processed.
pub const PROCESS_MARKER: &str = "process/";

/// Key segment that replaces [`PROCESS_MARKER`] once an object is archived.
pub const ARCHIVE_MARKER: &str = "archive/";

/// Value returned to the runtime when a whole batch went through.
pub const SUCCESS_MESSAGE: &str = "Verwerking voltooid";

/// Location of one object that triggered a storage notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub bucket: String,
    pub key: String,
}

impl NotificationRecord {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Database provisioning request stored as JSON in the bucket.
///
/// Missing and `null` fields decode to empty strings and unknown fields are
/// ignored. Values are forwarded as-is without validation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcePayload {
    #[serde(deserialize_with = "null_as_empty")]
    pub instance_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub app_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub appd_id: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub environment: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub instance_class: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub size_storage: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub db_name: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub pg_major_version: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub collation: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub encoding: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Body of a GitHub `repository_dispatch` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchEnvelope {
    pub event_type: String,
    pub client_payload: SourcePayload,
}

impl DispatchEnvelope {
    /// Wrap a decoded payload, copying each field explicitly.
    ///
    /// The field names are the wire contract with the triggered workflow.
    pub fn from_payload(payload: SourcePayload) -> Self {
        let SourcePayload {
            instance_id,
            app_id,
            appd_id,
            environment,
            instance_class,
            size_storage,
            db_name,
            pg_major_version,
            collation,
            encoding,
        } = payload;

        Self {
            event_type: DISPATCH_EVENT_TYPE.to_string(),
            client_payload: SourcePayload {
                instance_id,
                app_id,
                appd_id,
                environment,
                instance_class,
                size_storage,
                db_name,
                pg_major_version,
                collation,
                encoding,
            },
        }
    }
}

/// Progress of a single record through the pipeline.
///
/// Stages advance strictly in declaration order; a failure at any point
/// aborts the record and the rest of its batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RecordStage {
    Received,
    Fetched,
    Decoded,
    Dispatched,
    Archived,
    Deleted,
}

impl std::fmt::Display for RecordStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecordStage::Received => write!(f, "received"),
            RecordStage::Fetched => write!(f, "fetched"),
            RecordStage::Decoded => write!(f, "decoded"),
            RecordStage::Dispatched => write!(f, "dispatched"),
            RecordStage::Archived => write!(f, "archived"),
            RecordStage::Deleted => write!(f, "deleted"),
        }
    }
}
