//! Decoding of inbound storage notifications and the payload objects they point at.

pub mod notification;
pub mod payload;

pub use notification::{S3Event, extract_records, parse_event};
pub use payload::{decode_payload, map_to_envelope};
