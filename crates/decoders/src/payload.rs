use relay_common::error::RelayError;
use relay_common::types::{DispatchEnvelope, SourcePayload};

/// Decode the bytes of a fetched object into a [`SourcePayload`].
///
/// A `null` document decodes to a payload of empty fields. `key` is only
/// used for error context.
pub fn decode_payload(key: &str, raw: &[u8]) -> Result<SourcePayload, RelayError> {
    serde_json::from_slice::<Option<SourcePayload>>(raw)
        .map(Option::unwrap_or_default)
        .map_err(|source| RelayError::Decode {
            key: key.to_string(),
            source,
        })
}

/// Build the outbound dispatch envelope for a decoded payload.
pub fn map_to_envelope(payload: SourcePayload) -> DispatchEnvelope {
    DispatchEnvelope::from_payload(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use relay_common::types::DISPATCH_EVENT_TYPE;

    fn full_payload_json() -> serde_json::Value {
        serde_json::json!({
            "instance_id": "i-1",
            "app_id": "a1",
            "appd_id": "ad-7",
            "environment": "production",
            "instance_class": "db.r6g.large",
            "size_storage": "100",
            "db_name": "orders",
            "pg_major_version": "16",
            "collation": "en_US.UTF-8",
            "encoding": "UTF8"
        })
    }

    #[test]
    fn test_envelope_copies_every_field() {
        let input = full_payload_json();
        let payload = decode_payload("process/db1.json", input.to_string().as_bytes()).unwrap();
        let envelope = map_to_envelope(payload);

        assert_eq!(envelope.event_type, DISPATCH_EVENT_TYPE);
        let wire = serde_json::to_value(&envelope).unwrap();
        assert_eq!(wire["client_payload"], input);
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let payload =
            decode_payload("process/db1.json", br#"{"instance_id":"i-1","app_id":"a1"}"#).unwrap();
        assert_eq!(payload.instance_id, "i-1");
        assert_eq!(payload.app_id, "a1");
        assert_eq!(payload.environment, "");
        assert_eq!(payload.encoding, "");
    }

    #[test]
    fn test_null_fields_decode_to_empty() {
        let payload =
            decode_payload("process/db1.json", br#"{"instance_id":"i-1","collation":null}"#)
                .unwrap();
        assert_eq!(payload.instance_id, "i-1");
        assert_eq!(payload.collation, "");

        let wire = serde_json::to_value(map_to_envelope(payload)).unwrap();
        assert_eq!(wire["client_payload"]["collation"], "");
    }

    #[test]
    fn test_null_document_decodes_to_empty_payload() {
        let payload = decode_payload("process/db1.json", b"null").unwrap();
        assert_eq!(payload, SourcePayload::default());
    }

    #[test]
    fn test_unknown_fields_ignored() {
        let payload = decode_payload(
            "process/db1.json",
            br#"{"db_name":"orders","owner":"team-x","tags":{"cost":"42"}}"#,
        )
        .unwrap();
        assert_eq!(payload.db_name, "orders");
    }

    #[test]
    fn test_malformed_bytes() {
        let err = decode_payload("process/db1.json", b"{\"instance_id\": ").unwrap_err();
        match err {
            RelayError::Decode { key, .. } => assert_eq!(key, "process/db1.json"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_string_field_rejected() {
        let err = decode_payload("process/db1.json", br#"{"size_storage": 100}"#).unwrap_err();
        assert!(matches!(err, RelayError::Decode { .. }));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn test_envelope_mirrors_any_payload(values in prop::collection::vec("\\PC*", 10)) {
            let input = serde_json::json!({
                "instance_id": values[0],
                "app_id": values[1],
                "appd_id": values[2],
                "environment": values[3],
                "instance_class": values[4],
                "size_storage": values[5],
                "db_name": values[6],
                "pg_major_version": values[7],
                "collation": values[8],
                "encoding": values[9],
            });

            let payload = decode_payload("process/prop.json", input.to_string().as_bytes()).unwrap();
            let envelope = map_to_envelope(payload.clone());

            prop_assert_eq!(&envelope.event_type, DISPATCH_EVENT_TYPE);
            prop_assert_eq!(&envelope.client_payload, &payload);
            let wire = serde_json::to_value(&envelope).unwrap();
            prop_assert_eq!(&wire["client_payload"], &input);
        }
    }
}
