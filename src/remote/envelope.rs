//! Envelope normalization. Endpoints disagree on the discriminator
//! (`status` vs `success`) and on the payload key (`data` vs
//! `submissions`); everything past this module only sees `Record`s.

use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::record::Record;
use crate::screen::{Discriminator, EnvelopeAdapter};

/// Payload keys tried after the adapter's own key.
const KNOWN_PAYLOAD_KEYS: &[&str] = &["data", "submissions", "records", "items"];

/// Outcome carried by a write response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Success,
    Failure(String),
}

fn parse_body(body: &str) -> AppResult<Value> {
    serde_json::from_str(body).map_err(|e| {
        let preview: String = body.chars().take(80).collect();
        AppError::MalformedResponse(format!("{e} (body starts with {preview:?})"))
    })
}

fn discriminate(adapter: &EnvelopeAdapter, envelope: &Value) -> AppResult<Ack> {
    let obj = envelope
        .as_object()
        .ok_or_else(|| AppError::MalformedResponse("envelope is not a JSON object".into()))?;

    let ok = match adapter.discriminator {
        Discriminator::Status => obj
            .get("status")
            .and_then(Value::as_str)
            .map(|s| s.eq_ignore_ascii_case("success")),
        Discriminator::Success => obj.get("success").and_then(Value::as_bool),
    };

    // An endpoint redeployed with the other convention still reads correctly.
    let ok = ok
        .or_else(|| obj.get("success").and_then(Value::as_bool))
        .or_else(|| {
            obj.get("status")
                .and_then(Value::as_str)
                .map(|s| s.eq_ignore_ascii_case("success"))
        })
        .ok_or_else(|| {
            AppError::MalformedResponse("envelope has no status or success field".into())
        })?;

    if ok {
        Ok(Ack::Success)
    } else {
        let message = obj
            .get("message")
            .or_else(|| obj.get("error"))
            .and_then(Value::as_str)
            .unwrap_or("the endpoint reported an error without a message")
            .to_string();
        Ok(Ack::Failure(message))
    }
}

/// Decode a read response into records, unsorted.
pub fn read_collection(adapter: &EnvelopeAdapter, body: &str) -> AppResult<Vec<Record>> {
    let envelope = parse_body(body)?;
    if let Ack::Failure(message) = discriminate(adapter, &envelope)? {
        return Err(AppError::RemoteOperation(message));
    }

    let payload = std::iter::once(adapter.payload_key)
        .chain(KNOWN_PAYLOAD_KEYS.iter().copied())
        .find_map(|key| envelope.get(key).and_then(Value::as_array))
        .ok_or_else(|| {
            AppError::MalformedResponse(format!(
                "envelope has no `{}` array",
                adapter.payload_key
            ))
        })?;

    let records: Vec<Record> = payload
        .iter()
        .cloned()
        .filter_map(Record::from_value)
        .collect();
    if records.len() < payload.len() {
        tracing::warn!(
            "Dropped {} non-object entries from payload",
            payload.len() - records.len()
        );
    }
    Ok(records)
}

/// Decode a write response.
pub fn read_ack(adapter: &EnvelopeAdapter, body: &str) -> AppResult<Ack> {
    discriminate(adapter, &parse_body(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATUS: EnvelopeAdapter = EnvelopeAdapter {
        discriminator: Discriminator::Status,
        payload_key: "data",
    };
    const SUBMISSIONS: EnvelopeAdapter = EnvelopeAdapter {
        discriminator: Discriminator::Success,
        payload_key: "submissions",
    };

    #[test]
    fn test_status_envelope() {
        let body = r#"{"status":"success","data":[{"id":"1"},{"id":"2"}]}"#;
        let records = read_collection(&STATUS, body).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("id").as_deref(), Some("1"));
    }

    #[test]
    fn test_success_envelope_with_submissions() {
        let body = r#"{"success":true,"submissions":[{"submissionId":"S1"}]}"#;
        let records = read_collection(&SUBMISSIONS, body).unwrap();
        assert_eq!(records[0].text("submissionId").as_deref(), Some("S1"));
    }

    #[test]
    fn test_falls_back_to_other_convention() {
        let body = r#"{"success":true,"data":[{"id":"1"}]}"#;
        assert_eq!(read_collection(&STATUS, body).unwrap().len(), 1);
    }

    #[test]
    fn test_error_envelope() {
        let body = r#"{"status":"error","message":"Sheet not found"}"#;
        match read_collection(&STATUS, body) {
            Err(AppError::RemoteOperation(m)) => assert_eq!(m, "Sheet not found"),
            other => panic!("unexpected: {other:?}"),
        }

        let body = r#"{"success":false,"error":"quota"}"#;
        assert_eq!(
            read_ack(&SUBMISSIONS, body).unwrap(),
            Ack::Failure("quota".into())
        );
    }

    #[test]
    fn test_malformed_bodies() {
        assert!(matches!(
            read_collection(&STATUS, "<html>login</html>"),
            Err(AppError::MalformedResponse(_))
        ));
        assert!(matches!(
            read_collection(&STATUS, r#"{"status":"success"}"#),
            Err(AppError::MalformedResponse(_))
        ));
        assert!(matches!(
            read_collection(&STATUS, r#"{"data":[]}"#),
            Err(AppError::MalformedResponse(_))
        ));
        assert!(matches!(
            read_collection(&STATUS, "[1,2]"),
            Err(AppError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_ack_success() {
        assert_eq!(
            read_ack(&STATUS, r#"{"status":"success","message":"saved"}"#).unwrap(),
            Ack::Success
        );
    }
}
