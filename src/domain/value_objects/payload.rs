use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Opaque domain fields of a record (title, status, form answers, ...).
/// The sync engine never inspects the contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordPayload(Value);

impl RecordPayload {
    pub fn new(value: Value) -> Result<Self, String> {
        Self::validate(&value)?;
        Ok(Self(value))
    }

    pub fn from_json_str(json: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| format!("Invalid JSON payload: {e}"))?;
        Self::new(value)
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }

    pub fn into_inner(self) -> Value {
        self.0
    }

    fn validate(value: &Value) -> Result<(), String> {
        if value.is_null() {
            return Err("Record payload cannot be null".to_string());
        }
        Ok(())
    }
}

impl From<RecordPayload> for Value {
    fn from(payload: RecordPayload) -> Self {
        payload.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_payload_rejected() {
        assert!(RecordPayload::new(Value::Null).is_err());
        assert!(RecordPayload::new(json!({"title": "Tower inspection"})).is_ok());
    }

    #[test]
    fn test_from_json_str_rejects_invalid_json() {
        assert!(RecordPayload::from_json_str("{not json").is_err());
    }
}
