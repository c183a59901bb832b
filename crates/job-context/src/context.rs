use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{JobContextError, Result};

/// Field of the envelope file that carries the encoded context.
pub const PAYLOAD_FIELD: &str = "base64-encoded-job-context";

/// Everything a remote job container needs before it runs its command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobContext {
    pub config_map: BTreeMap<String, String>,
    pub config_dir: String,
    pub job_command: String,
    pub command_timeout: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub aws_credentials: BTreeMap<String, String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let map: Option<BTreeMap<String, String>> = Option::deserialize(deserializer)?;
    Ok(map.unwrap_or_default())
}

/// On-disk wrapper around the encoded context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextEnvelope {
    #[serde(rename = "base64-encoded-job-context")]
    pub encoded: String,
}

impl JobContext {
    pub fn from_base64(encoded: &str) -> Result<Self> {
        let raw = BASE64
            .decode(encoded.trim())
            .map_err(|source| JobContextError::InvalidBase64 { source })?;
        serde_json::from_slice(&raw).map_err(|source| JobContextError::InvalidContext { source })
    }

    pub fn to_base64(&self) -> Result<String> {
        let raw =
            serde_json::to_vec(self).map_err(|source| JobContextError::Serialize { source })?;
        Ok(BASE64.encode(raw))
    }

    pub fn to_envelope(&self) -> Result<ContextEnvelope> {
        Ok(ContextEnvelope {
            encoded: self.to_base64()?,
        })
    }

    /// Copy of the context with every credential value masked.
    pub fn without_secrets(&self) -> JobContext {
        let mut masked = self.clone();
        for value in masked.aws_credentials.values_mut() {
            *value = "***".to_string();
        }
        masked
    }

    pub fn redacted(&self) -> Result<Value> {
        serde_json::to_value(self.without_secrets())
            .map_err(|source| JobContextError::Serialize { source })
    }
}

/// Pull the encoded payload out of an envelope document.
///
/// A document that is not an object and an object without the payload
/// field are reported as different errors.
pub fn extract_payload(document: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(document).map_err(|e| JobContextError::InvalidEnvelope {
            message: e.to_string(),
        })?;
    let obj = value
        .as_object()
        .ok_or_else(|| JobContextError::InvalidEnvelope {
            message: format!("expected object, found {}", json_kind(&value)),
        })?;
    obj.get(PAYLOAD_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| JobContextError::MissingPayloadField {
            field: PAYLOAD_FIELD.to_string(),
        })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[instrument]
pub fn load_job_context(path: &Path) -> Result<JobContext> {
    let document = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => JobContextError::ContextFileNotFound {
            path: path.to_string_lossy().to_string(),
        },
        _ => JobContextError::io(path, e),
    })?;
    let encoded = extract_payload(&document)?;
    debug!(encoded_len = encoded.len(), "decoding job context payload");
    let context = JobContext::from_base64(&encoded)?;
    debug!(
        config_files = context.config_map.len(),
        credentials = context.aws_credentials.len(),
        "decoded job context"
    );
    Ok(context)
}

#[instrument(skip(context))]
pub fn write_job_context(path: &Path, context: &JobContext) -> Result<()> {
    let envelope = context.to_envelope()?;
    let body = serde_json::to_string_pretty(&envelope)
        .map_err(|source| JobContextError::Serialize { source })?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| JobContextError::io(parent, e))?;
    }
    fs::write(path, body).map_err(|e| JobContextError::io(path, e))
}
