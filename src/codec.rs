// ABOUTME: Document codec turning stored bytes into a string-keyed mapping and back.
// ABOUTME: The YAML implementation only accepts documents whose root is a mapping.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CodecError {
    #[error("document is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("document is not valid YAML: {0}")]
    Decode(#[source] serde_yaml::Error),

    #[error("only mapping documents are supported, found {0}")]
    NotAMapping(&'static str),

    #[error("failed to encode document: {0}")]
    Encode(#[source] serde_yaml::Error),
}

/// Converts between raw file bytes and a single-level mapping.
pub trait DocumentCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Mapping, CodecError>;

    fn encode(&self, document: &Mapping) -> Result<Vec<u8>, CodecError>;
}

/// YAML codec backed by `serde_yaml`.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlCodec;

impl DocumentCodec for YamlCodec {
    fn decode(&self, bytes: &[u8]) -> Result<Mapping, CodecError> {
        let text = std::str::from_utf8(bytes)?;
        let value: Value = serde_yaml::from_str(text).map_err(CodecError::Decode)?;

        match value {
            Value::Mapping(mapping) => Ok(mapping),
            other => Err(CodecError::NotAMapping(value_kind(&other))),
        }
    }

    fn encode(&self, document: &Mapping) -> Result<Vec<u8>, CodecError> {
        serde_yaml::to_string(document)
            .map(String::into_bytes)
            .map_err(CodecError::Encode)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "an empty document",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
