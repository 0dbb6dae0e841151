// src/provides/codec.rs

//! Persisted form of the provides blob
//!
//! The non-reserved provides keys are stored as one minimal JSON object
//! (string values only, no surrounding document). The blob is a durable wire
//! format read directly by other device tooling, so escaping must stay
//! exactly valid JSON and an empty mapping encodes as the empty string
//! (record absent), never as `"{}"`.

use super::{ProvidesData, ARTIFACT_GROUP_PROVIDE, ARTIFACT_NAME_PROVIDE};
use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Encode the non-reserved provides entries as a JSON object string
///
/// Returns the empty string when no non-reserved entries remain.
pub fn encode_provides(provides: &ProvidesData) -> String {
    let mut object = Map::new();
    for (key, value) in provides {
        if key != ARTIFACT_NAME_PROVIDE && key != ARTIFACT_GROUP_PROVIDE {
            object.insert(key.clone(), Value::String(value.clone()));
        }
    }

    if object.is_empty() {
        return String::new();
    }
    // Serializing a Map of strings cannot fail.
    serde_json::to_string(&Value::Object(object)).expect("provides object must serialize")
}

/// Decode a stored provides blob back into a mapping
///
/// The empty string decodes to an empty mapping. Anything else must be a
/// JSON object whose members are all strings; non-string members indicate a
/// blob this agent never wrote and are reported as parse errors.
pub fn decode_provides(blob: &str) -> Result<ProvidesData> {
    let mut provides = ProvidesData::new();
    if blob.is_empty() {
        return Ok(provides);
    }

    let value: Value = serde_json::from_str(blob)?;
    let object = value
        .as_object()
        .ok_or_else(|| Error::parse("stored provides is not a JSON object"))?;

    for (key, member) in object {
        match member.as_str() {
            Some(text) => {
                provides.insert(key.clone(), text.to_string());
            }
            None => {
                return Err(Error::parse(format!(
                    "unexpected non-string data in provides key '{key}'"
                )));
            }
        }
    }

    Ok(provides)
}
