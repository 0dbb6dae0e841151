// src/device_type.rs

//! Device-type declaration file reader
//!
//! The file holds exactly one line of the form `device_type=<value>`. The
//! value is returned verbatim, trailing whitespace included. One trailing
//! newline after the line is tolerated; any further content is rejected, so
//! a truncated or concatenated file never yields a silently wrong type.

use crate::error::{Error, Result};
use std::fs;
use std::path::Path;

const DEVICE_TYPE_PREFIX: &str = "device_type=";

/// Read and validate the device type from `path`
pub fn read_device_type(path: &Path) -> Result<String> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read device type from '{}': {e}", path.display()),
        ))
    })?;

    let (line, rest) = match contents.split_once('\n') {
        Some((line, rest)) => (line, Some(rest)),
        None => (contents.as_str(), None),
    };

    let value = line.strip_prefix(DEVICE_TYPE_PREFIX).ok_or_else(|| {
        Error::parse(format!("failed to parse device_type data '{line}'"))
    })?;

    // Only a single trailing newline may follow the device_type line.
    if let Some(rest) = rest {
        if !rest.is_empty() {
            return Err(Error::value("trailing device_type data"));
        }
    }

    Ok(value.to_string())
}
