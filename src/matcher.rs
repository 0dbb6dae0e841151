// src/matcher.rs

//! Artifact/device compatibility matching
//!
//! Pure predicate over the device's persisted provides, its device type, and
//! a candidate artifact's declared depends. Every rejection is logged with
//! the specific unmet condition so a refused deployment can be diagnosed
//! from the device log alone.

use crate::artifact::{HeaderDepends, TypeInfoDepends};
use crate::error::{Error, Result};
use crate::provides::{ProvidesData, ARTIFACT_GROUP_PROVIDE, ARTIFACT_NAME_PROVIDE};
use tracing::error;

/// Decide whether an artifact's depends are satisfied by this device
///
/// Conditions are checked in order and the first unmet one wins. An ordinary
/// mismatch yields `Ok(false)`; only structurally invalid persisted state (a
/// device with no `artifact_name` provide at all) is an error, since that
/// signals corruption rather than incompatibility.
pub fn artifact_matches_context(
    provides: &ProvidesData,
    device_type: &str,
    header_depends: &HeaderDepends,
    type_info_depends: Option<&TypeInfoDepends>,
) -> Result<bool> {
    let artifact_name = provides
        .get(ARTIFACT_NAME_PROVIDE)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| Error::value("missing artifact_name value in provides"))?;

    // Upstream parsing never produces an empty device_type depends list.
    assert!(
        !header_depends.device_type.is_empty(),
        "artifact header depends has no device_type entries"
    );
    if !header_depends
        .device_type
        .iter()
        .any(|dt| dt == device_type)
    {
        error!("Artifact device type doesn't match");
        return Ok(false);
    }

    if let Some(accepted_names) = &header_depends.artifact_name {
        assert!(
            !accepted_names.is_empty(),
            "artifact header depends has an empty artifact_name list"
        );
        if !accepted_names.iter().any(|name| name == artifact_name) {
            error!("Artifact name doesn't match");
            return Ok(false);
        }
    }

    if let Some(accepted_groups) = &header_depends.artifact_group {
        assert!(
            !accepted_groups.is_empty(),
            "artifact header depends has an empty artifact_group list"
        );
        let Some(group) = provides
            .get(ARTIFACT_GROUP_PROVIDE)
            .filter(|group| !group.is_empty())
        else {
            error!(
                "Missing artifact_group value in provides, \
                 required by artifact header info depends"
            );
            return Ok(false);
        };
        if !accepted_groups.iter().any(|g| g == group) {
            error!("Artifact group doesn't match");
            return Ok(false);
        }
    }

    let Some(depends) = type_info_depends else {
        return Ok(true);
    };
    for (key, required) in depends {
        match provides.get(key) {
            None => {
                error!("Missing '{key}' in provides, required by artifact type info depends");
                return Ok(false);
            }
            Some(value) if value != required => {
                error!(
                    "'{key}' artifact type info depends value '{required}' \
                     doesn't match provides value '{value}'"
                );
                return Ok(false);
            }
            Some(_) => {}
        }
    }

    Ok(true)
}
