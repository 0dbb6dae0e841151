// src/artifact.rs

//! Artifact header structures consumed by the compatibility matcher
//!
//! These are produced by the artifact-format parser elsewhere in the agent;
//! this crate only reads them. The parser guarantees that `device_type` is
//! never empty and that the optional lists, when present, are non-empty.

use std::collections::BTreeMap;

/// Per-payload exact-value compatibility constraints
pub type TypeInfoDepends = BTreeMap<String, String>;

/// Global depends declared in an artifact's header info
#[derive(Debug, Clone, Default)]
pub struct HeaderDepends {
    /// Device types the artifact can install on; always populated upstream
    pub device_type: Vec<String>,
    /// Accepted currently-installed artifact names, if constrained
    pub artifact_name: Option<Vec<String>>,
    /// Accepted artifact groups, if constrained
    pub artifact_group: Option<Vec<String>>,
}

/// Header info section of a parsed artifact
#[derive(Debug, Clone, Default)]
pub struct HeaderInfo {
    pub depends: HeaderDepends,
}

/// Type info section of a parsed artifact payload
#[derive(Debug, Clone, Default)]
pub struct TypeInfo {
    /// Keys that must exist in the device's provides with exact values
    pub artifact_depends: Option<TypeInfoDepends>,
}

/// The parsed-header view the update flow hands to the matcher
#[derive(Debug, Clone, Default)]
pub struct HeaderView {
    pub header_info: HeaderInfo,
    pub type_info: TypeInfo,
}
