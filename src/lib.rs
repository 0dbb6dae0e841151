// src/lib.rs

//! Fleetup update-agent state core
//!
//! The persisted-state and compatibility-matching heart of a device
//! software-update agent. It answers the two questions that gate every
//! update:
//!
//! - What is this device's current identity and installed-software manifest
//!   (its *provides*)?
//! - Is a candidate artifact allowed to install, given what the device
//!   provides and what the artifact declares it *depends* on?
//!
//! Both answers must survive power loss and partial writes: provides
//! metadata only ever changes inside a single store transaction, so an
//! interrupted update can never leave a mix of pre- and post-commit records
//! behind.
//!
//! # Architecture
//!
//! - Database-first: all state lives in a SQLite-backed key-value store
//! - Atomic commits: provides updates and caller-supplied update-flow state
//!   land in one transaction or not at all
//! - Pure core: merging and compatibility matching are side-effect-free
//!   functions over plain maps, exercised directly by tests

pub mod artifact;
pub mod config;
pub mod context;
pub mod device_type;
mod error;
pub mod matcher;
pub mod provides;
pub mod store;

pub use artifact::{HeaderDepends, HeaderInfo, HeaderView, TypeInfo, TypeInfoDepends};
pub use config::Config;
pub use context::DeviceContext;
pub use error::{Error, Result};
pub use matcher::artifact_matches_context;
pub use provides::{merge_provides, ClearsProvidesData, ProvidesData};
pub use store::{KeyValueStore, Transaction};
