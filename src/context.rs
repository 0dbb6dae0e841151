// src/context.rs

//! Device context: persisted identity and provides orchestration
//!
//! [`DeviceContext`] owns the handle to the durable store and the agent
//! configuration. It loads the persisted provides records, commits merged
//! provides atomically together with caller-supplied update-flow state, and
//! exposes the device type to the update flow. It lives for the whole agent
//! process.

use crate::artifact::HeaderView;
use crate::config::Config;
use crate::device_type::read_device_type;
use crate::error::Result;
use crate::matcher::artifact_matches_context;
use crate::provides::codec::{decode_provides, encode_provides};
use crate::provides::{
    merge_provides, ClearsProvidesData, ProvidesData, ARTIFACT_GROUP_PROVIDE, ARTIFACT_NAME_PROVIDE,
};
use crate::store::{KeyValueStore, Transaction};
use tracing::debug;

/// Store record holding the installed artifact's name
pub const ARTIFACT_NAME_KEY: &str = "artifact-name";
/// Store record holding the installed artifact's group, absent if none
pub const ARTIFACT_GROUP_KEY: &str = "artifact-group";
/// Store record holding the non-reserved provides as a JSON blob
pub const ARTIFACT_PROVIDES_KEY: &str = "artifact-provides";

/// Store record for standalone-deployment state, owned by the update flow
pub const STANDALONE_STATE_KEY: &str = "standalone-state";
/// Store record for managed-deployment state data, owned by the update flow
pub const STATE_DATA_KEY: &str = "state";
/// Store record for not-yet-committed state data, owned by the update flow
pub const STATE_DATA_KEY_UNCOMMITTED: &str = "state-uncommitted";
/// Store record for update control maps, owned by the update flow
pub const UPDATE_CONTROL_MAPS_KEY: &str = "update-control-maps";

/// Cached authentication token, dropped at startup
pub const AUTH_TOKEN_KEY: &str = "authtoken";
/// Marker invalidating the cached token, dropped at startup
pub const AUTH_TOKEN_CACHE_INVALIDATOR_KEY: &str = "auth-token-cache-invalidator";

/// Suffix appended to the artifact name when an update left it inconsistent
pub const BROKEN_ARTIFACT_NAME_SUFFIX: &str = "_INCONSISTENT";

/// Version of the standalone-deployment state data format
pub const STANDALONE_DATA_VERSION: i32 = 1;

/// Persisted-state context of the update agent
pub struct DeviceContext {
    config: Config,
    store: KeyValueStore,
}

impl DeviceContext {
    /// Open the durable store and perform one-time startup normalization
    ///
    /// Stale cached-authentication records are removed so a fresh run never
    /// trusts leftover cache invalidation state. Their absence is not an
    /// error; any other store failure is.
    pub fn initialize(config: Config) -> Result<Self> {
        let store = KeyValueStore::open(&config.store_path())?;
        store.remove(AUTH_TOKEN_KEY)?;
        store.remove(AUTH_TOKEN_CACHE_INVALIDATOR_KEY)?;
        debug!("Device context initialized");
        Ok(Self { config, store })
    }

    /// Build a context over an already-open store, for tests and embedding
    pub fn with_store(config: Config, store: KeyValueStore) -> Self {
        Self { config, store }
    }

    /// Access the underlying store shared with other agent components
    pub fn store(&self) -> &KeyValueStore {
        &self.store
    }

    /// Load the persisted provides in a fresh read transaction
    pub fn load_provides(&self) -> Result<ProvidesData> {
        self.store
            .read_transaction(|txn| self.load_provides_in(txn))
    }

    /// Load the persisted provides inside an already-open transaction
    ///
    /// Absent records are treated as empty; an empty name or group simply
    /// leaves the reserved key out of the result. A malformed provides blob
    /// surfaces as an error with no partial result.
    ///
    /// The blob is applied after the dedicated records, so a reserved key
    /// inside the blob wins. This crate never writes such a blob (the
    /// encoder strips reserved keys), but the blob is a wire format foreign
    /// tooling may write directly.
    pub fn load_provides_in(&self, txn: &Transaction) -> Result<ProvidesData> {
        let artifact_name = txn.read_string(ARTIFACT_NAME_KEY)?;
        let artifact_group = txn.read_string(ARTIFACT_GROUP_KEY)?;
        let provides_blob = txn.read_string(ARTIFACT_PROVIDES_KEY)?;

        let mut provides = ProvidesData::new();
        if !artifact_name.is_empty() {
            provides.insert(ARTIFACT_NAME_PROVIDE.to_string(), artifact_name);
        }
        if !artifact_group.is_empty() {
            provides.insert(ARTIFACT_GROUP_PROVIDE.to_string(), artifact_group);
        }
        for (key, value) in decode_provides(&provides_blob)? {
            provides.insert(key, value);
        }
        Ok(provides)
    }

    /// Read the device type from the configured declaration file
    pub fn get_device_type(&self) -> Result<String> {
        read_device_type(&self.config.device_type_path())
    }

    /// Decide whether a parsed artifact is installable on this device
    pub fn matches_artifact_depends(&self, header: &HeaderView) -> Result<bool> {
        let device_type = self.get_device_type()?;
        let provides = self.load_provides()?;
        artifact_matches_context(
            &provides,
            &device_type,
            &header.header_info.depends,
            header.type_info.artifact_depends.as_ref(),
        )
    }

    /// Atomically commit a committed artifact's provides metadata
    ///
    /// Within one write transaction: the existing provides are loaded,
    /// merged with `new_provides`/`clears_provides` (see
    /// [`merge_provides`]), a non-empty `artifact_name`/`artifact_group`
    /// argument overwrites the corresponding reserved key, and the three
    /// records are rewritten. `txn_func` then runs with the same open
    /// transaction so additional update-flow state commits together with the
    /// provides change. Any failure rolls the whole transaction back.
    ///
    /// The merged result must carry a non-empty `artifact_name`; valid call
    /// sites guarantee this, so a violation is a bug and panics.
    pub fn commit_artifact_data(
        &self,
        artifact_name: &str,
        artifact_group: &str,
        new_provides: Option<&ProvidesData>,
        clears_provides: Option<&ClearsProvidesData>,
        txn_func: impl FnOnce(&Transaction) -> Result<()>,
    ) -> Result<()> {
        self.store.write_transaction(|txn| {
            let existing = self.load_provides_in(txn)?;
            let mut merged = merge_provides(&existing, new_provides, clears_provides);

            // Reserved keys from the arguments win over anything merged.
            if !artifact_name.is_empty() {
                merged.insert(ARTIFACT_NAME_PROVIDE.to_string(), artifact_name.to_string());
            }
            if !artifact_group.is_empty() {
                merged.insert(
                    ARTIFACT_GROUP_PROVIDE.to_string(),
                    artifact_group.to_string(),
                );
            }

            let name = merged
                .get(ARTIFACT_NAME_PROVIDE)
                .filter(|name| !name.is_empty());
            match name {
                Some(name) => txn.write(ARTIFACT_NAME_KEY, name.as_bytes())?,
                None => unreachable!("committing artifact data without an artifact name"),
            }

            match merged.get(ARTIFACT_GROUP_PROVIDE).filter(|g| !g.is_empty()) {
                Some(group) => txn.write(ARTIFACT_GROUP_KEY, group.as_bytes())?,
                None => txn.remove(ARTIFACT_GROUP_KEY)?,
            }

            let blob = encode_provides(&merged);
            if blob.is_empty() {
                txn.remove(ARTIFACT_PROVIDES_KEY)?;
            } else {
                txn.write(ARTIFACT_PROVIDES_KEY, blob.as_bytes())?;
            }

            txn_func(txn)
        })
    }
}
