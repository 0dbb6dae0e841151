// tests/commit_provides.rs

//! Integration tests for the update-agent state core
//!
//! These exercise the public API end to end against an on-disk store:
//! initialization cleanup, commit/load cycles, compatibility matching, and
//! transaction atomicity across a failing continuation.

use fleetup::context::{
    ARTIFACT_PROVIDES_KEY, AUTH_TOKEN_CACHE_INVALIDATOR_KEY, AUTH_TOKEN_KEY, STATE_DATA_KEY,
};
use fleetup::{
    Config, DeviceContext, Error, HeaderDepends, HeaderInfo, HeaderView, KeyValueStore,
    ProvidesData, TypeInfo,
};
use std::fs;
use tempfile::TempDir;

fn provides(pairs: &[(&str, &str)]) -> ProvidesData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn agent_dir(device_type: &str) -> (TempDir, Config) {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("device_type"),
        format!("device_type={device_type}\n"),
    )
    .unwrap();
    let config = Config::new(dir.path());
    (dir, config)
}

#[test]
fn test_initialize_drops_stale_auth_cache() {
    let (_dir, config) = agent_dir("qemu");

    // Seed leftover auth records from a previous run.
    let store = KeyValueStore::open(&config.store_path()).unwrap();
    store.write(AUTH_TOKEN_KEY, b"stale-token").unwrap();
    store.write(AUTH_TOKEN_CACHE_INVALIDATOR_KEY, b"x").unwrap();
    drop(store);

    let ctx = DeviceContext::initialize(config).unwrap();
    assert_eq!(ctx.store().read(AUTH_TOKEN_KEY).unwrap(), None);
    assert_eq!(
        ctx.store().read(AUTH_TOKEN_CACHE_INVALIDATOR_KEY).unwrap(),
        None
    );
}

#[test]
fn test_initialize_on_fresh_directory() {
    let (_dir, config) = agent_dir("qemu");
    let ctx = DeviceContext::initialize(config).unwrap();
    assert_eq!(ctx.load_provides().unwrap(), ProvidesData::new());
    assert_eq!(ctx.get_device_type().unwrap(), "qemu");
}

#[test]
fn test_provides_survive_reopen() {
    let (_dir, config) = agent_dir("qemu");
    {
        let ctx = DeviceContext::initialize(config.clone()).unwrap();
        let new = provides(&[("rootfs-image.version", "v3")]);
        ctx.commit_artifact_data("release-3", "stable", Some(&new), None, |_| Ok(()))
            .unwrap();
    }

    let ctx = DeviceContext::initialize(config).unwrap();
    assert_eq!(
        ctx.load_provides().unwrap(),
        provides(&[
            ("artifact_name", "release-3"),
            ("artifact_group", "stable"),
            ("rootfs-image.version", "v3"),
        ])
    );
}

#[test]
fn test_matches_artifact_depends_end_to_end() {
    let (_dir, config) = agent_dir("qemu");
    let ctx = DeviceContext::initialize(config).unwrap();

    let new = provides(&[("rootfs-image.checksum", "abc")]);
    ctx.commit_artifact_data("app", "g1", Some(&new), None, |_| Ok(()))
        .unwrap();

    let mut header = HeaderView {
        header_info: HeaderInfo {
            depends: HeaderDepends {
                device_type: vec!["qemu".to_string()],
                artifact_name: None,
                artifact_group: Some(vec!["g1".to_string(), "g2".to_string()]),
            },
        },
        type_info: TypeInfo {
            artifact_depends: Some(
                [("rootfs-image.checksum".to_string(), "abc".to_string())]
                    .into_iter()
                    .collect(),
            ),
        },
    };
    assert!(ctx.matches_artifact_depends(&header).unwrap());

    header.header_info.depends.device_type = vec!["beaglebone".to_string()];
    assert!(!ctx.matches_artifact_depends(&header).unwrap());
}

#[test]
fn test_matches_on_empty_device_state_is_value_error() {
    let (_dir, config) = agent_dir("qemu");
    let ctx = DeviceContext::initialize(config).unwrap();

    let header = HeaderView {
        header_info: HeaderInfo {
            depends: HeaderDepends {
                device_type: vec!["qemu".to_string()],
                ..Default::default()
            },
        },
        type_info: TypeInfo::default(),
    };
    // Nothing committed yet: provides carry no artifact_name, which is
    // corrupt-state territory, not an ordinary mismatch.
    assert!(matches!(
        ctx.matches_artifact_depends(&header),
        Err(Error::Value(_))
    ));
}

#[test]
fn test_failing_continuation_leaves_disk_state_untouched() {
    let (_dir, config) = agent_dir("qemu");
    let ctx = DeviceContext::initialize(config).unwrap();

    let first = provides(&[("data.version", "1")]);
    ctx.commit_artifact_data("a1", "g1", Some(&first), None, |_| Ok(()))
        .unwrap();
    let snapshot = ctx.load_provides().unwrap();
    let blob_before = ctx.store().read(ARTIFACT_PROVIDES_KEY).unwrap();

    let second = provides(&[("data.version", "2")]);
    let result = ctx.commit_artifact_data("a2", "g2", Some(&second), None, |txn| {
        txn.write(STATE_DATA_KEY, b"half-written")?;
        Err(Error::value("simulated update-flow failure"))
    });
    assert!(result.is_err());

    assert_eq!(ctx.load_provides().unwrap(), snapshot);
    assert_eq!(
        ctx.store().read(ARTIFACT_PROVIDES_KEY).unwrap(),
        blob_before
    );
    assert_eq!(ctx.store().read(STATE_DATA_KEY).unwrap(), None);
}

#[test]
fn test_commit_twice_equals_commit_once() {
    let (_dir, config) = agent_dir("qemu");
    let ctx = DeviceContext::initialize(config).unwrap();

    let new = provides(&[("app.version", "5"), ("app.build", "2024")]);
    let clears = vec!["app.*".to_string()];
    ctx.commit_artifact_data("app-5", "main", Some(&new), Some(&clears), |_| Ok(()))
        .unwrap();
    let once = ctx.load_provides().unwrap();

    ctx.commit_artifact_data("app-5", "main", Some(&new), Some(&clears), |_| Ok(()))
        .unwrap();
    assert_eq!(ctx.load_provides().unwrap(), once);
}
