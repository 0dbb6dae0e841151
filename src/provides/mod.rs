// src/provides/mod.rs

//! Provides metadata: types, glob filtering, and the merge engine
//!
//! *Provides* are key-value metadata describing what is currently installed
//! on the device. Two keys are reserved and mirrored into dedicated store
//! records: `artifact_name` and `artifact_group`. Everything else is
//! artifact-defined (component versions, image checksums, ...).
//!
//! An artifact carries an optional set of new provides and an optional list
//! of *clears-provides* glob patterns selecting which previously persisted
//! keys to discard before the new ones apply. [`merge_provides`] implements
//! the combination rules, [`filter_provides`] the glob removal.

pub mod codec;

use regex::Regex;
use std::collections::BTreeMap;

/// Installed-software metadata: provides key to value
///
/// Ordered map so that persisted output and log lines are deterministic.
pub type ProvidesData = BTreeMap<String, String>;

/// Glob patterns selecting provides keys to clear
///
/// `*` matches zero or more arbitrary characters; every other character is
/// literal. Absence of the whole list has different semantics from an empty
/// list, see [`merge_provides`].
pub type ClearsProvidesData = Vec<String>;

/// Reserved provides key mirrored into its own store record
pub const ARTIFACT_NAME_PROVIDE: &str = "artifact_name";
/// Reserved provides key mirrored into its own store record
pub const ARTIFACT_GROUP_PROVIDE: &str = "artifact_group";

/// Remove from `provides` every key fully matching the glob `pattern`
///
/// Matching is case-sensitive and anchored: the whole key must match, not a
/// substring. Keys that do not match are left untouched.
pub fn filter_provides(provides: &mut ProvidesData, pattern: &str) {
    let compiled = compile_glob(pattern);
    provides.retain(|key, _| !compiled.is_match(key));
}

/// Compile a clears-provides glob into an anchored regex
///
/// Every regex metacharacter in the pattern is escaped except `*`, which
/// becomes the `.*` wildcard. Since the result is fully escaped, compilation
/// cannot fail; if it does, that is a bug here, not a caller error.
fn compile_glob(pattern: &str) -> Regex {
    let mut escaped = String::with_capacity(pattern.len() * 2 + 2);
    escaped.push('^');
    for chr in pattern.chars() {
        if chr == '*' {
            escaped.push_str(".*");
        } else {
            escaped.push_str(&regex::escape(&chr.to_string()));
        }
    }
    escaped.push('$');

    Regex::new(&escaped).expect("escaped glob pattern must compile")
}

/// Combine persisted provides with an artifact's new provides and
/// clears-provides patterns
///
/// Four cases, in priority order:
///
/// 1. Neither `new_provides` nor `clears_provides` supplied: the result is
///    empty. The reserved `artifact_name`/`artifact_group` keys are still
///    restored afterwards by the caller's overwrite step.
/// 2. Only `clears_provides` supplied: each pattern is applied in the given
///    order against `existing`, cumulatively; nothing is added.
/// 3. Only `new_provides` supplied: the result is `new_provides` verbatim.
///    A missing clears list is treated as `["*"]` for compatibility with
///    artifacts written before clears-provides existed.
/// 4. Both supplied: patterns filter `existing` cumulatively, then every key
///    of `new_provides` is overlaid on top (new values win on collision).
///
/// Pure function: no I/O, deterministic, returns a fresh map.
pub fn merge_provides(
    existing: &ProvidesData,
    new_provides: Option<&ProvidesData>,
    clears_provides: Option<&ClearsProvidesData>,
) -> ProvidesData {
    match (new_provides, clears_provides) {
        (None, None) => ProvidesData::new(),
        (None, Some(clears)) => {
            let mut merged = existing.clone();
            for pattern in clears {
                filter_provides(&mut merged, pattern);
            }
            merged
        }
        (Some(new), None) => new.clone(),
        (Some(new), Some(clears)) => {
            let mut merged = existing.clone();
            for pattern in clears {
                filter_provides(&mut merged, pattern);
            }
            for (key, value) in new {
                merged.insert(key.clone(), value.clone());
            }
            merged
        }
    }
}
