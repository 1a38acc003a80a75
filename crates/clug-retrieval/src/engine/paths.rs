//! Destination path planning for transfers.
//!
//! Every key is mirrored under the target directory segment by segment.
//! Keys that would escape the target or that cannot map to a unique local
//! file are rejected before anything is written.

use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use clug_core::{DownloadUnit, ObjectManifest, RetrievalError, TransferPlan};

/// Suffix of the sibling file an object is streamed into before the rename.
pub const PARTIAL_SUFFIX: &str = ".clug-part";

/// Map one key to its local destination.
///
/// Returns `Ok(None)` for directory markers (keys ending in the delimiter),
/// which have no content to transfer.
pub fn destination_for(
    target_dir: &Path,
    key: &str,
    delimiter: char,
) -> Result<Option<PathBuf>, RetrievalError> {
    if key.ends_with(delimiter) {
        return Ok(None);
    }
    let unsafe_key = || RetrievalError::UnsafeKey {
        key: key.to_string(),
    };
    if key.starts_with(delimiter) {
        return Err(unsafe_key());
    }

    let mut destination = target_dir.to_path_buf();
    // empty segments would make `a//b` and `a/b` share one file
    for segment in key.split(delimiter) {
        let mut components = Path::new(segment).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(part)), None) if part == segment => destination.push(part),
            _ => return Err(unsafe_key()),
        }
    }

    Ok(Some(destination))
}

/// Sibling path that receives the object while it is being written.
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination
        .file_name()
        .map_or_else(OsString::new, ToOwned::to_owned);
    name.push(PARTIAL_SUFFIX);
    destination.with_file_name(name)
}

/// Turn a manifest into download units under `target_dir`.
///
/// Order follows the manifest. Directory markers are dropped; a single unsafe
/// key fails the whole plan. So does a key whose destination (or its partial
/// file) is already claimed by an earlier unit.
pub fn plan_transfers(
    manifest: ObjectManifest,
    target_dir: &Path,
    delimiter: char,
) -> Result<TransferPlan, RetrievalError> {
    let mut plan = TransferPlan::default();
    let mut claimed: HashSet<PathBuf> = HashSet::new();

    for object in manifest.objects {
        let Some(destination) = destination_for(target_dir, &object.key, delimiter)? else {
            tracing::debug!(key = %object.key, "Skipping directory marker");
            continue;
        };
        let partial = partial_path(&destination);
        if claimed.contains(&destination) || claimed.contains(&partial) {
            return Err(RetrievalError::UnsafeKey { key: object.key });
        }
        claimed.insert(destination.clone());
        claimed.insert(partial);

        plan.total_bytes = plan.total_bytes.saturating_add(object.size);
        plan.units.push(DownloadUnit {
            key: object.key,
            destination,
            size: object.size,
        });
    }

    Ok(plan)
}
