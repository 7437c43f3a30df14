//! Batch Loader
//!
//! Stages a load request in a pool, commits it and rolls back the written
//! part if the commit only partially succeeds.

use serde_json::Value;
use tracing::{info, warn};

use crate::cache::CachePool;
use crate::engine::StorageEngine;
use crate::error::Result;
use crate::models::{CommitReport, LoadRequest};

/// Loads every entry of `request` into `pool` as one deferred batch.
///
/// Entries with illegal keys or miss values are listed as rejected and do
/// not stop the load.
pub fn load<E>(pool: &mut CachePool<E>, namespace: &str, request: LoadRequest) -> Result<CommitReport>
where
    E: StorageEngine<Value = Value>,
{
    let mut report = CommitReport::new(namespace);

    for entry in request.items {
        let key = entry.key.clone();
        match pool.save_deferred(&entry.into_item()) {
            Ok(true) => report.staged.push(key),
            Ok(false) => report.rejected.push(key),
            Err(err) => {
                warn!(key = %key, error = %err, "entry rejected");
                report.rejected.push(key);
            }
        }
    }

    report.committed = pool.commit();
    if report.committed {
        info!(namespace, written = report.staged.len(), "load committed");
        return Ok(report);
    }

    report.failed = pool.deferred_keys().iter().map(|key| key.to_string()).collect();
    let written = pool.passed_keys().to_vec();
    if pool.rollback()? {
        report.rolled_back = written;
    }
    warn!(
        namespace,
        failed = report.failed.len(),
        rolled_back = report.rolled_back.len(),
        "load failed"
    );

    Ok(report)
}
