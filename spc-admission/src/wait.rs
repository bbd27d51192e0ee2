// Copyright 2024 The Kubernetes Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Bounded waiting on a polled readiness predicate.
//!
//! Informer caches only expose a synchronous "has synced" query, so callers
//! sample it on a fixed interval until it turns true, the deadline passes, or
//! the caller's request is canceled. Only the calling task sleeps; no lock is
//! held while waiting.

use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How often the synced predicate is sampled.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// How long a request may wait for caches before it is denied.
pub const DEFAULT_SYNC_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitError {
    #[error("caches not synchronized after {0:?}")]
    Timeout(Duration),

    #[error("canceled while waiting for caches to synchronize")]
    Canceled,
}

/// Wait until `is_synced` returns true.
///
/// The predicate is checked before the first sleep and again after every
/// `poll_interval`. When `timeout` elapses the predicate gets one final check,
/// so a cache that syncs exactly at the deadline still counts. Cancellation
/// wins over both the deadline and the next poll.
pub async fn wait_for_synced<F>(
    is_synced: F,
    poll_interval: Duration,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Result<(), WaitError>
where
    F: Fn() -> bool,
{
    if is_synced() {
        return Ok(());
    }

    let deadline = tokio::time::sleep(timeout);
    tokio::pin!(deadline);
    let mut polls: u32 = 0;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                warn!(polls, "Canceled while waiting for caches to synchronize");
                return Err(WaitError::Canceled);
            }
            _ = &mut deadline => {
                if is_synced() {
                    return Ok(());
                }
                warn!(polls, timeout = ?timeout, "Timed out waiting for caches to synchronize");
                return Err(WaitError::Timeout(timeout));
            }
            _ = tokio::time::sleep(poll_interval) => {}
        }

        polls += 1;
        if is_synced() {
            debug!(polls, "Caches synchronized");
            return Ok(());
        }
        debug!(polls, "Caches not yet synchronized");
    }
}
