//! Fan-out/join barrier for per-zone tasks
//!
//! Drain and undrain both spawn one task per zone and wait for all of them
//! behind a wall-clock deadline. On expiry the coordinator stops waiting and
//! reports a timeout; tasks still in flight are detached and keep running
//! unsupervised (there is no cooperative cancellation). Changes already
//! applied by completed zones are retained either way.

use std::time::Duration;
use tokio::task::JoinSet;
use tracing::error;

use crate::error::{Error, Result};

/// Wait for every task in `tasks` to finish, bounded by `window`
///
/// A panicked task is logged and counted as done (its zone contributes
/// whatever it managed before the panic). On deadline expiry the remaining
/// tasks are detached, not aborted, and a timeout error is returned.
pub(crate) async fn join_all_within(tasks: &mut JoinSet<()>, window: Duration) -> Result<()> {
    let deadline = tokio::time::Instant::now() + window;

    while !tasks.is_empty() {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(Some(Ok(()))) => {}
            Ok(Some(Err(e))) => {
                error!("zone task failed: {}", e);
            }
            Ok(None) => break,
            Err(_) => {
                let pending = tasks.len();
                tasks.detach_all();
                return Err(Error::Timeout {
                    pending,
                    window_secs: window.as_secs(),
                });
            }
        }
    }

    Ok(())
}
