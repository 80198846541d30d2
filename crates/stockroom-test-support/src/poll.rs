//! Helpers for observing work that runs on detached background tasks.

use std::time::Duration;

use tokio::time::{Instant, sleep};

/// Polls `condition` until it holds or `timeout` elapses. Returns whether it
/// held.
pub async fn eventually(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        sleep(Duration::from_millis(5)).await;
    }
}

/// Gives already-spawned background tasks time to run, for assertions that
/// something did *not* happen.
pub async fn settle() {
    sleep(Duration::from_millis(50)).await;
}
