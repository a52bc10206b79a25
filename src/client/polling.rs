use crate::error::Result;
use crate::ui;
use serde_json::Value;
use std::thread;
use std::time::{Duration, Instant};

/// Interval between status polls in wait-style actions
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Poll `fetch` until `is_done` accepts the state.
///
/// On timeout or Ctrl-C the last observed state is returned instead of an
/// error. Fetch errors propagate immediately.
pub fn wait_for<F, P>(
    mut fetch: F,
    is_done: P,
    timeout: Option<Duration>,
    interval: Duration,
) -> Result<Value>
where
    F: FnMut() -> Result<Value>,
    P: Fn(&Value) -> bool,
{
    let started = Instant::now();

    loop {
        let state = fetch()?;
        if is_done(&state) {
            return Ok(state);
        }
        if ui::is_interrupted() {
            tracing::debug!("wait interrupted; returning last state");
            return Ok(state);
        }
        if let Some(timeout) = timeout
            && started.elapsed() >= timeout
        {
            tracing::debug!(?timeout, "wait timed out; returning last state");
            return Ok(state);
        }
        thread::sleep(interval);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PlexusError;
    use serde_json::json;
    use std::cell::Cell;

    #[test]
    fn returns_once_done() {
        let polls = Cell::new(0);
        let state = wait_for(
            || {
                polls.set(polls.get() + 1);
                let status = if polls.get() < 3 { "running" } else { "completed" };
                Ok(json!({ "status": status }))
            },
            |s| s["status"] == "completed",
            None,
            Duration::ZERO,
        )
        .unwrap();

        assert_eq!(state["status"], "completed");
        assert_eq!(polls.get(), 3);
    }

    #[test]
    fn timeout_returns_last_state() {
        let polls = Cell::new(0);
        let state = wait_for(
            || {
                polls.set(polls.get() + 1);
                Ok(json!({ "status": "running", "poll": polls.get() }))
            },
            |_| false,
            Some(Duration::from_millis(30)),
            Duration::from_millis(5),
        )
        .unwrap();

        assert_eq!(state["status"], "running");
        assert_eq!(state["poll"], json!(polls.get()));
    }

    #[test]
    fn fetch_errors_propagate() {
        let result = wait_for(
            || Err(PlexusError::Transport("down".into())),
            |_| true,
            None,
            Duration::ZERO,
        );
        assert!(result.is_err());
    }
}
