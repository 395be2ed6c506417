//! Shared HTTP plumbing: agent construction and bounded retries.

use std::thread::sleep;
use std::time::Duration;

use locsync_core::RemoteError;

const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Agent whose every request is bounded by `timeout`.
pub(crate) fn agent(timeout: Duration) -> ureq::Agent {
    ureq::AgentBuilder::new().timeout(timeout).build()
}

/// Run `op`, retrying transport failures up to `retries` extra times.
///
/// Status errors are returned at once: the service answered, so repeating
/// the request would get the same answer. Only use for idempotent requests.
pub(crate) fn with_retries<T>(
    retries: u32,
    what: &str,
    mut op: impl FnMut() -> Result<T, ureq::Error>,
) -> Result<T, ureq::Error> {
    let mut attempt = 0;
    loop {
        match op() {
            Err(ureq::Error::Transport(t)) if attempt < retries => {
                attempt += 1;
                tracing::warn!("{what}: transport error ({t}), retry {attempt}/{retries}");
                sleep(RETRY_BACKOFF * attempt);
            }
            other => return other,
        }
    }
}

/// Map a ureq failure onto the remote error contract.
pub(crate) fn remote_error(view: &str, err: ureq::Error) -> RemoteError {
    match err {
        ureq::Error::Status(status, response) => RemoteError::Rejected {
            view: view.to_string(),
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(t) => RemoteError::Transport {
            view: view.to_string(),
            source: Box::new(t),
        },
    }
}
