//! Per-request cancellation.
//!
//! A loader creates one `CancelToken` per fetch cycle and hands it to every
//! request of that cycle. Cancelling the token aborts all futures started
//! through [`CancelToken::run`]; dropping an aborted reqwest future closes
//! the underlying connection.

use futures::future::{AbortHandle, Abortable, Aborted};
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Mutex<TokenState>>,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: bool,
    handles: Vec<AbortHandle>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort every future run through this token, now and in the future
    pub fn cancel(&self) {
        let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        state.cancelled = true;
        for handle in state.handles.drain(..) {
            handle.abort();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancelled
    }

    /// Drive `fut` until it completes or the token is cancelled
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, Aborted> {
        let (handle, registration) = AbortHandle::new_pair();
        {
            let mut state = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            if state.cancelled {
                handle.abort();
            } else {
                state.handles.retain(|h| !h.is_aborted());
                state.handles.push(handle);
            }
        }
        Abortable::new(fut, registration).await
    }
}
