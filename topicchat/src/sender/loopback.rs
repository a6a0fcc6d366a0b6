//! Loopback sender for offline use and testing.
//!
//! Accepts every request (unless told to fail), records it, and hands out
//! increasing message ids. The host drains the recorded requests to echo
//! sent messages back into the message list.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use topicchat_proto::request::{SendRequest, SendResponse};

use super::MessageSender;

/// In-process [`MessageSender`] that records accepted requests.
pub struct LoopbackSender {
    /// Requests accepted so far and not yet drained.
    sent: Mutex<Vec<SendRequest>>,
    /// When set, every request is rejected with this reason.
    failure: Mutex<Option<String>>,
    /// Id handed to the next accepted message.
    next_id: AtomicU64,
}

impl LoopbackSender {
    /// Create a sender whose first accepted message gets `first_id`.
    #[must_use]
    pub fn new(first_id: u64) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
            next_id: AtomicU64::new(first_id),
        }
    }

    /// Reject all following requests with `reason`.
    pub fn fail_with(&self, reason: impl Into<String>) {
        *self.failure.lock() = Some(reason.into());
    }

    /// Accept requests again after [`fail_with`](Self::fail_with).
    pub fn succeed(&self) {
        *self.failure.lock() = None;
    }

    /// Number of accepted requests not yet drained.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.sent.lock().len()
    }

    /// Drain the accepted requests, oldest first.
    pub fn take_sent(&self) -> Vec<SendRequest> {
        std::mem::take(&mut *self.sent.lock())
    }
}

impl Default for LoopbackSender {
    fn default() -> Self {
        Self::new(1)
    }
}

impl MessageSender for LoopbackSender {
    fn send(&self, request: &SendRequest) -> SendResponse {
        if let Some(reason) = self.failure.lock().clone() {
            tracing::debug!(to = request.to(), %reason, "loopback rejecting request");
            return SendResponse::error(reason);
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.sent.lock().push(request.clone());
        tracing::debug!(id, to = request.to(), "loopback accepted request");
        SendResponse::success(id)
    }
}
