//! Message submission service abstraction.
//!
//! Defines the [`MessageSender`] trait the composer hands finished drafts
//! to. Concrete implementations include:
//! - [`loopback::LoopbackSender`]: in-process sender that records requests,
//!   used by the demo host and tests

pub mod loopback;

use topicchat_proto::request::{SendRequest, SendResponse};

/// Synchronous message submission service.
///
/// `send` blocks until the server answers. Only the response's
/// success/error tag is meaningful to callers; failures are reported in
/// the response rather than as a Rust error so that "the server said no"
/// and "the request never arrived" look the same to the composer.
pub trait MessageSender {
    /// Submit a request and wait for the server's response.
    fn send(&self, request: &SendRequest) -> SendResponse;
}

impl<S: MessageSender + ?Sized> MessageSender for &S {
    fn send(&self, request: &SendRequest) -> SendResponse {
        (**self).send(request)
    }
}
