//! Inbound half of the duplex subscription.
//!
//! [`SubscriptionStream`] classifies each transport message: sync markers
//! are discarded, update notifications are yielded, anything else fails
//! the stream. [`PathValues`] layers the convenience view on top,
//! flattening notifications to `(path, value)` pairs and treating an
//! expired deadline as a normal end of stream.
//!
//! Both are pull-based. Nothing advances unless the consumer polls, and
//! dropping either handle tears down the transport subscription.

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio_stream::Stream;
use tonic::Status;
use tracing::debug;

use gnmi_proto as pb;

use crate::error::Error;
use crate::response::{SubscribeResponse, Value};
use crate::session::Session;

/// Stream of update notifications from one subscribe call.
///
/// The stream is fused: after a protocol violation or transport failure
/// it yields that one error and then ends, even if the transport has more
/// messages queued.
#[derive(Debug)]
pub struct SubscriptionStream<S> {
    inner: S,
    done: bool,
}

impl<S> SubscriptionStream<S> {
    pub fn new(inner: S) -> Self {
        Self { inner, done: false }
    }
}

impl<S> Stream for SubscriptionStream<S>
where
    S: Stream<Item = Result<pb::SubscribeResponse, Status>> + Unpin,
{
    type Item = Result<SubscribeResponse, Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.done {
            return Poll::Ready(None);
        }
        loop {
            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(message))) => match message.response {
                    Some(pb::subscribe_response::Response::Update(notification)) => {
                        return Poll::Ready(Some(Ok(SubscribeResponse::from(notification))));
                    }
                    Some(pb::subscribe_response::Response::SyncResponse(marker)) => {
                        // snapshot boundary, not exposed to the consumer
                        debug!(marker, "discarding sync response");
                    }
                    Some(pb::subscribe_response::Response::Error(error)) => {
                        this.done = true;
                        return Poll::Ready(Some(Err(Error::ProtocolViolation(format!(
                            "in-band error on subscribe stream: code {} ({})",
                            error.code, error.message
                        )))));
                    }
                    None => {
                        this.done = true;
                        return Poll::Ready(Some(Err(Error::ProtocolViolation(
                            "subscribe response without any variant".to_string(),
                        ))));
                    }
                },
                Poll::Ready(Some(Err(status))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(Error::from(status))));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

/// Flattened subscription stream yielding `(fully-qualified path, value)`
/// pairs, one per update.
///
/// A deadline-exceeded failure ends the stream silently; every other
/// failure is yielded before the stream ends. Optionally keeps the owning
/// [`Session`] alive for consumers that dropped theirs.
#[derive(Debug)]
pub struct PathValues<S> {
    stream: SubscriptionStream<S>,
    pending: VecDeque<(String, Option<Value>)>,
    done: bool,
    session: Option<Session>,
}

impl<S> PathValues<S> {
    pub fn new(stream: SubscriptionStream<S>) -> Self {
        Self {
            stream,
            pending: VecDeque::new(),
            done: false,
            session: None,
        }
    }

    /// Keeps `session` alive for as long as the stream is consumed.
    pub fn with_session(mut self, session: Session) -> Self {
        self.session = Some(session);
        self
    }

    /// Releases the stream and hands back the session, if one was
    /// attached.
    pub fn into_session(self) -> Option<Session> {
        self.session
    }
}

impl<S> Stream for PathValues<S>
where
    S: Stream<Item = Result<pb::SubscribeResponse, Status>> + Unpin,
{
    type Item = Result<(String, Option<Value>), Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            if let Some(pair) = this.pending.pop_front() {
                return Poll::Ready(Some(Ok(pair)));
            }
            if this.done {
                return Poll::Ready(None);
            }
            match Pin::new(&mut this.stream).poll_next(cx) {
                Poll::Ready(Some(Ok(response))) => {
                    let notification = response.update();
                    let prefix = notification.prefix();
                    for update in notification.updates() {
                        let path = prefix.concat(&update.path());
                        this.pending.push_back((path.to_string(), update.value()));
                    }
                    // empty notifications produce nothing; poll again
                }
                Poll::Ready(Some(Err(Error::DeadlineExceeded(status)))) => {
                    debug!(code = ?status.code, "subscription deadline reached");
                    this.done = true;
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Err(error))) => {
                    this.done = true;
                    return Poll::Ready(Some(Err(error)));
                }
                Poll::Ready(None) => {
                    this.done = true;
                    return Poll::Ready(None);
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
