//! The event sequence of a streaming turn.

use crate::session::AgentResult;
use crate::stream_event::AgentStreamEvent;
use futures::Stream;
use memoh_core::Error;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::{mpsc, oneshot};

/// Events of one streaming turn, followed by the turn's result.
///
/// The sequence is single-pass. Read it to exhaustion, then call
/// [`finish`](Self::finish) for the same [`AgentResult`] a buffered turn
/// returns. Dropping it early cancels the turn.
pub struct AgentStream {
    events: mpsc::Receiver<AgentStreamEvent>,
    result: oneshot::Receiver<Result<AgentResult, Error>>,
}

impl AgentStream {
    pub(crate) fn new(
        events: mpsc::Receiver<AgentStreamEvent>,
        result: oneshot::Receiver<Result<AgentResult, Error>>,
    ) -> Self {
        Self { events, result }
    }

    /// Skip any unread events and wait for the turn's result.
    pub async fn finish(mut self) -> Result<AgentResult, Error> {
        while self.events.recv().await.is_some() {}
        match self.result.await {
            Ok(result) => result,
            Err(_) => Err(Error::Internal("agent turn ended without a result".into())),
        }
    }
}

impl Stream for AgentStream {
    type Item = AgentStreamEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.events.poll_recv(cx)
    }
}
