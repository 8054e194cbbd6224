//! # Summary
//!
//! This module defines the acceptor worker, which owns the node's `Acceptor`
//! and processes requests one at a time. Stable storage writes block, so the
//! worker runs on its own blocking thread rather than on the async runtime.

use tokio::sync::oneshot;

use crate::acceptor;
use crate::error::Error;
use crate::internal;
use crate::layout::Layout;
use crate::message::{Request, Response};
use crate::shared;
use crate::storage::Store;

/// A request paired with the channel its outcome is sent back on.
#[derive(Debug)]
pub struct In<L: Layout> {
    pub request: Request<L>,
    pub reply: oneshot::Sender<Result<Response<L>, Error>>,
}

/// Single writer for the node's acceptor state.
pub struct Acceptor<L: Layout, S: Store<L>> {
    /// Intra-server receiving channel
    rx: internal::Rx<In<L>>,

    /// Snapshot published for layout queries
    shared: shared::Shared<L>,

    /// Durable state machine
    inner: acceptor::Acceptor<L, S>,
}

impl<L: Layout, S: Store<L> + 'static> Acceptor<L, S> {
    pub fn new(
        rx: internal::Rx<In<L>>,
        shared: shared::Shared<L>,
        inner: acceptor::Acceptor<L, S>,
    ) -> Self {
        Acceptor { rx, shared, inner }
    }

    /// Drains requests until every sender is dropped.
    pub fn run(mut self) {
        debug!("acceptor worker started at epoch {}", self.inner.epoch());
        while let Some(In { request, reply }) = self.rx.recv_blocking() {
            let kind = request.kind();
            let outcome = self.inner.handle(request).map_err(Error::from);
            // Readers must observe the new state before the caller does
            self.shared.publish(self.inner.state());
            if let Err(error) = &outcome {
                error!("{} failed: {}", kind, error);
            }
            // Caller may have hung up; the state is already durable
            reply.send(outcome).ok();
        }
        debug!("acceptor worker stopped");
    }

    /// Runs the worker on a dedicated blocking thread.
    pub fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::task::spawn_blocking(move || self.run())
    }
}
