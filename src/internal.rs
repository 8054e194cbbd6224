//! # Summary
//!
//! This module abstracts over internal connections to other tasks.
//!
//! Currently backed by `tokio::sync::mpsc` unbounded channels. Since the
//! channels are unbounded, the only way for a send to fail is if the receiving
//! end has been dropped, which happens when the acceptor worker has stopped.

use tokio::sync::mpsc;

use crate::error::Error;

/// Intra-server receiving channel.
#[derive(Debug)]
pub struct Rx<T>(mpsc::UnboundedReceiver<T>);

/// Intra-server transmission channel. All clones send to the same receiving end.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
#[derive(Debug)]
pub struct Tx<T>(mpsc::UnboundedSender<T>);

/// Create a new pair of linked receiving and transmitting channels.
pub fn new<T>() -> (Rx<T>, Tx<T>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Rx(rx), Tx(tx))
}

impl<T> Tx<T> {
    /// Send a message through the channel.
    /// Fails if the receiving end has been dropped.
    pub fn send(&self, message: T) -> Result<(), Error> {
        self.0.send(message).map_err(|_| Error::Unavailable)
    }
}

impl<T> Rx<T> {
    /// Blocks the current thread until a message arrives.
    /// Returns `None` once every transmitting end is gone.
    pub fn recv_blocking(&mut self) -> Option<T> {
        self.0.blocking_recv()
    }
}
