//! # Summary
//!
//! This module contains the tasks that make up a running acceptor node.
//!
//! `acceptor` is the single writer: it owns the `Acceptor` and persists every
//! change before replying. `client` runs once per connection, decoding
//! requests off the wire and forwarding everything but layout queries to the
//! acceptor.

/// Durable single-writer state machine.
pub(crate) mod acceptor;

/// Client communication.
pub(crate) mod client;
