//! # Summary
//!
//! This module defines a connection from a caller (a proposer or a data-plane
//! client) to one acceptor node. Requests are answered in order, one at a time.
//! Quorum collection across nodes is left to the caller.

use std::net::SocketAddr;

use futures::StreamExt;
use tokio::net::TcpStream;

use crate::error::Error;
use crate::layout::Layout;
use crate::message::{Reply, Request, Response};
use crate::rank::Rank;
use crate::socket;

pub struct Client<L: Layout> {
    addr: SocketAddr,
    rx: socket::Rx<Reply<L>>,
    tx: socket::Tx<Request<L>>,
}

impl<L: Layout> Client<L> {
    pub async fn connect(addr: SocketAddr) -> Result<Self, Error> {
        let stream = TcpStream::connect(addr).await?;
        let (rx, tx) = socket::split(stream);
        debug!("connected to {}", addr);
        Ok(Client { addr, rx, tx })
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Sends `request` and waits for its response. Rejections are
    /// returned as `Ok`; a fault on the node comes back as `Error::Remote`.
    pub async fn send(&mut self, request: Request<L>) -> Result<Response<L>, Error> {
        trace!("sending {:?} to {}", request, self.addr);
        self.tx.send(&request).await?;
        match self.rx.next().await {
        | None => Err(Error::Closed),
        | Some(reply) => reply?.map_err(Error::Remote),
        }
    }

    pub async fn bootstrap(&mut self, layout: L) -> Result<Response<L>, Error> {
        self.send(Request::Bootstrap { layout }).await
    }

    pub async fn layout(&mut self) -> Result<Response<L>, Error> {
        self.send(Request::GetLayout).await
    }

    pub async fn set_epoch(&mut self, epoch: u64) -> Result<Response<L>, Error> {
        self.send(Request::SetEpoch { epoch }).await
    }

    pub async fn prepare(&mut self, rank: Rank, epoch: u64) -> Result<Response<L>, Error> {
        self.send(Request::Prepare { rank, epoch }).await
    }

    pub async fn propose(&mut self, rank: Rank, layout: L, epoch: u64) -> Result<Response<L>, Error> {
        self.send(Request::Propose { rank, layout, epoch }).await
    }

    pub async fn committed(&mut self, rank: Rank, layout: L, epoch: u64) -> Result<Response<L>, Error> {
        self.send(Request::Committed { rank, layout, epoch }).await
    }
}
