//! # Summary
//!
//! This module defines external connections to clients.
//! Responsible for forwarding requests to the acceptor worker and writing
//! replies back in the order the requests arrived.

use futures::StreamExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;

use crate::error::Error;
use crate::internal::Tx;
use crate::layout::Layout;
use crate::message::{Reply, Request, Response};
use crate::shared;
use crate::socket;
use crate::thread::acceptor;

/// A connected client.
pub struct Client<L: Layout> {
    /// Remote address, for logging
    peer: std::net::SocketAddr,

    /// External client receiving channel
    client_rx: socket::Rx<Request<L>>,

    /// External client transmitting channel
    client_tx: socket::Tx<Reply<L>>,

    /// Intra-server acceptor transmitting channel
    acceptor_tx: Tx<acceptor::In<L>>,

    /// Latest published acceptor snapshot
    shared: shared::Shared<L>,
}

impl<L: Layout> Client<L> {
    pub fn new(
        stream: TcpStream,
        acceptor_tx: Tx<acceptor::In<L>>,
        shared: shared::Shared<L>,
    ) -> Result<Self, Error> {
        let peer = stream.peer_addr()?;
        let (client_rx, client_tx) = socket::split(stream);
        info!("connected to {}", peer);
        Ok(Client {
            peer,
            client_rx,
            client_tx,
            acceptor_tx,
            shared,
        })
    }

    /// Serves requests until the client disconnects or the wire breaks.
    pub async fn run(mut self) {
        while let Some(message) = self.client_rx.next().await {
            let request = match message {
            | Ok(request) => request,
            | Err(error) => {
                warn!("dropping {}: {}", self.peer, error);
                break
            }
            };
            trace!("received {:?} from {}", request, self.peer);
            let reply = self.respond(request).await.map_err(|error| error.to_string());
            trace!("sending {:?} to {}", reply, self.peer);
            if let Err(error) = self.client_tx.send(&reply).await {
                warn!("failed to reply to {}: {}", self.peer, error);
                break
            }
        }
        info!("disconnected from {}", self.peer);
    }

    async fn respond(&self, request: Request<L>) -> Result<Response<L>, Error> {
        if let Request::GetLayout = request {
            return Ok(self.shared.read().respond())
        }
        let (reply, outcome) = oneshot::channel();
        self.acceptor_tx.send(acceptor::In { request, reply })?;
        outcome.await.map_err(|_| Error::Unavailable)?
    }
}
