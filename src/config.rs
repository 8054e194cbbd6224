use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;

use crate::acceptor;
use crate::error::Error;
use crate::internal;
use crate::layout::Layout;
use crate::message::{Request, Response};
use crate::shared;
use crate::storage::{FileStore, MemoryStore, Store};
use crate::thread;

/// Settings for a single acceptor node.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""))]
pub struct Config<L: Layout> {
    /// Address to listen on for requests
    addr: SocketAddr,

    /// Directory holding stable storage; `None` keeps state in memory
    dir: Option<PathBuf>,

    /// Layout to bootstrap with if the node has never been bootstrapped
    seed: Option<L>,
}

impl<L: Layout> Config<L> {
    pub fn new(addr: SocketAddr) -> Self {
        Config {
            addr,
            dir: None,
            seed: None,
        }
    }

    pub fn with_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.dir = Some(dir.into());
        self
    }

    pub fn with_seed(mut self, layout: L) -> Self {
        self.seed = Some(layout);
        self
    }

    /// Recovers the acceptor, starts its worker, and binds the listener.
    /// Fails without serving anything if stable storage cannot be read.
    pub async fn bind(self) -> Result<Server<L>, Error> {
        let store: Box<dyn Store<L>> = match &self.dir {
        | Some(dir) => {
            info!("using stable storage in {}", dir.display());
            Box::new(FileStore::<L>::open(dir)?)
        }
        | None => {
            warn!("no storage directory configured; state will not survive restarts");
            Box::new(MemoryStore::<L>::new())
        }
        };

        let mut acceptor = acceptor::Acceptor::open(store)?;
        if let Some(layout) = self.seed {
            match acceptor.handle(Request::Bootstrap { layout })? {
            | Response::Ack => info!("bootstrapped from seed layout"),
            | _ => debug!("ignoring seed layout: already bootstrapped"),
            }
        }

        let (acceptor_rx, acceptor_tx) = internal::new();
        let shared = shared::Shared::new(acceptor.state());
        thread::acceptor::Acceptor::new(acceptor_rx, shared.clone(), acceptor).spawn();

        let listener = TcpListener::bind(self.addr).await?;
        info!("listening on {}", listener.local_addr()?);
        Ok(Server {
            listener,
            acceptor_tx,
            shared,
        })
    }

    /// Binds and serves until the listener fails.
    pub async fn run(self) -> Result<(), Error> {
        self.bind().await?.run().await
    }
}

/// A bound acceptor node.
pub struct Server<L: Layout> {
    listener: TcpListener,
    acceptor_tx: internal::Tx<thread::acceptor::In<L>>,
    shared: shared::Shared<L>,
}

impl<L: Layout> Server<L> {
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// Current bootstrap flag, epoch and layout.
    pub fn snapshot(&self) -> shared::Snapshot<L> {
        self.shared.read()
    }

    /// Accepts connections forever, serving each on its own task.
    pub async fn run(self) -> Result<(), Error> {
        loop {
            let (stream, _) = self.listener.accept().await?;
            let client = match thread::client::Client::new(
                stream,
                self.acceptor_tx.clone(),
                self.shared.clone(),
            ) {
            | Ok(client) => client,
            | Err(error) => {
                warn!("failed to set up connection: {}", error);
                continue
            }
            };
            tokio::spawn(client.run());
        }
    }
}
