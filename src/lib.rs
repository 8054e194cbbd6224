#[macro_use] extern crate derivative;
#[macro_use] extern crate log;

mod acceptor;
mod client;
mod config;
mod error;
mod fence;
mod internal;
mod layout;
mod message;
mod rank;
mod shared;
mod socket;
mod state;
mod storage;
mod thread;

pub use crate::acceptor::Acceptor;
pub use crate::client::Client;
pub use crate::config::{Config, Server};
pub use crate::error::{Error, StorageError};
pub use crate::layout::Layout;
pub use crate::message::{Reply, Request, Response};
pub use crate::rank::Rank;
pub use crate::shared::Snapshot;
pub use crate::state::{Accepted, AcceptorState};
pub use crate::storage::{FileStore, MemoryStore, Store};
