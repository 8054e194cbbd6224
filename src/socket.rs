//! # Summary
//!
//! This module abstracts over external connections between clients and nodes.
//!
//! Wraps `tokio-util`'s length-delimited codec around each half of a TCP
//! stream and encodes every frame with `bincode`. This lets us send and
//! receive Rust structs over a connection with minimal boilerplate on either
//! end.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::{ready, SinkExt, Stream};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};

use crate::error::Error;

/// External receiving channel. Expects length-delimited, bincode-encoded
/// Rust data of type `T`.
pub struct Rx<T> {
    inner: FramedRead<OwnedReadHalf, LengthDelimitedCodec>,
    _marker: std::marker::PhantomData<fn() -> T>,
}

/// External transmission channel. Sends length-delimited, bincode-encoded
/// Rust data of type `T`.
pub struct Tx<T> {
    inner: FramedWrite<OwnedWriteHalf, LengthDelimitedCodec>,
    _marker: std::marker::PhantomData<fn(T)>,
}

/// Split a `TcpStream` into a pair of receiving and transmitting channels.
pub fn split<R, T>(stream: TcpStream) -> (Rx<R>, Tx<T>)
where R: serde::de::DeserializeOwned,
      T: serde::Serialize,
{
    let (rx, tx) = stream.into_split();
    let rx = Rx {
        inner: FramedRead::new(rx, LengthDelimitedCodec::new()),
        _marker: Default::default(),
    };
    let tx = Tx {
        inner: FramedWrite::new(tx, LengthDelimitedCodec::new()),
        _marker: Default::default(),
    };
    (rx, tx)
}

impl<T: serde::de::DeserializeOwned> Stream for Rx<T> {
    type Item = Result<T, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match ready!(Pin::new(&mut self.inner).poll_next(cx)) {
        | None => Poll::Ready(None),
        | Some(Err(error)) => Poll::Ready(Some(Err(error.into()))),
        | Some(Ok(frame)) => Poll::Ready(Some(bincode::deserialize(&frame).map_err(Error::from))),
        }
    }
}

impl<T: serde::Serialize> Tx<T> {
    /// Encodes `item` and flushes it to the peer.
    pub async fn send(&mut self, item: &T) -> Result<(), Error> {
        let frame = bincode::serialize(item)?;
        self.inner.send(Bytes::from(frame)).await?;
        Ok(())
    }
}
