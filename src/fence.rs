//! # Summary
//!
//! Epoch fencing. Every request that carries an epoch must match the node's
//! current epoch exactly; anything else is answered with `WrongEpoch` before
//! the acceptor looks at it. `Bootstrap`, `GetLayout` and `SetEpoch` carry no
//! epoch and always pass.

use crate::layout::Layout;
use crate::message::{Request, Response};

/// Returns the rejection for `request` if it is fenced off at `current`.
pub fn check<L: Layout>(request: &Request<L>, current: u64) -> Option<Response<L>> {
    match request.epoch() {
    | Some(epoch) if epoch != current => {
        debug!("fenced {} stamped with epoch {} (current {})", request.kind(), epoch, current);
        Some(Response::WrongEpoch(current))
    }
    | _ => None,
    }
}
