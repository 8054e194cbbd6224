//! # Summary
//!
//! This module implements the read side of the acceptor. The worker that owns
//! the `Acceptor` publishes a `Snapshot` after every request it handles, and
//! connection tasks answer layout queries from it without queueing behind
//! writes. The snapshot is wrapped in `Arc<RwLock<T>>` so any number of
//! readers can look at it at once.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::layout::Layout;
use crate::message::Response;
use crate::state::AcceptorState;

/// Read-only view of the parts of `AcceptorState` clients may query.
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), Default(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub struct Snapshot<L: Layout> {
    pub bootstrapped: bool,
    pub epoch: u64,
    pub layout: Option<L>,
}

impl<L: Layout> Snapshot<L> {
    pub fn of(state: &AcceptorState<L>) -> Self {
        Snapshot {
            bootstrapped: state.bootstrapped,
            epoch: state.epoch,
            layout: state.layout.clone(),
        }
    }

    /// Answer to a layout query at this snapshot.
    pub fn respond(&self) -> Response<L> {
        match &self.layout {
        | Some(layout) if self.bootstrapped => Response::Layout {
            layout: layout.clone(),
            epoch: self.epoch,
        },
        | _ => Response::NoBootstrap,
        }
    }
}

/// Thread-safe wrapper around the latest `Snapshot`.
#[derive(Derivative)]
#[derivative(Clone(bound = ""))]
pub struct Shared<L: Layout>(Arc<RwLock<Snapshot<L>>>);

impl<L: Layout> Shared<L> {
    pub fn new(state: &AcceptorState<L>) -> Self {
        Shared(Arc::new(RwLock::new(Snapshot::of(state))))
    }

    /// Copies out the current snapshot.
    pub fn read(&self) -> Snapshot<L> {
        self.0.read().clone()
    }

    /// Replaces the snapshot with a view of `state`.
    pub fn publish(&self, state: &AcceptorState<L>) {
        *self.0.write() = Snapshot::of(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::testing::TestLayout;

    #[test]
    fn empty_snapshot_has_no_layout() {
        let shared = Shared::<TestLayout>::new(&AcceptorState::default());
        assert_eq!(shared.read().respond(), Response::NoBootstrap);
    }

    #[test]
    fn readers_see_published_state() {
        let shared = Shared::<TestLayout>::new(&AcceptorState::default());
        let reader = shared.clone();
        let mut state = AcceptorState::default();
        state.bootstrapped = true;
        state.epoch = 2;
        state.layout = Some(TestLayout::single(9000));
        shared.publish(&state);
        assert_eq!(
            reader.read().respond(),
            Response::Layout { layout: TestLayout::single(9000), epoch: 2 },
        );
    }
}
