//! # Summary
//!
//! This module defines the state each acceptor keeps in stable storage.
//! The whole struct is written as a single record on every mutation, so a
//! reloaded acceptor always observes a state some request left behind.

use serde_derive::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::rank::Rank;

/// A layout accepted in phase 2, together with the rank it was accepted at.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub struct Accepted<L: Layout> {
    pub rank: Rank,
    pub layout: L,
}

/// Durable acceptor state.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(
    Clone(bound = ""),
    Debug(bound = ""),
    Default(bound = ""),
    PartialEq(bound = ""),
    Eq(bound = "")
)]
pub struct AcceptorState<L: Layout> {
    /// Whether a layout has been installed on this node
    pub bootstrapped: bool,

    /// Current fencing epoch
    pub epoch: u64,

    /// Last bootstrapped or committed layout
    pub layout: Option<L>,

    /// Highest rank promised in this epoch's round
    pub phase1: Option<Rank>,

    /// Value accepted in this epoch's round
    pub accepted: Option<Accepted<L>>,
}

impl<L: Layout> AcceptorState<L> {
    /// Rank of the accepted proposal, if any.
    pub fn phase2(&self) -> Option<Rank> {
        self.accepted.as_ref().map(|accepted| accepted.rank)
    }

    /// Layout of the accepted proposal, if any.
    pub fn proposed(&self) -> Option<&L> {
        self.accepted.as_ref().map(|accepted| &accepted.layout)
    }

    /// Moves to `epoch` and starts a fresh round.
    pub(crate) fn advance(&mut self, epoch: u64) {
        self.epoch = std::cmp::max(self.epoch, epoch);
        self.phase1 = None;
        self.accepted = None;
    }
}
