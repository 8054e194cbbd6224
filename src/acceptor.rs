//! # Summary
//!
//! This module defines the `Acceptor`, the per-node half of the single-decree
//! Paxos round that agrees on the next layout. Each request is checked against
//! the epoch fence, validated against the durable state, and any change is
//! written to stable storage before a response is produced.
//!
//! Mutations are staged on a copy of the state. The copy only replaces the
//! in-memory state once the store has accepted it, so a failed write leaves
//! the acceptor exactly as it was before the request arrived.

use crate::error::StorageError;
use crate::fence;
use crate::layout::Layout;
use crate::message::{Request, Response};
use crate::rank::Rank;
use crate::shared::Snapshot;
use crate::state::{Accepted, AcceptorState};
use crate::storage::Store;

pub struct Acceptor<L: Layout, S: Store<L>> {
    /// Last durably written state
    state: AcceptorState<L>,

    /// Backing store for stable storage
    storage: S,
}

impl<L: Layout, S: Store<L>> Acceptor<L, S> {
    /// Recovers an acceptor from `storage`. Fails if the saved record
    /// cannot be read, in which case the node must not serve requests.
    pub fn open(storage: S) -> Result<Self, StorageError> {
        let state = storage.load()?;
        info!(
            "recovered acceptor state: bootstrapped = {}, epoch = {}, phase1 = {:?}, phase2 = {:?}",
            state.bootstrapped,
            state.epoch,
            state.phase1,
            state.phase2(),
        );
        Ok(Acceptor { state, storage })
    }

    pub fn state(&self) -> &AcceptorState<L> {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.state.epoch
    }

    /// Handles a single request. Protocol rejections come back as `Ok`;
    /// `Err` means the change could not be persisted and nothing was applied.
    pub fn handle(&mut self, request: Request<L>) -> Result<Response<L>, StorageError> {
        trace!("received {:?}", request);
        if let Some(rejection) = fence::check(&request, self.state.epoch) {
            return Ok(rejection)
        }
        match request {
        | Request::Bootstrap { layout } => self.respond_bootstrap(layout),
        | Request::GetLayout => Ok(Snapshot::of(&self.state).respond()),
        | Request::SetEpoch { epoch } => self.respond_set_epoch(epoch),
        | Request::Prepare { rank, .. } => self.respond_prepare(rank),
        | Request::Propose { rank, layout, .. } => self.respond_propose(rank, layout),
        | Request::Committed { rank, layout, .. } => self.respond_committed(rank, layout),
        }
    }

    /// Persists `next` and installs it as the current state.
    fn persist(&mut self, next: AcceptorState<L>) -> Result<(), StorageError> {
        if let Err(error) = self.storage.save(&next) {
            error!("failed to persist acceptor state: {}", error);
            return Err(error)
        }
        self.state = next;
        Ok(())
    }

    fn respond_bootstrap(&mut self, layout: L) -> Result<Response<L>, StorageError> {
        if self.state.bootstrapped {
            debug!("rejecting bootstrap: already bootstrapped");
            return Ok(Response::AlreadyBootstrapped)
        }
        let mut next = self.state.clone();
        next.bootstrapped = true;
        next.epoch = 0;
        next.layout = Some(layout);
        self.persist(next)?;
        info!("bootstrapped with {:?}", self.state.layout);
        Ok(Response::Ack)
    }

    fn respond_set_epoch(&mut self, epoch: u64) -> Result<Response<L>, StorageError> {
        if !self.state.bootstrapped {
            return Ok(Response::NoBootstrap)
        }
        if epoch <= self.state.epoch {
            debug!("rejecting epoch {}: already at {}", epoch, self.state.epoch);
            return Ok(Response::WrongEpoch(self.state.epoch))
        }
        let mut next = self.state.clone();
        next.advance(epoch);
        self.persist(next)?;
        info!("moved to epoch {}", epoch);
        Ok(Response::Ack)
    }

    /// Promises not to accept anything ranked at or below `rank`.
    fn respond_prepare(&mut self, rank: Rank) -> Result<Response<L>, StorageError> {
        if !self.state.bootstrapped {
            return Ok(Response::NoBootstrap)
        }
        if Some(rank) <= self.state.phase1 {
            debug!("rejecting prepare at {}: promised {:?}", rank, self.state.phase1);
            return Ok(Response::PrepareReject(self.state.phase1))
        }
        let mut next = self.state.clone();
        next.phase1 = Some(rank);
        self.persist(next)?;
        debug!("promised {}", rank);
        Ok(Response::PrepareAck {
            rank: self.state.phase2(),
            layout: self.state.proposed().cloned(),
        })
    }

    /// Accepts `layout` only at the exact rank promised in phase 1,
    /// and only once per rank.
    fn respond_propose(&mut self, rank: Rank, layout: L) -> Result<Response<L>, StorageError> {
        if !self.state.bootstrapped {
            return Ok(Response::NoBootstrap)
        }
        if self.state.phase1 != Some(rank) || self.state.phase2() == Some(rank) {
            debug!(
                "rejecting proposal at {}: phase1 = {:?}, phase2 = {:?}",
                rank,
                self.state.phase1,
                self.state.phase2(),
            );
            return Ok(Response::ProposeReject {
                phase1: self.state.phase1,
                phase2: self.state.phase2(),
            })
        }
        let mut next = self.state.clone();
        next.accepted = Some(Accepted { rank, layout });
        self.persist(next)?;
        debug!("accepted {:?} at {}", self.state.proposed(), rank);
        Ok(Response::Ack)
    }

    /// Installs a layout the proposer has already seen chosen.
    fn respond_committed(&mut self, rank: Rank, layout: L) -> Result<Response<L>, StorageError> {
        if !self.state.bootstrapped {
            return Ok(Response::NoBootstrap)
        }
        let mut next = self.state.clone();
        next.advance(layout.epoch());
        next.layout = Some(layout);
        self.persist(next)?;
        info!("committed layout from {} at epoch {}", rank, self.state.epoch);
        Ok(Response::Ack)
    }
}
