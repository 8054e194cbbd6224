use serde_derive::{Deserialize, Serialize};

use crate::layout::Layout;
use crate::rank::Rank;

/// Requests an acceptor node understands.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub enum Request<L: Layout> {
    /// Install the first layout on an empty node
    Bootstrap { layout: L },

    /// Fetch the current layout and epoch
    GetLayout,

    /// Move the node to a newer epoch
    SetEpoch { epoch: u64 },

    /// Paxos phase 1
    Prepare { rank: Rank, epoch: u64 },

    /// Paxos phase 2
    Propose { rank: Rank, layout: L, epoch: u64 },

    /// Install a decided layout
    Committed { rank: Rank, layout: L, epoch: u64 },
}

impl<L: Layout> Request<L> {
    /// Epoch stamped by the caller, or `None` for requests exempt from fencing.
    pub fn epoch(&self) -> Option<u64> {
        match self {
        | Request::Bootstrap { .. }
        | Request::GetLayout
        | Request::SetEpoch { .. } => None,
        | Request::Prepare { epoch, .. }
        | Request::Propose { epoch, .. }
        | Request::Committed { epoch, .. } => Some(*epoch),
        }
    }

    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
        | Request::Bootstrap { .. } => "bootstrap",
        | Request::GetLayout => "get-layout",
        | Request::SetEpoch { .. } => "set-epoch",
        | Request::Prepare { .. } => "prepare",
        | Request::Propose { .. } => "propose",
        | Request::Committed { .. } => "committed",
        }
    }
}

/// Protocol outcomes. Rejections are ordinary responses, not errors.
#[derive(Serialize, Deserialize)]
#[serde(bound(serialize = "", deserialize = ""))]
#[derive(Derivative)]
#[derivative(Clone(bound = ""), Debug(bound = ""), PartialEq(bound = ""), Eq(bound = ""))]
pub enum Response<L: Layout> {
    Ack,

    AlreadyBootstrapped,

    NoBootstrap,

    /// Current layout together with the node's epoch
    Layout { layout: L, epoch: u64 },

    /// Request was stamped with a stale or future epoch
    WrongEpoch(u64),

    /// Promise granted; carries the value accepted earlier in this round
    PrepareAck { rank: Option<Rank>, layout: Option<L> },

    /// Promise refused; carries the rank already promised
    PrepareReject(Option<Rank>),

    /// Proposal refused; carries the promised and accepted ranks
    ProposeReject { phase1: Option<Rank>, phase2: Option<Rank> },
}

impl<L: Layout> Response<L> {
    /// Whether this response is a protocol rejection.
    pub fn is_reject(&self) -> bool {
        match self {
        | Response::Ack
        | Response::Layout { .. }
        | Response::PrepareAck { .. } => false,
        | Response::AlreadyBootstrapped
        | Response::NoBootstrap
        | Response::WrongEpoch(_)
        | Response::PrepareReject(_)
        | Response::ProposeReject { .. } => true,
        }
    }
}

/// Wire reply. `Err` carries a persistence or availability fault.
pub type Reply<L> = Result<Response<L>, String>;
