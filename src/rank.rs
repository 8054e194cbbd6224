use serde_derive::{Deserialize, Serialize};
use uuid::Uuid;

/// Ballot used to order competing layout proposals.
///
/// Ranks compare by `sequence` first and fall back to the proposer ID,
/// so two proposers can never hold equal ranks. Field order matters:
/// the derived `Ord` is lexicographic over the declaration order.
#[derive(Serialize, Deserialize)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Rank {
    /// Proposer-chosen round number
    pub sequence: u64,

    /// Unique ID of the proposer that issued this rank
    pub proposer: Uuid,
}

impl Rank {
    pub fn new(sequence: u64, proposer: Uuid) -> Self {
        Rank { sequence, proposer }
    }

    /// Smallest rank owned by `proposer` that beats `other`, or `None`
    /// if the sequence space is exhausted.
    pub fn above(other: Option<Rank>, proposer: Uuid) -> Option<Self> {
        match other {
        | None => Some(Rank::new(1, proposer)),
        | Some(rank) if proposer > rank.proposer => Some(Rank::new(rank.sequence, proposer)),
        | Some(rank) => rank.sequence
            .checked_add(1)
            .map(|sequence| Rank::new(sequence, proposer)),
        }
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rank({}, {})", self.sequence, self.proposer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> Uuid {
        Uuid::from_bytes([byte; 16])
    }

    #[test]
    fn sequence_dominates_proposer() {
        assert!(Rank::new(2, id(0)) > Rank::new(1, id(9)));
        assert!(Rank::new(1, id(9)) < Rank::new(2, id(0)));
    }

    #[test]
    fn proposer_breaks_ties() {
        let a = Rank::new(100, id(5));
        let b = Rank::new(100, id(3));
        let c = Rank::new(100, id(7));
        assert!(b < a);
        assert!(c > a);
        assert_eq!(a, Rank::new(100, id(5)));
    }

    #[test]
    fn absent_rank_is_smallest() {
        let none: Option<Rank> = None;
        assert!(Some(Rank::new(0, Uuid::nil())) > none);
    }

    #[test]
    fn above_outranks_current() {
        let current = Rank::new(7, id(4));
        assert!(Rank::above(Some(current), id(9)) > Some(current));
        assert!(Rank::above(Some(current), id(1)) > Some(current));
        assert!(Rank::above(Some(current), id(4)) > Some(current));
        assert_eq!(Rank::above(Some(current), id(9)), Some(Rank::new(7, id(9))));
        assert_eq!(Rank::above(Some(current), id(1)), Some(Rank::new(8, id(1))));
        assert_eq!(Rank::above(None, id(1)), Some(Rank::new(1, id(1))));
    }

    #[test]
    fn above_exhausted_sequence() {
        let last = Rank::new(u64::MAX, id(9));
        assert_eq!(Rank::above(Some(last), id(1)), None);
        assert_eq!(Rank::above(Some(last), id(9)), None);
        // A larger proposer can still tie the sequence
        assert_eq!(Rank::above(Some(last), id(10)), Some(Rank::new(u64::MAX, id(10))));
    }
}
