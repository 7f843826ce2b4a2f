//! Majority vote gate for starting a game.

use std::collections::BTreeSet;

use nightwatch_core::error::DomainError;
use nightwatch_core::player::PlayerId;

/// Collects start votes for the currently open proposal.
#[derive(Debug, Clone, Default)]
pub struct VoteGate {
    open: bool,
    votes: BTreeSet<PlayerId>,
}

impl VoteGate {
    /// Creates a closed gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a proposal is currently open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Players who have voted for the open proposal.
    #[must_use]
    pub fn votes(&self) -> &BTreeSet<PlayerId> {
        &self.votes
    }

    /// Opens a new proposal, discarding any previous votes.
    pub fn open_proposal(&mut self) {
        self.open = true;
        self.votes.clear();
    }

    /// Checks that `player` may vote right now.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProposalNotOpen` when the gate is closed and
    /// `DomainError::NotEligible` when `player` is not on the roster.
    pub fn ensure_can_vote(
        &self,
        player: &PlayerId,
        roster: &BTreeSet<PlayerId>,
    ) -> Result<(), DomainError> {
        if !self.open {
            return Err(DomainError::ProposalNotOpen);
        }
        if !roster.contains(player) {
            return Err(DomainError::NotEligible(player.clone()));
        }
        Ok(())
    }

    /// Records an affirmative vote. Voting twice has no further effect.
    ///
    /// # Errors
    ///
    /// See [`VoteGate::ensure_can_vote`].
    pub fn cast_vote(
        &mut self,
        player: &PlayerId,
        roster: &BTreeSet<PlayerId>,
    ) -> Result<usize, DomainError> {
        self.ensure_can_vote(player, roster)?;
        self.record(player.clone());
        Ok(self.votes.len())
    }

    pub(crate) fn record(&mut self, player: PlayerId) {
        self.votes.insert(player);
    }

    /// Drops a pending vote, e.g. when the voter leaves the roster.
    pub fn withdraw(&mut self, player: &PlayerId) {
        self.votes.remove(player);
    }

    /// Strict majority: more than half of `roster_size` have voted.
    #[must_use]
    pub fn has_majority(&self, roster_size: usize) -> bool {
        self.open && self.votes.len() * 2 > roster_size
    }

    /// Smallest number of votes that forms a majority of `roster_size`.
    #[must_use]
    pub fn required_votes(roster_size: usize) -> usize {
        roster_size / 2 + 1
    }

    /// Closes the proposal and clears all votes.
    pub fn close(&mut self) {
        self.open = false;
        self.votes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(n: usize) -> BTreeSet<PlayerId> {
        (0..n).map(|i| PlayerId::new(format!("p{i}"))).collect()
    }

    #[test]
    fn test_half_of_even_roster_is_not_a_majority() {
        let members = roster(4);
        let mut gate = VoteGate::new();
        gate.open_proposal();

        gate.cast_vote(&PlayerId::new("p0"), &members).unwrap();
        gate.cast_vote(&PlayerId::new("p1"), &members).unwrap();
        assert!(!gate.has_majority(4));

        gate.cast_vote(&PlayerId::new("p2"), &members).unwrap();
        assert!(gate.has_majority(4));
    }

    #[test]
    fn test_two_of_three_is_a_majority() {
        let members = roster(3);
        let mut gate = VoteGate::new();
        gate.open_proposal();

        gate.cast_vote(&PlayerId::new("p0"), &members).unwrap();
        assert!(!gate.has_majority(3));
        gate.cast_vote(&PlayerId::new("p2"), &members).unwrap();
        assert!(gate.has_majority(3));
    }

    #[test]
    fn test_voting_twice_counts_once() {
        let members = roster(3);
        let mut gate = VoteGate::new();
        gate.open_proposal();

        assert_eq!(gate.cast_vote(&PlayerId::new("p0"), &members).unwrap(), 1);
        assert_eq!(gate.cast_vote(&PlayerId::new("p0"), &members).unwrap(), 1);
        assert!(!gate.has_majority(3));
    }

    #[test]
    fn test_empty_roster_never_reaches_majority() {
        let mut gate = VoteGate::new();
        gate.open_proposal();

        assert!(!gate.has_majority(0));
    }

    #[test]
    fn test_vote_on_closed_gate_is_rejected() {
        let mut gate = VoteGate::new();

        let result = gate.cast_vote(&PlayerId::new("p0"), &roster(1));

        assert!(matches!(result, Err(DomainError::ProposalNotOpen)));
        assert!(gate.votes().is_empty());
    }

    #[test]
    fn test_vote_from_non_member_is_rejected() {
        let mut gate = VoteGate::new();
        gate.open_proposal();

        let result = gate.cast_vote(&PlayerId::new("stranger"), &roster(2));

        match result.unwrap_err() {
            DomainError::NotEligible(player) => assert_eq!(player.as_str(), "stranger"),
            other => panic!("expected NotEligible, got {other:?}"),
        }
    }

    #[test]
    fn test_reopening_clears_previous_votes() {
        let members = roster(3);
        let mut gate = VoteGate::new();
        gate.open_proposal();
        gate.cast_vote(&PlayerId::new("p0"), &members).unwrap();

        gate.open_proposal();

        assert!(gate.is_open());
        assert!(gate.votes().is_empty());
    }

    #[test]
    fn test_close_clears_votes_and_closes() {
        let members = roster(3);
        let mut gate = VoteGate::new();
        gate.open_proposal();
        gate.cast_vote(&PlayerId::new("p0"), &members).unwrap();

        gate.close();

        assert!(!gate.is_open());
        assert!(gate.votes().is_empty());
    }

    #[test]
    fn test_required_votes_is_strict_majority() {
        assert_eq!(VoteGate::required_votes(0), 1);
        assert_eq!(VoteGate::required_votes(3), 2);
        assert_eq!(VoteGate::required_votes(4), 3);
    }
}
