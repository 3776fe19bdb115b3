use crate::index::store::LabelId;

/// Per-read vote counter with a deterministic leader.
///
/// The leader is the label that first reached the current maximum vote count
/// in scan order: a later label only takes over by strictly exceeding it.
#[derive(Debug, Clone, Default)]
pub struct VoteTally {
    /// (label, votes) in first-vote order; reads hit few labels, so a linear
    /// scan beats hashing here
    votes: Vec<(LabelId, usize)>,
    leader: Option<LabelId>,
    leader_votes: usize,
    matched: usize,
}

impl VoteTally {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one vote for `label`
    pub fn vote(&mut self, label: LabelId) {
        self.matched += 1;

        let count = match self.votes.iter().position(|(id, _)| *id == label) {
            Some(i) => {
                self.votes[i].1 += 1;
                self.votes[i].1
            }
            None => {
                self.votes.push((label, 1));
                1
            }
        };

        if count > self.leader_votes {
            self.leader = Some(label);
            self.leader_votes = count;
        }
    }

    /// Winning label and its vote count, if any vote was cast
    #[must_use]
    pub fn leader(&self) -> Option<(LabelId, usize)> {
        self.leader.map(|label| (label, self.leader_votes))
    }

    /// Total votes cast
    #[must_use]
    pub fn matched(&self) -> usize {
        self.matched
    }

    #[cfg(test)]
    fn votes_for(&self, label: LabelId) -> usize {
        self.votes
            .iter()
            .find(|(id, _)| *id == label)
            .map_or(0, |(_, count)| *count)
    }
}
