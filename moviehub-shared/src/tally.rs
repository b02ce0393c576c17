/// Vote arithmetic for the movie aggregate
///
/// A movie stores denormalized `upvotes`, `downvotes` and `vote_score`
/// counters so that sorting by score never aggregates the ledger. This module
/// holds the pure part of keeping those counters equal to the ledger: given a
/// user's previous vote and the vote they are casting now, it decides what
/// happens to the ledger row and by how much each counter moves.
///
/// The database path in [`crate::models::vote`] applies exactly these deltas,
/// so the same rules are exercised by the property tests without a database.
///
/// # Example
///
/// ```
/// use moviehub_shared::tally::{VoteCounters, VoteTransition, VoteType};
///
/// let counters = VoteCounters::default();
///
/// let first = VoteTransition::between(None, VoteType::Up);
/// let counters = counters.apply(first.delta());
/// assert_eq!((counters.upvotes, counters.downvotes, counters.vote_score), (1, 0, 1));
///
/// let flip = VoteTransition::between(Some(VoteType::Up), VoteType::Down);
/// let counters = counters.apply(flip.delta());
/// assert_eq!((counters.upvotes, counters.downvotes, counters.vote_score), (0, 1, -1));
/// ```

use serde::{Deserialize, Serialize};

/// Rejected vote sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Vote type must be 1 or -1, got {0}")]
pub struct InvalidVoteType(pub i64);

/// Direction of a vote, stored as `1` / `-1`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i16")]
pub enum VoteType {
    /// Upvote (+1)
    Up,

    /// Downvote (-1)
    Down,
}

impl VoteType {
    /// Wire and storage representation
    pub fn as_i16(self) -> i16 {
        match self {
            VoteType::Up => 1,
            VoteType::Down => -1,
        }
    }

    /// The opposite direction
    pub fn opposite(self) -> Self {
        match self {
            VoteType::Up => VoteType::Down,
            VoteType::Down => VoteType::Up,
        }
    }
}

impl TryFrom<i64> for VoteType {
    type Error = InvalidVoteType;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteType::Up),
            -1 => Ok(VoteType::Down),
            other => Err(InvalidVoteType(other)),
        }
    }
}

impl TryFrom<i16> for VoteType {
    type Error = InvalidVoteType;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        VoteType::try_from(i64::from(value))
    }
}

impl From<VoteType> for i16 {
    fn from(vote_type: VoteType) -> Self {
        vote_type.as_i16()
    }
}

/// Relative change to a movie's counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterDelta {
    pub upvotes: i32,
    pub downvotes: i32,
}

impl CounterDelta {
    /// Change in `vote_score` implied by this delta
    pub fn score(&self) -> i32 {
        self.upvotes - self.downvotes
    }

    pub fn is_zero(&self) -> bool {
        self.upvotes == 0 && self.downvotes == 0
    }

    fn bump(vote_type: VoteType, by: i32) -> Self {
        match vote_type {
            VoteType::Up => CounterDelta {
                upvotes: by,
                downvotes: 0,
            },
            VoteType::Down => CounterDelta {
                upvotes: 0,
                downvotes: by,
            },
        }
    }

    fn plus(self, other: CounterDelta) -> Self {
        CounterDelta {
            upvotes: self.upvotes + other.upvotes,
            downvotes: self.downvotes + other.downvotes,
        }
    }
}

/// Aggregate counters stored on a movie
///
/// `vote_score` is always `upvotes - downvotes`; the only constructors keep
/// it that way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct VoteCounters {
    pub upvotes: i32,
    pub downvotes: i32,
    pub vote_score: i32,
}

impl VoteCounters {
    pub fn new(upvotes: i32, downvotes: i32) -> Self {
        Self {
            upvotes,
            downvotes,
            vote_score: upvotes - downvotes,
        }
    }

    /// Counters after applying `delta`
    pub fn apply(self, delta: CounterDelta) -> Self {
        Self::new(self.upvotes + delta.upvotes, self.downvotes + delta.downvotes)
    }

    /// Whether the stored score agrees with the two counters
    pub fn is_consistent(&self) -> bool {
        self.vote_score == self.upvotes - self.downvotes
    }
}

/// What a cast does to the ledger row for one (user, movie) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No previous vote: insert a new row
    Insert(VoteType),

    /// Same direction as before: nothing changes
    Unchanged(VoteType),

    /// Opposite direction: flip the stored sign in place
    Flip { from: VoteType, to: VoteType },
}

impl VoteTransition {
    /// Decides the transition from the user's existing vote to `requested`
    pub fn between(existing: Option<VoteType>, requested: VoteType) -> Self {
        match existing {
            None => VoteTransition::Insert(requested),
            Some(previous) if previous == requested => VoteTransition::Unchanged(requested),
            Some(previous) => VoteTransition::Flip {
                from: previous,
                to: requested,
            },
        }
    }

    /// Counter movement for this transition
    pub fn delta(&self) -> CounterDelta {
        match *self {
            VoteTransition::Insert(vote_type) => CounterDelta::bump(vote_type, 1),
            VoteTransition::Unchanged(_) => CounterDelta::default(),
            VoteTransition::Flip { from, to } => {
                CounterDelta::bump(from, -1).plus(CounterDelta::bump(to, 1))
            }
        }
    }

    /// The sign stored in the ledger once the transition is applied
    pub fn resulting_vote(&self) -> VoteType {
        match *self {
            VoteTransition::Insert(vote_type) | VoteTransition::Unchanged(vote_type) => vote_type,
            VoteTransition::Flip { to, .. } => to,
        }
    }
}
