//! Property-based tests for vote reconciliation arithmetic.
//!
//! An in-memory ledger replays random vote sequences through
//! `VoteTransition` exactly the way the database path does, and checks:
//! 1. Counters always equal a recount of the ledger
//! 2. `vote_score == upvotes - downvotes` after every step
//! 3. Re-casting the current vote changes nothing
//! 4. A flip moves one vote from one counter to the other

use std::collections::HashMap;

use proptest::prelude::*;

use moviehub_shared::tally::{VoteCounters, VoteTransition, VoteType};

const USERS: u8 = 6;
const MOVIES: u8 = 3;

/// Ledger plus denormalized counters, mutated only through transitions
#[derive(Debug, Default)]
struct Board {
    ledger: HashMap<(u8, u8), VoteType>,
    counters: HashMap<u8, VoteCounters>,
}

impl Board {
    fn cast(&mut self, user: u8, movie: u8, vote_type: VoteType) -> VoteTransition {
        let existing = self.ledger.get(&(user, movie)).copied();
        let transition = VoteTransition::between(existing, vote_type);

        self.ledger.insert((user, movie), transition.resulting_vote());
        let counters = self.counters.entry(movie).or_default();
        *counters = counters.apply(transition.delta());

        transition
    }

    fn counters(&self, movie: u8) -> VoteCounters {
        self.counters.get(&movie).copied().unwrap_or_default()
    }

    fn recount(&self, movie: u8) -> VoteCounters {
        let (up, down) = self
            .ledger
            .iter()
            .filter(|((_, m), _)| *m == movie)
            .fold((0, 0), |(up, down), (_, vote)| match vote {
                VoteType::Up => (up + 1, down),
                VoteType::Down => (up, down + 1),
            });
        VoteCounters::new(up, down)
    }
}

// =============================================================================
// Strategy helpers
// =============================================================================

fn vote_type_strategy() -> impl Strategy<Value = VoteType> {
    prop_oneof![Just(VoteType::Up), Just(VoteType::Down)]
}

fn cast_strategy() -> impl Strategy<Value = (u8, u8, VoteType)> {
    (0..USERS, 0..MOVIES, vote_type_strategy())
}

fn history_strategy(max_len: usize) -> impl Strategy<Value = Vec<(u8, u8, VoteType)>> {
    prop::collection::vec(cast_strategy(), 0..=max_len)
}

// =============================================================================
// Counters match the ledger after any history
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn counters_always_match_ledger(history in history_strategy(64)) {
        let mut board = Board::default();

        for (user, movie, vote_type) in history {
            board.cast(user, movie, vote_type);

            let counters = board.counters(movie);
            prop_assert!(counters.is_consistent());
            prop_assert!(counters.upvotes >= 0 && counters.downvotes >= 0);
            prop_assert_eq!(counters, board.recount(movie));
        }

        for movie in 0..MOVIES {
            prop_assert_eq!(board.counters(movie), board.recount(movie));
        }
    }
}

// =============================================================================
// Each voter counts once per movie, however often they vote
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn one_ledger_entry_per_pair(history in history_strategy(64)) {
        let mut board = Board::default();
        for (user, movie, vote_type) in &history {
            board.cast(*user, *movie, *vote_type);
        }

        for movie in 0..MOVIES {
            let voters = history.iter().filter(|(_, m, _)| *m == movie).map(|(u, _, _)| *u);
            let distinct = voters.collect::<std::collections::HashSet<_>>().len() as i32;
            let counters = board.counters(movie);
            prop_assert_eq!(counters.upvotes + counters.downvotes, distinct);
        }
    }
}

// =============================================================================
// Re-casting the same vote is a no-op
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn repeat_vote_is_idempotent(
        history in history_strategy(32),
        (user, movie, vote_type) in cast_strategy(),
    ) {
        let mut board = Board::default();
        for (u, m, v) in history {
            board.cast(u, m, v);
        }

        board.cast(user, movie, vote_type);
        let before = board.counters(movie);

        let repeat = board.cast(user, movie, vote_type);
        prop_assert_eq!(repeat, VoteTransition::Unchanged(vote_type));
        prop_assert_eq!(board.counters(movie), before);
    }
}

// =============================================================================
// Flip law: one counter down by one, the other up by one, score moves by two
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn flip_moves_exactly_one_vote(
        history in history_strategy(32),
        (user, movie, vote_type) in cast_strategy(),
    ) {
        let mut board = Board::default();
        for (u, m, v) in history {
            board.cast(u, m, v);
        }

        board.cast(user, movie, vote_type);
        let before = board.counters(movie);

        let flip = board.cast(user, movie, vote_type.opposite());
        prop_assert_eq!(flip, VoteTransition::Flip { from: vote_type, to: vote_type.opposite() });

        let after = board.counters(movie);
        let expected_score_change = match vote_type {
            VoteType::Up => -2,
            VoteType::Down => 2,
        };
        prop_assert_eq!(after.upvotes + after.downvotes, before.upvotes + before.downvotes);
        prop_assert_eq!(after.vote_score - before.vote_score, expected_score_change);
    }
}

// =============================================================================
// Other movies are untouched by a cast
// =============================================================================
proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn cast_only_touches_its_movie(
        history in history_strategy(32),
        (user, movie, vote_type) in cast_strategy(),
    ) {
        let mut board = Board::default();
        for (u, m, v) in history {
            board.cast(u, m, v);
        }

        let others: Vec<(u8, VoteCounters)> = (0..MOVIES)
            .filter(|m| *m != movie)
            .map(|m| (m, board.counters(m)))
            .collect();

        board.cast(user, movie, vote_type);

        for (m, counters) in others {
            prop_assert_eq!(board.counters(m), counters);
        }
    }
}
