//! Property-based tests for domain invariants
//!
//! Uses proptest to verify that the ranked aggregate keeps its ordering and
//! uniqueness invariants for arbitrary insertion sequences.

use rankstream_domain::{
    RankedAggregator, RankedItem, SessionState,
    value_objects::{ItemId, Score, SessionId},
};
use proptest::prelude::*;
use serde_json::json;

fn item(id: u8, score: i16) -> RankedItem {
    RankedItem::new(
        ItemId::new(format!("c{id}")).unwrap(),
        Score::new(f64::from(score)).unwrap(),
        json!({ "id": format!("c{id}"), "fitScore": score }),
    )
}

fn assert_ranked(agg: &RankedAggregator) -> Result<(), TestCaseError> {
    for pair in agg.results().windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        prop_assert!(a.score() >= b.score(), "{:?} before {:?}", a, b);
        if a.score() == b.score() {
            prop_assert!(a.arrival() < b.arrival(), "tie out of arrival order");
        }
    }
    Ok(())
}

proptest! {
    /// Any insertion order yields a list sorted by score descending,
    /// ties in arrival order
    #[test]
    fn results_always_sorted(inserts in prop::collection::vec((0u8..=255, -5i16..=5), 0..120)) {
        let mut agg = RankedAggregator::new();
        for (id, score) in inserts {
            agg.insert(item(id, score));
            assert_ranked(&agg)?;
        }
    }

    /// Ids stay unique no matter how often they repeat
    #[test]
    fn ids_never_duplicate(inserts in prop::collection::vec((0u8..16, 0i16..100), 0..200)) {
        let mut agg = RankedAggregator::new();
        for (id, score) in &inserts {
            agg.insert(item(*id, *score));
        }

        let mut seen = std::collections::HashSet::new();
        for result in agg.results() {
            prop_assert!(seen.insert(result.id().clone()), "duplicate {}", result.id());
        }

        let distinct: std::collections::HashSet<_> = inserts.iter().map(|(id, _)| *id).collect();
        prop_assert_eq!(agg.len(), distinct.len());
    }

    /// The last score seen for an id is the one kept
    #[test]
    fn last_write_wins(scores in prop::collection::vec(0i16..1000, 1..20)) {
        let mut agg = RankedAggregator::new();
        for score in &scores {
            agg.insert(item(7, *score));
        }
        let stored = agg.get(&ItemId::new("c7").unwrap()).unwrap();
        prop_assert_eq!(stored.score().value(), f64::from(*scores.last().unwrap()));
    }

    /// Equal-score items come out in exactly the order they arrived
    #[test]
    fn stable_on_equal_scores(count in 1u8..60) {
        let mut agg = RankedAggregator::new();
        for id in 0..count {
            agg.insert(item(id, 42));
        }
        let order: Vec<u64> = agg.results().iter().map(RankedItem::arrival).collect();
        let expected: Vec<u64> = (0..u64::from(count)).collect();
        prop_assert_eq!(order, expected);
    }

    /// Finite scores always construct; ordering agrees with f64
    #[test]
    fn score_order_matches_f64(a in -1.0e9f64..1.0e9, b in -1.0e9f64..1.0e9) {
        let (sa, sb) = (Score::new(a).unwrap(), Score::new(b).unwrap());
        prop_assert_eq!(sa < sb, a < b);
    }

    /// SessionId roundtrip through string preserves value
    #[test]
    fn session_id_string_roundtrip(_seed in any::<u64>()) {
        let id = SessionId::new();
        let parsed = SessionId::from_string(&id.to_string()).unwrap();
        prop_assert_eq!(id, parsed);
    }
}

#[cfg(test)]
mod additional_tests {
    use super::*;

    #[test]
    fn terminal_states_are_terminal() {
        assert!(SessionState::Completed.is_terminal());
        assert!(SessionState::Failed.is_terminal());
        assert!(SessionState::Cancelled.is_terminal());
        assert!(!SessionState::Streaming.is_terminal());
    }

    #[test]
    fn empty_aggregator_is_sorted() {
        let agg = RankedAggregator::new();
        assert!(agg.results().is_empty());
    }
}
