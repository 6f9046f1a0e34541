//! Stat bounds hold for any starting values and any sequence of deltas.

use proptest::prelude::*;
use story_rules::{
    Change, PlayerState, StatChange, StatKind, Stats, STAT_CEILING, STAT_FLOOR,
};

fn stat_kind() -> impl Strategy<Value = StatKind> {
    prop::sample::select(StatKind::ALL.to_vec())
}

fn assert_in_range(stats: &Stats) -> Result<(), TestCaseError> {
    prop_assert!((STAT_FLOOR..=STAT_CEILING).contains(&stats.health()));
    prop_assert!((STAT_FLOOR..=STAT_CEILING).contains(&stats.reputation()));
    prop_assert!(stats.resources() >= STAT_FLOOR);
    Ok(())
}

proptest! {
    #[test]
    fn test_new_clamps_any_raw_values(
        health in any::<i32>(),
        reputation in any::<i32>(),
        resources in any::<i32>(),
    ) {
        let stats = Stats::new(health, reputation, resources);
        assert_in_range(&stats)?;
        prop_assert_eq!(stats.health(), health.clamp(STAT_FLOOR, STAT_CEILING));
        prop_assert_eq!(stats.resources(), resources.max(STAT_FLOOR));
    }

    #[test]
    fn test_deltas_never_leave_range(
        start in (any::<i32>(), any::<i32>(), any::<i32>()),
        deltas in prop::collection::vec((stat_kind(), any::<i32>()), 1..40),
    ) {
        let mut stats = Stats::new(start.0, start.1, start.2);
        for (stat, delta) in deltas {
            let before = stats.get(stat);
            let applied = stats.apply(stat, delta);
            let after = stats.get(stat);

            assert_in_range(&stats)?;
            prop_assert_eq!(applied, after - before);
            if delta >= 0 {
                prop_assert!(applied >= 0 && applied <= delta);
            } else {
                prop_assert!(applied <= 0 && applied >= delta);
            }
        }
    }

    #[test]
    fn test_player_reports_only_applied_deltas(
        deltas in prop::collection::vec((stat_kind(), -500_i32..500), 1..40),
    ) {
        let mut player = PlayerState::new("Test", "inicio");
        for (stat, delta) in deltas {
            let before = player.stats().get(stat);
            let change = player.apply_stat_change(StatChange::new(stat, delta));
            let after = player.stats().get(stat);

            assert_in_range(player.stats())?;
            match change {
                Some(Change::Stat { stat: reported, delta: applied }) => {
                    prop_assert_eq!(reported, stat);
                    prop_assert_eq!(applied, after - before);
                    prop_assert_ne!(applied, 0);
                }
                Some(other) => prop_assert!(false, "unexpected change {:?}", other),
                None => prop_assert_eq!(before, after),
            }
        }
    }
}
