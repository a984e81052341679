use govcache_governance::Thresholds;
use proptest::prelude::*;

proptest! {
    #[test]
    fn thresholds_never_exceed_base(
        quorum in 0u32..=100,
        pass in 0u32..=100,
        eligible in 0u64..1_000_000,
        total in 0u64..1_000_000,
    ) {
        let t = Thresholds::new(quorum, pass, eligible, total);
        prop_assert!(t.quorum <= eligible);
        prop_assert!(t.pass <= total);
    }

    #[test]
    fn more_approval_votes_never_hurt(
        pass in 0u32..=100,
        total in 1u64..10_000,
        yes in 0u64..10_000,
    ) {
        let yes = yes.min(total);
        let t = Thresholds::new(0, pass, total, total);
        if t.approves(total, yes) {
            prop_assert!(t.approves(total, total));
        }
    }

    #[test]
    fn quorum_is_independent_of_turnout(
        quorum in 0u32..=100,
        eligible in 0u64..1_000_000,
        a in 0u64..1_000_000,
        b in 0u64..1_000_000,
    ) {
        prop_assert_eq!(
            Thresholds::new(quorum, 50, eligible, a).quorum,
            Thresholds::new(quorum, 50, eligible, b).quorum
        );
    }
}
