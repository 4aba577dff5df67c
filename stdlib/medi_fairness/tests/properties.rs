//! Property-based checks for tallies, pairwise measures and epsilon.

use medi_fairness::{
    epsilon, pairwise_log_ratio, pairwise_ratio, subgroup_rates, tally, FairnessConfig, Rate,
    SampleSet, SubgroupKey,
};
use proptest::prelude::*;

const TOLERANCE: f64 = 1e-9;

/// Index-aligned (prediction, label, group, band) rows.
fn rows(max_len: usize) -> impl Strategy<Value = Vec<(bool, bool, u8, u8)>> {
    prop::collection::vec((any::<bool>(), any::<bool>(), 0u8..2, 0u8..3), 1..max_len)
}

fn sample_set(rows: &[(bool, bool, u8, u8)]) -> SampleSet {
    let preds = rows.iter().map(|r| r.0).collect();
    let labels = rows.iter().map(|r| r.1).collect();
    SampleSet::new(preds, labels)
        .and_then(|s| s.with_attribute("group", rows.iter().map(|r| format!("g{}", r.2))))
        .and_then(|s| s.with_attribute("band", rows.iter().map(|r| r.3 as i64)))
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn tally_counts_every_masked_sample(
        data in prop::collection::vec((any::<bool>(), any::<bool>(), any::<bool>()), 0..64)
    ) {
        let preds: Vec<bool> = data.iter().map(|d| d.0).collect();
        let labels: Vec<bool> = data.iter().map(|d| d.1).collect();
        let mask: Vec<bool> = data.iter().map(|d| d.2).collect();
        let t = tally(&preds, &labels, &mask).unwrap();
        prop_assert_eq!(t.total(), mask.iter().filter(|&&m| m).count());

        let correct = data.iter().filter(|d| d.2 && d.0 == d.1).count();
        prop_assert_eq!(t.tp + t.tn, correct);
    }

    #[test]
    fn every_sample_lands_in_exactly_one_subgroup(data in rows(48)) {
        let samples = sample_set(&data);
        let rates = subgroup_rates(&samples, &Rate::Accuracy, &FairnessConfig::default()).unwrap();
        let total: usize = rates.entries.iter().map(|e| e.size).sum();
        prop_assert_eq!(total, samples.len());
        for entry in &rates.entries {
            prop_assert_eq!(entry.rate.is_none(), entry.size == 0);
        }
    }

    #[test]
    fn pairwise_ratio_is_symmetric_and_at_least_one(data in rows(48)) {
        let samples = sample_set(&data);
        let a = SubgroupKey::single("group", "g0");
        let b = SubgroupKey::single("group", "g1");
        let ab = pairwise_ratio(&samples, &Rate::Accuracy, &a, &b).unwrap();
        let ba = pairwise_ratio(&samples, &Rate::Accuracy, &b, &a).unwrap();
        prop_assert_eq!(ab, ba);
        if let Some(r) = ab {
            prop_assert!(r >= 1.0);
            let log_ratio = pairwise_log_ratio(&samples, &Rate::Accuracy, &a, &b)
                .unwrap()
                .unwrap();
            if r.is_finite() {
                prop_assert!((log_ratio.exp() - r).abs() <= TOLERANCE * r);
            } else {
                prop_assert!(log_ratio.is_infinite());
            }
        }
    }

    #[test]
    fn epsilon_is_non_negative_and_matches_extremes(data in rows(48)) {
        let samples = sample_set(&data);
        let config = FairnessConfig::default();
        let report = epsilon(&samples, &Rate::Accuracy, &config).unwrap();
        let eps = report.epsilon.unwrap();
        prop_assert!(eps >= 0.0);

        let floored: Vec<f64> = report
            .rates
            .values()
            .map(|&r| if r == 0.0 { config.zero_rate_floor } else { r })
            .collect();
        let max = floored.iter().copied().fold(f64::MIN, f64::max);
        let min = floored.iter().copied().fold(f64::MAX, f64::min);
        prop_assert!((eps - (max.ln() - min.ln())).abs() <= TOLERANCE);
        prop_assert!((report.exp_epsilon.unwrap() - eps.exp()).abs() <= TOLERANCE * eps.exp());
    }

    #[test]
    fn identical_rates_give_zero_epsilon(groups in prop::collection::vec(0u8..4, 1..32)) {
        // every sample predicted correctly, so each subgroup has accuracy 1
        let n = groups.len();
        let samples = SampleSet::new(vec![true; n], vec![true; n])
            .and_then(|s| s.with_attribute("group", groups.iter().map(|&g| g as i64)))
            .unwrap();
        let report = epsilon(&samples, &Rate::Accuracy, &FairnessConfig::default()).unwrap();
        prop_assert_eq!(report.epsilon, Some(0.0));
        prop_assert_eq!(report.exp_epsilon, Some(1.0));
    }
}
