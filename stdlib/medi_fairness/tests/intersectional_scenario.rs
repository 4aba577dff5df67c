use approx::assert_abs_diff_eq;
use medi_fairness::{
    epsilon, global_disparity, subgroup_rates, Disparity, EmptySubgroupPolicy, FairnessConfig,
    Rate, SampleSet, SubgroupKey,
};
use pretty_assertions::assert_eq;

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scenario() -> SampleSet {
    SampleSet::from_binary(
        &[1, 1, 1, 1, 1, 0, 0, 0, 0, 0],
        &[1, 1, 1, 0, 1, 0, 1, 0, 1, 1],
    )
    .and_then(|s| s.with_attribute("group", ["A", "A", "A", "A", "B", "B", "B", "B", "A", "B"]))
    .and_then(|s| s.with_attribute("level", [1, 2, 1, 2, 1, 1, 2, 2, 1, 2]))
    .unwrap()
}

#[test]
fn four_intersections_with_expected_accuracies() {
    init();
    let rates = subgroup_rates(&scenario(), &Rate::Accuracy, &FairnessConfig::default()).unwrap();
    let labels: Vec<&str> = rates.entries.iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["A_1", "A_2", "B_1", "B_2"]);

    let by_label = rates.by_label();
    assert_abs_diff_eq!(by_label["A_1"].unwrap(), 2.0 / 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(by_label["A_2"].unwrap(), 0.5, epsilon = 1e-12);
    assert_abs_diff_eq!(by_label["B_1"].unwrap(), 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(by_label["B_2"].unwrap(), 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn epsilon_is_log_of_extreme_ratio() {
    init();
    let report = epsilon(&scenario(), &Rate::Accuracy, &FairnessConfig::default()).unwrap();
    assert_abs_diff_eq!(report.epsilon.unwrap(), 3.0f64.ln(), epsilon = 1e-12);
    assert_abs_diff_eq!(report.exp_epsilon.unwrap(), 3.0, epsilon = 1e-9);
    assert!(report.floored.is_empty());
    assert!(report.skipped.is_empty());
}

#[test]
fn zero_accuracy_subgroup_is_floored() {
    init();
    // only B_2 is always wrong
    let samples = SampleSet::from_binary(&[1, 1, 0, 0], &[1, 1, 1, 0])
        .and_then(|s| s.with_attribute("group", ["A", "A", "B", "B"]))
        .and_then(|s| s.with_attribute("level", [1, 2, 2, 1]))
        .unwrap();
    let report = epsilon(&samples, &Rate::Accuracy, &FairnessConfig::default()).unwrap();
    assert_eq!(report.floored, vec!["B_2".to_string()]);
    assert_eq!(report.rates["B_2"], 0.0);
    assert_abs_diff_eq!(report.epsilon.unwrap(), 23.025850929940457, epsilon = 1e-9);

    let lenient = FairnessConfig::default().with_zero_rate_floor(1e-3);
    let report = epsilon(&samples, &Rate::Accuracy, &lenient).unwrap();
    assert_abs_diff_eq!(report.epsilon.unwrap(), -(1e-3f64).ln(), epsilon = 1e-9);
}

#[test]
fn empty_intersection_splits_the_two_policies() {
    init();
    // no B_1 sample
    let samples = SampleSet::from_binary(&[1, 1, 0, 0], &[1, 0, 0, 0])
        .and_then(|s| s.with_attribute("group", ["A", "A", "B", "B"]))
        .and_then(|s| s.with_attribute("level", [1, 2, 2, 2]))
        .unwrap();
    let config = FairnessConfig::default();

    let report = epsilon(&samples, &Rate::Accuracy, &config).unwrap();
    assert_eq!(report.skipped, vec!["B_1".to_string()]);
    assert!(report.epsilon.is_some());

    for measure in [Disparity::Difference, Disparity::Ratio, Disparity::LogRatio] {
        let d = global_disparity(&samples, &Rate::Accuracy, measure, &config).unwrap();
        assert_eq!(d, None, "{measure:?}");
    }

    let ignore = config.with_empty_subgroups(EmptySubgroupPolicy::Ignore);
    let d = global_disparity(&samples, &Rate::Accuracy, Disparity::Difference, &ignore).unwrap();
    // A_1 = 1.0, A_2 = 0.0, B_2 = 1.0
    assert_eq!(d, Some(1.0));
}

#[test]
fn single_attribute_analysis_uses_one_pair_keys() {
    init();
    let samples = scenario().select_attributes(&["group"]).unwrap();
    let rates = subgroup_rates(&samples, &Rate::Tpr, &FairnessConfig::default()).unwrap();
    assert_eq!(rates.len(), 2);
    assert_eq!(rates.entries[0].key, SubgroupKey::single("group", "A"));
    // A: tp=3 fn=1, B: tp=1 fn=2
    assert_abs_diff_eq!(rates.entries[0].rate.unwrap(), 0.75, epsilon = 1e-12);
    assert_abs_diff_eq!(rates.entries[1].rate.unwrap(), 1.0 / 3.0, epsilon = 1e-12);
}

#[test]
fn domains_of_two_and_three_give_six_disjoint_subgroups() {
    init();
    let samples = SampleSet::from_binary(&[1, 0, 1, 0, 1, 0, 1], &[1, 1, 0, 0, 1, 1, 0])
        .and_then(|s| s.with_attribute("sex", ["F", "M", "F", "M", "F", "M", "F"]))
        .and_then(|s| s.with_attribute("age", ["young", "mid", "old", "young", "mid", "old", "old"]))
        .unwrap();
    let keys = samples.subgroups();
    assert_eq!(keys.len(), 6);

    let mut hits = vec![0usize; samples.len()];
    for key in &keys {
        for (i, member) in samples.membership(key).unwrap().into_iter().enumerate() {
            if member {
                hits[i] += 1;
            }
        }
    }
    assert!(hits.iter().all(|&h| h == 1));
}
