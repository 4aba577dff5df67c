//! Subgroup fairness diagnostics for binary classifiers.
//!
//! Samples are partitioned into every intersection of the observed attribute
//! values, a confusion-matrix rate is computed per subgroup, and the rates are
//! reduced to worst-case disparities (difference, ratio, log-ratio, epsilon).
//!
//! ```
//! use medi_fairness::{epsilon, FairnessConfig, Rate, SampleSet};
//!
//! let samples = SampleSet::from_binary(&[1, 0, 1, 1], &[1, 0, 0, 1])
//!     .and_then(|s| s.with_attribute("sex", ["F", "F", "M", "M"]))
//!     .unwrap();
//! let report = epsilon(&samples, &Rate::Accuracy, &FairnessConfig::default()).unwrap();
//! assert!(report.epsilon.unwrap() > 0.0);
//! ```

pub mod config;
pub mod confusion;
pub mod disparity;
pub mod error;
pub mod measures;
pub mod rates;
pub mod samples;
pub mod subgroup;

pub use config::{EmptySubgroupPolicy, FairnessConfig, DEFAULT_ZERO_RATE_FLOOR};
pub use confusion::{tally, ConfusionTally};
pub use disparity::{
    epsilon, global_disparity, group_rate, pairwise_difference, pairwise_disparity,
    pairwise_log_ratio, pairwise_ratio, subgroup_rates, Disparity, EpsilonReport, SubgroupRate,
    SubgroupRates,
};
pub use error::{FairnessError, Result};
pub use measures::{average_odds_difference, disparate_impact, equal_opportunity_difference};
pub use rates::{sliced_tally, GroupRate, Rate, RateValue};
pub use samples::{parse_binary, AttributeValue, SampleSet};
pub use subgroup::{
    attribute_domains, enumerate_subgroups, enumerate_subgroups_capped, membership,
    subgroup_count, unique_labels, SubgroupKey, DEFAULT_LABEL_SEPARATOR,
};
