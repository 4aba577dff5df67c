//! Per-subgroup rates and their reduction to disparity scalars.
//!
//! Two policies apply to subgroups without a defined rate:
//!
//! * epsilon aggregation ([`epsilon`]) skips them and floors exact-zero
//!   rates so sparse intersections never make the result undefined;
//! * difference/ratio aggregation ([`global_disparity`]) propagates them:
//!   one undefined subgroup makes the whole aggregate undefined unless the
//!   config opts into [`EmptySubgroupPolicy::Ignore`].

use std::collections::BTreeMap;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{EmptySubgroupPolicy, FairnessConfig};
use crate::confusion::ConfusionTally;
use crate::error::Result;
use crate::rates::{sliced_tally, GroupRate, RateValue};
use crate::samples::SampleSet;
use crate::subgroup::{enumerate_subgroups_capped, unique_labels, SubgroupKey};

/// Rule for combining two or more rates into one disparity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Disparity {
    /// Absolute difference, `max - min` over many rates.
    Difference,
    /// Worst-direction ratio, always `>= 1`.
    Ratio,
    /// Natural log of [`Disparity::Ratio`].
    LogRatio,
}

impl Disparity {
    /// Disparity between two rates. Undefined if either rate is.
    pub fn between(self, a: RateValue, b: RateValue) -> Option<f64> {
        let (a, b) = (a?, b?);
        self.over_extremes(a.max(b), a.min(b))
    }

    fn over_extremes(self, max: f64, min: f64) -> Option<f64> {
        match self {
            Disparity::Difference => Some(max - min),
            Disparity::Ratio => extreme_ratio(max, min),
            Disparity::LogRatio => extreme_ratio(max, min).map(f64::ln),
        }
    }
}

fn extreme_ratio(max: f64, min: f64) -> Option<f64> {
    if max == 0.0 {
        // both zero
        None
    } else if min == 0.0 {
        Some(f64::INFINITY)
    } else {
        Some(max / min)
    }
}

/// Rate of one subgroup; `None` when it is empty or the denominator is zero.
pub fn group_rate<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    key: &SubgroupKey,
) -> Result<RateValue> {
    let mask = samples.membership(key)?;
    rate.compute(samples.predictions(), samples.true_statuses(), &mask)
}

/// One enumerated subgroup and its rate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgroupRate {
    pub key: SubgroupKey,
    pub label: String,
    /// Members of the subgroup before any prediction slice.
    pub size: usize,
    /// The counts the rate was divided from.
    pub tally: ConfusionTally,
    pub rate: RateValue,
}

fn evaluate<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    key: SubgroupKey,
    label: String,
) -> Result<SubgroupRate> {
    let mask = samples.membership(&key)?;
    let size = mask.iter().filter(|&&m| m).count();
    let tally = sliced_tally(rate, samples.predictions(), samples.true_statuses(), &mask)?;
    let value = rate.rate_from_tally(&tally);
    log::trace!("{} {key}: n={size} {tally:?} -> {value:?}", rate.name());
    Ok(SubgroupRate {
        key,
        label,
        size,
        tally,
        rate: value,
    })
}

/// Rates for every enumerated subgroup, undefined ones included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubgroupRates {
    pub rate: String,
    pub entries: Vec<SubgroupRate>,
}

/// Rate of every subgroup in the cartesian product of the attribute domains.
///
/// Entries follow enumeration order; empty subgroups are kept with an
/// undefined rate. Labels are distinct (see [`unique_labels`]).
pub fn subgroup_rates<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    config: &FairnessConfig,
) -> Result<SubgroupRates> {
    let keys = enumerate_subgroups_capped(samples.attributes(), config.max_subgroups)?;
    let labels = unique_labels(&keys);

    #[cfg(feature = "parallel")]
    let entries = keys
        .into_par_iter()
        .zip(labels)
        .map(|(key, label)| evaluate(samples, rate, key, label))
        .collect::<Result<Vec<_>>>()?;
    #[cfg(not(feature = "parallel"))]
    let entries = keys
        .into_iter()
        .zip(labels)
        .map(|(key, label)| evaluate(samples, rate, key, label))
        .collect::<Result<Vec<_>>>()?;

    Ok(SubgroupRates {
        rate: rate.name().to_string(),
        entries,
    })
}

impl SubgroupRates {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &SubgroupKey) -> Option<&SubgroupRate> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Label to rate, undefined rates included.
    pub fn by_label(&self) -> BTreeMap<String, RateValue> {
        self.entries
            .iter()
            .map(|e| (e.label.clone(), e.rate))
            .collect()
    }

    /// Entries with a defined rate.
    pub fn defined(&self) -> impl Iterator<Item = (&SubgroupRate, f64)> + '_ {
        self.entries.iter().filter_map(|e| e.rate.map(|r| (e, r)))
    }

    pub fn has_undefined(&self) -> bool {
        self.entries.iter().any(|e| e.rate.is_none())
    }

    /// Reduce to one scalar under `policy`.
    ///
    /// `Propagate`: any undefined entry makes the result undefined.
    /// `Ignore`: undefined entries are dropped. No remaining rates is undefined.
    pub fn disparity(&self, measure: Disparity, policy: EmptySubgroupPolicy) -> Option<f64> {
        let values: Vec<f64> = match policy {
            EmptySubgroupPolicy::Propagate => self
                .entries
                .iter()
                .map(|e| e.rate)
                .collect::<Option<Vec<f64>>>()?,
            EmptySubgroupPolicy::Ignore => self.entries.iter().filter_map(|e| e.rate).collect(),
        };
        let max = values.iter().copied().reduce(f64::max)?;
        let min = values.iter().copied().reduce(f64::min)?;
        measure.over_extremes(max, min)
    }

    /// Max pairwise log-ratio over subgroups with a defined rate.
    ///
    /// Exact-zero rates are replaced by `zero_rate_floor` first, so a zero
    /// against a non-zero rate yields `-ln(floor)` rather than infinity.
    pub fn epsilon(&self, zero_rate_floor: f64) -> EpsilonReport {
        let mut rates = BTreeMap::new();
        let mut floored = Vec::new();
        let mut adjusted = Vec::new();
        for (entry, r) in self.defined() {
            rates.insert(entry.label.clone(), r);
            if r == 0.0 {
                log::debug!(
                    "{} {}: zero rate floored to {zero_rate_floor}",
                    self.rate,
                    entry.key
                );
                floored.push(entry.label.clone());
                adjusted.push(zero_rate_floor);
            } else {
                adjusted.push(r);
            }
        }
        let skipped: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.rate.is_none())
            .map(|e| e.label.clone())
            .collect();

        let mut epsilon: Option<f64> = None;
        for &p_i in &adjusted {
            for &p_j in &adjusted {
                let log_ratio = (p_i / p_j).ln();
                epsilon = Some(epsilon.map_or(log_ratio, |e| e.max(log_ratio)));
            }
        }

        EpsilonReport {
            rate: self.rate.clone(),
            epsilon,
            exp_epsilon: epsilon.map(f64::exp),
            rates,
            floored,
            skipped,
        }
    }
}

/// Result of epsilon aggregation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpsilonReport {
    pub rate: String,
    /// Max log-ratio between any two subgroup rates; undefined when no
    /// subgroup has a defined rate.
    pub epsilon: Option<f64>,
    /// Maximum multiplicative disparity, `exp(epsilon)`.
    pub exp_epsilon: Option<f64>,
    /// Unfloored rates of the subgroups that took part, by label.
    pub rates: BTreeMap<String, f64>,
    /// Labels whose zero rate was replaced by the floor.
    pub floored: Vec<String>,
    /// Labels left out because their rate is undefined.
    pub skipped: Vec<String>,
}

/// Disparity between two subgroups.
pub fn pairwise_disparity<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    a: &SubgroupKey,
    b: &SubgroupKey,
    measure: Disparity,
) -> Result<Option<f64>> {
    let ra = group_rate(samples, rate, a)?;
    let rb = group_rate(samples, rate, b)?;
    let d = measure.between(ra, rb);
    log::debug!("{} {measure:?} {a} vs {b}: {ra:?} / {rb:?} -> {d:?}", rate.name());
    Ok(d)
}

pub fn pairwise_difference<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    a: &SubgroupKey,
    b: &SubgroupKey,
) -> Result<Option<f64>> {
    pairwise_disparity(samples, rate, a, b, Disparity::Difference)
}

pub fn pairwise_ratio<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    a: &SubgroupKey,
    b: &SubgroupKey,
) -> Result<Option<f64>> {
    pairwise_disparity(samples, rate, a, b, Disparity::Ratio)
}

pub fn pairwise_log_ratio<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    a: &SubgroupKey,
    b: &SubgroupKey,
) -> Result<Option<f64>> {
    pairwise_disparity(samples, rate, a, b, Disparity::LogRatio)
}

/// Worst-case disparity over every enumerated subgroup.
///
/// Undefined subgroups are handled according to `config.empty_subgroups`.
pub fn global_disparity<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    measure: Disparity,
    config: &FairnessConfig,
) -> Result<Option<f64>> {
    config.validate()?;
    let rates = subgroup_rates(samples, rate, config)?;
    let d = rates.disparity(measure, config.empty_subgroups);
    log::debug!(
        "{} {measure:?} over {} subgroups ({:?}): {d:?}",
        rate.name(),
        rates.len(),
        config.empty_subgroups
    );
    Ok(d)
}

/// Epsilon (max pairwise log-ratio) over every non-empty subgroup.
pub fn epsilon<R: GroupRate + ?Sized>(
    samples: &SampleSet,
    rate: &R,
    config: &FairnessConfig,
) -> Result<EpsilonReport> {
    config.validate()?;
    let report = subgroup_rates(samples, rate, config)?.epsilon(config.zero_rate_floor);
    log::debug!(
        "{} epsilon over {} subgroups ({} skipped, {} floored): {:?}",
        report.rate,
        report.rates.len(),
        report.skipped.len(),
        report.floored.len(),
        report.epsilon
    );
    Ok(report)
}
