//! Named two-group fairness measures.

use crate::disparity::{group_rate, pairwise_difference};
use crate::error::Result;
use crate::rates::Rate;
use crate::samples::SampleSet;
use crate::subgroup::SubgroupKey;

/// Equal opportunity difference: `|TPR(a) - TPR(b)|`.
pub fn equal_opportunity_difference(
    samples: &SampleSet,
    a: &SubgroupKey,
    b: &SubgroupKey,
) -> Result<Option<f64>> {
    pairwise_difference(samples, &Rate::Tpr, a, b)
}

/// Average odds difference:
/// `((FPR_u - FPR_p) + (TPR_u - TPR_p)) / 2`.
///
/// Signed; negative when the unprivileged group fares worse on both rates.
pub fn average_odds_difference(
    samples: &SampleSet,
    unprivileged: &SubgroupKey,
    privileged: &SubgroupKey,
) -> Result<Option<f64>> {
    let fpr_u = group_rate(samples, &Rate::Fpr, unprivileged)?;
    let fpr_p = group_rate(samples, &Rate::Fpr, privileged)?;
    let tpr_u = group_rate(samples, &Rate::Tpr, unprivileged)?;
    let tpr_p = group_rate(samples, &Rate::Tpr, privileged)?;

    let aod = match (fpr_u, fpr_p, tpr_u, tpr_p) {
        (Some(fu), Some(fp), Some(tu), Some(tp)) => Some(((fu - fp) + (tu - tp)) / 2.0),
        _ => None,
    };
    log::debug!("average odds difference {unprivileged} vs {privileged}: {aod:?}");
    Ok(aod)
}

/// Disparate impact: selection rate of `unprivileged` over that of `privileged`.
///
/// Directional, unlike [`crate::disparity::Disparity::Ratio`]. Undefined when
/// the privileged selection rate is zero.
pub fn disparate_impact(
    samples: &SampleSet,
    unprivileged: &SubgroupKey,
    privileged: &SubgroupKey,
) -> Result<Option<f64>> {
    let sr_u = group_rate(samples, &Rate::SelectionRate, unprivileged)?;
    let sr_p = group_rate(samples, &Rate::SelectionRate, privileged)?;
    let di = match (sr_u, sr_p) {
        (Some(u), Some(p)) if p > 0.0 => Some(u / p),
        _ => None,
    };
    log::debug!("disparate impact {unprivileged} vs {privileged}: {di:?}");
    Ok(di)
}
