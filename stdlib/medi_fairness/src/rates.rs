//! Confusion-matrix rates.
//!
//! Every rate shares the same skeleton: select a subgroup, tally it, divide.
//! [`GroupRate`] captures the divide step (plus an optional prediction slice)
//! so subgroup iteration and disparity aggregation are written once.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::confusion::{tally, ConfusionTally};
use crate::error::{FairnessError, Result};

/// A rate in `[0, 1]`, or `None` when the subgroup is empty or the
/// denominator is zero. Undefined is never coerced to zero.
pub type RateValue = Option<f64>;

fn ratio(numerator: usize, denominator: usize) -> RateValue {
    if denominator == 0 {
        None
    } else {
        Some(numerator as f64 / denominator as f64)
    }
}

/// A tally-to-rate formula.
pub trait GroupRate: Send + Sync {
    /// Short identifier used in logs and reports
    fn name(&self) -> &str;

    /// When set, only samples with this prediction are tallied.
    fn restrict_to(&self) -> Option<bool> {
        None
    }

    fn rate_from_tally(&self, tally: &ConfusionTally) -> RateValue;

    /// Slice (if required), tally and divide over the masked samples.
    fn compute(&self, predictions: &[bool], true_statuses: &[bool], mask: &[bool]) -> Result<RateValue> {
        let t = sliced_tally(self, predictions, true_statuses, mask)?;
        Ok(self.rate_from_tally(&t))
    }
}

/// The tally `rate` divides: the masked samples, narrowed to one predicted
/// class first when the rate requires it.
pub fn sliced_tally<R: GroupRate + ?Sized>(
    rate: &R,
    predictions: &[bool],
    true_statuses: &[bool],
    mask: &[bool],
) -> Result<ConfusionTally> {
    match rate.restrict_to() {
        Some(class) => {
            if mask.len() != predictions.len() {
                return Err(FairnessError::shape("mask", predictions.len(), mask.len()));
            }
            let sliced: Vec<bool> = mask
                .iter()
                .zip(predictions)
                .map(|(&keep, &pred)| keep && pred == class)
                .collect();
            tally(predictions, true_statuses, &sliced)
        }
        None => tally(predictions, true_statuses, mask),
    }
}

/// Built-in rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rate {
    Accuracy,
    /// True positive rate (recall, sensitivity)
    Tpr,
    /// True negative rate (specificity)
    Tnr,
    Fpr,
    Fnr,
    /// Error rate among samples predicted negative.
    FalseOmission,
    /// Error rate among samples predicted positive.
    FalseDiscovery,
    /// Precision
    Ppv,
    Npv,
    /// Share of samples predicted positive.
    SelectionRate,
}

impl Rate {
    pub const ALL: [Rate; 10] = [
        Rate::Accuracy,
        Rate::Tpr,
        Rate::Tnr,
        Rate::Fpr,
        Rate::Fnr,
        Rate::FalseOmission,
        Rate::FalseDiscovery,
        Rate::Ppv,
        Rate::Npv,
        Rate::SelectionRate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Rate::Accuracy => "accuracy",
            Rate::Tpr => "tpr",
            Rate::Tnr => "tnr",
            Rate::Fpr => "fpr",
            Rate::Fnr => "fnr",
            Rate::FalseOmission => "for",
            Rate::FalseDiscovery => "fdr",
            Rate::Ppv => "ppv",
            Rate::Npv => "npv",
            Rate::SelectionRate => "selection_rate",
        }
    }
}

impl GroupRate for Rate {
    fn name(&self) -> &str {
        self.as_str()
    }

    fn restrict_to(&self) -> Option<bool> {
        match self {
            Rate::FalseOmission => Some(false),
            Rate::FalseDiscovery => Some(true),
            _ => None,
        }
    }

    fn rate_from_tally(&self, t: &ConfusionTally) -> RateValue {
        match self {
            Rate::Accuracy => ratio(t.correct(), t.total()),
            Rate::Tpr => ratio(t.tp, t.actual_positive()),
            Rate::Tnr => ratio(t.tn, t.actual_negative()),
            Rate::Fpr => ratio(t.fp, t.actual_negative()),
            Rate::Fnr => ratio(t.fn_, t.actual_positive()),
            // Within the predicted-negative slice every error is a false
            // negative, so this equals the slice's error rate.
            Rate::FalseOmission => ratio(t.fn_, t.predicted_negative()),
            Rate::FalseDiscovery => ratio(t.fp, t.predicted_positive()),
            Rate::Ppv => ratio(t.tp, t.predicted_positive()),
            Rate::Npv => ratio(t.tn, t.predicted_negative()),
            Rate::SelectionRate => ratio(t.predicted_positive(), t.total()),
        }
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Rate {
    type Err = FairnessError;

    fn from_str(s: &str) -> Result<Self> {
        let rate = match s.to_ascii_lowercase().as_str() {
            "accuracy" | "acc" => Rate::Accuracy,
            "tpr" | "recall" | "sensitivity" => Rate::Tpr,
            "tnr" | "specificity" => Rate::Tnr,
            "fpr" => Rate::Fpr,
            "fnr" => Rate::Fnr,
            "for" | "false_omission" => Rate::FalseOmission,
            "fdr" | "false_discovery" => Rate::FalseDiscovery,
            "ppv" | "precision" => Rate::Ppv,
            "npv" => Rate::Npv,
            "selection_rate" | "positive_rate" => Rate::SelectionRate,
            _ => return Err(FairnessError::UnknownRate(s.to_string())),
        };
        Ok(rate)
    }
}
