//! Confusion-matrix counts over a masked subset of samples.

use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{FairnessError, Result};

/// True/false positive/negative counts for one subset of samples.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionTally {
    pub tp: usize,
    pub fp: usize,
    pub tn: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
}

impl ConfusionTally {
    pub fn new(tp: usize, fp: usize, tn: usize, fn_: usize) -> Self {
        Self { tp, fp, tn, fn_ }
    }

    /// Tally unmasked (prediction, label) pairs.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (bool, bool)>,
    {
        let mut t = Self::default();
        for (pred, label) in pairs {
            t.record(pred, label);
        }
        t
    }

    fn record(&mut self, pred: bool, label: bool) {
        match (pred, label) {
            (true, true) => self.tp += 1,
            (true, false) => self.fp += 1,
            (false, true) => self.fn_ += 1,
            (false, false) => self.tn += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.fp + self.tn + self.fn_
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    pub fn correct(&self) -> usize {
        self.tp + self.tn
    }

    pub fn predicted_positive(&self) -> usize {
        self.tp + self.fp
    }

    pub fn predicted_negative(&self) -> usize {
        self.tn + self.fn_
    }

    pub fn actual_positive(&self) -> usize {
        self.tp + self.fn_
    }

    pub fn actual_negative(&self) -> usize {
        self.tn + self.fp
    }
}

impl Add for ConfusionTally {
    type Output = ConfusionTally;

    fn add(self, rhs: ConfusionTally) -> ConfusionTally {
        ConfusionTally {
            tp: self.tp + rhs.tp,
            fp: self.fp + rhs.fp,
            tn: self.tn + rhs.tn,
            fn_: self.fn_ + rhs.fn_,
        }
    }
}

/// Count outcomes over the samples where `mask` is set.
///
/// All three slices must share a length. An all-false mask yields an empty
/// tally; callers check [`ConfusionTally::is_empty`] before dividing.
pub fn tally(predictions: &[bool], true_statuses: &[bool], mask: &[bool]) -> Result<ConfusionTally> {
    let n = predictions.len();
    if true_statuses.len() != n {
        return Err(FairnessError::shape("true_statuses", n, true_statuses.len()));
    }
    if mask.len() != n {
        return Err(FairnessError::shape("mask", n, mask.len()));
    }

    let mut t = ConfusionTally::default();
    for ((&pred, &label), &keep) in predictions.iter().zip(true_statuses).zip(mask) {
        if keep {
            t.record(pred, label);
        }
    }
    Ok(t)
}
