//! Subgroup keys, membership masks and intersectional enumeration.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FairnessError, Result};
use crate::samples::{AttributeValue, SampleSet};

/// Separator placed between attribute values in a subgroup label.
pub const DEFAULT_LABEL_SEPARATOR: &str = "_";

/// Label rendered for the key with no attributes.
pub const WHOLE_POPULATION_LABEL: &str = "all";

/// Enumerations larger than this are logged as a warning when uncapped.
const LARGE_ENUMERATION: usize = 10_000;

/// One cell of the attribute cartesian product.
///
/// Pairs are kept sorted by attribute name; a name appears at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "Vec<(String, AttributeValue)>")]
pub struct SubgroupKey(Vec<(String, AttributeValue)>);

impl From<Vec<(String, AttributeValue)>> for SubgroupKey {
    fn from(pairs: Vec<(String, AttributeValue)>) -> Self {
        Self::from_pairs(pairs)
    }
}

impl SubgroupKey {
    /// The whole population.
    pub fn all() -> Self {
        Self(Vec::new())
    }

    pub fn single(name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self(vec![(name.into(), value.into())])
    }

    /// Build from (name, value) pairs in any order. A repeated name keeps the last value.
    pub fn from_pairs<N, V, I>(pairs: I) -> Self
    where
        N: Into<String>,
        V: Into<AttributeValue>,
        I: IntoIterator<Item = (N, V)>,
    {
        let map: BTreeMap<String, AttributeValue> = pairs
            .into_iter()
            .map(|(n, v)| (n.into(), v.into()))
            .collect();
        Self(map.into_iter().collect())
    }

    /// Add or replace one attribute constraint.
    pub fn and(self, name: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        Self::from_pairs(self.0.into_iter().chain(std::iter::once((name.into(), value.into()))))
    }

    pub fn pairs(&self) -> &[(String, AttributeValue)] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Values joined by `_` in attribute-name order, e.g. `F_older`.
    pub fn label(&self) -> String {
        self.label_with(DEFAULT_LABEL_SEPARATOR)
    }

    pub fn label_with(&self, separator: &str) -> String {
        if self.0.is_empty() {
            return WHOLE_POPULATION_LABEL.to_string();
        }
        self.0
            .iter()
            .map(|(_, v)| v.to_string())
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl fmt::Display for SubgroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str(WHOLE_POPULATION_LABEL);
        }
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str("|")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Labels for `keys`, one per key and pairwise distinct.
///
/// Values may themselves contain the separator, so two keys can render the
/// same label. Every key sharing a label falls back to its `name=value`
/// rendering instead, and anything still clashing gets a `#n` suffix.
pub fn unique_labels(keys: &[SubgroupKey]) -> Vec<String> {
    let plain: Vec<String> = keys.iter().map(SubgroupKey::label).collect();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for label in &plain {
        *counts.entry(label.as_str()).or_insert(0) += 1;
    }

    let mut used: HashSet<String> = HashSet::new();
    let mut labels = Vec::with_capacity(keys.len());
    for (key, label) in keys.iter().zip(&plain) {
        let mut candidate = if counts[label.as_str()] > 1 {
            log::warn!("subgroup label {label:?} is shared; using {key}");
            key.to_string()
        } else {
            label.clone()
        };
        if used.contains(&candidate) {
            let base = candidate;
            let mut n = 2;
            candidate = format!("{base}#{n}");
            while used.contains(&candidate) {
                n += 1;
                candidate = format!("{base}#{n}");
            }
        }
        used.insert(candidate.clone());
        labels.push(candidate);
    }
    labels
}

/// Mask of the samples matching every (name, value) constraint.
///
/// No constraints selects all `n_samples` samples.
pub fn membership(
    filters: &[(String, AttributeValue)],
    columns: &BTreeMap<String, Vec<AttributeValue>>,
    n_samples: usize,
) -> Result<Vec<bool>> {
    let mut mask = vec![true; n_samples];
    for (name, value) in filters {
        let column = columns
            .get(name)
            .ok_or_else(|| FairnessError::UnknownAttribute(name.clone()))?;
        if column.len() != n_samples {
            return Err(FairnessError::shape(name.clone(), n_samples, column.len()));
        }
        for (m, v) in mask.iter_mut().zip(column) {
            *m = *m && v == value;
        }
    }
    Ok(mask)
}

/// Sorted distinct values of every attribute column.
pub fn attribute_domains(
    columns: &BTreeMap<String, Vec<AttributeValue>>,
) -> BTreeMap<String, Vec<AttributeValue>> {
    columns
        .iter()
        .map(|(name, column)| {
            let domain: BTreeSet<&AttributeValue> = column.iter().collect();
            (name.clone(), domain.into_iter().cloned().collect())
        })
        .collect()
}

/// Number of cells in the cartesian product of the domains.
pub fn subgroup_count(domains: &BTreeMap<String, Vec<AttributeValue>>) -> usize {
    domains
        .values()
        .map(Vec::len)
        .try_fold(1usize, |acc, n| acc.checked_mul(n))
        .unwrap_or(usize::MAX)
}

/// Every combination of observed attribute values, one key per combination.
///
/// Attributes are taken in name order with the first varying slowest. The
/// result size is the product of the domain sizes, so it grows exponentially
/// with the number of attributes and many cells can be empty when attributes
/// are combined.
pub fn enumerate_subgroups(columns: &BTreeMap<String, Vec<AttributeValue>>) -> Vec<SubgroupKey> {
    let domains = attribute_domains(columns);
    let count = subgroup_count(&domains);
    log::debug!(
        "enumerating {count} subgroups over {} attribute(s)",
        domains.len()
    );
    if count > LARGE_ENUMERATION {
        log::warn!("subgroup enumeration produces {count} cells; most may be empty");
    }

    let mut keys: Vec<Vec<(String, AttributeValue)>> = vec![Vec::new()];
    for (name, domain) in &domains {
        keys = keys
            .into_iter()
            .flat_map(|prefix| {
                domain.iter().map(move |value| {
                    let mut key = prefix.clone();
                    key.push((name.clone(), value.clone()));
                    key
                })
            })
            .collect();
    }
    keys.into_iter().map(SubgroupKey).collect()
}

/// Like [`enumerate_subgroups`], failing when the product exceeds `limit`.
pub fn enumerate_subgroups_capped(
    columns: &BTreeMap<String, Vec<AttributeValue>>,
    limit: Option<usize>,
) -> Result<Vec<SubgroupKey>> {
    if let Some(limit) = limit {
        let count = subgroup_count(&attribute_domains(columns));
        if count > limit {
            return Err(FairnessError::TooManySubgroups { count, limit });
        }
    }
    Ok(enumerate_subgroups(columns))
}

impl SampleSet {
    /// Membership mask of `key` over this sample set.
    pub fn membership(&self, key: &SubgroupKey) -> Result<Vec<bool>> {
        membership(key.pairs(), self.attributes(), self.len())
    }

    pub fn subgroups(&self) -> Vec<SubgroupKey> {
        enumerate_subgroups(self.attributes())
    }

    /// Number of samples in `key`.
    pub fn subgroup_size(&self, key: &SubgroupKey) -> Result<usize> {
        Ok(self.membership(key)?.into_iter().filter(|&m| m).count())
    }
}
