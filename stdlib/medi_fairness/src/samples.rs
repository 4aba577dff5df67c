//! Columnar sample sets: predictions, ground truth and protected attributes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{FairnessError, Result};

/// A categorical attribute value (sex, age band, site, ...).
///
/// Values order by variant first, then naturally within a variant, so an
/// attribute domain always sorts the same way.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Int(i64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(v) => write!(f, "{v}"),
            AttributeValue::Text(v) => f.write_str(v),
            AttributeValue::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(v: i64) -> Self {
        AttributeValue::Int(v)
    }
}

impl From<i32> for AttributeValue {
    fn from(v: i32) -> Self {
        AttributeValue::Int(v as i64)
    }
}

impl From<bool> for AttributeValue {
    fn from(v: bool) -> Self {
        AttributeValue::Bool(v)
    }
}

impl From<&str> for AttributeValue {
    fn from(v: &str) -> Self {
        AttributeValue::Text(v.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(v: String) -> Self {
        AttributeValue::Text(v)
    }
}

/// Convert a 0/1 column into booleans, rejecting anything else.
pub fn parse_binary(column: &str, values: &[i64]) -> Result<Vec<bool>> {
    values
        .iter()
        .enumerate()
        .map(|(index, &value)| match value {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(FairnessError::InvalidBinaryValue {
                column: column.to_string(),
                index,
                value,
            }),
        })
        .collect()
}

/// Index-aligned predictions, ground truth and attribute columns.
///
/// Every column has the same length; this is checked when the set is built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleSet {
    predictions: Vec<bool>,
    true_statuses: Vec<bool>,
    attributes: BTreeMap<String, Vec<AttributeValue>>,
}

impl SampleSet {
    pub fn new(predictions: Vec<bool>, true_statuses: Vec<bool>) -> Result<Self> {
        if predictions.len() != true_statuses.len() {
            return Err(FairnessError::shape(
                "true_statuses",
                predictions.len(),
                true_statuses.len(),
            ));
        }
        Ok(Self {
            predictions,
            true_statuses,
            attributes: BTreeMap::new(),
        })
    }

    /// Build from 0/1 integer columns.
    pub fn from_binary(predictions: &[i64], true_statuses: &[i64]) -> Result<Self> {
        Self::new(
            parse_binary("predictions", predictions)?,
            parse_binary("true_statuses", true_statuses)?,
        )
    }

    /// Attach a protected attribute column.
    pub fn with_attribute<V, I>(mut self, name: impl Into<String>, values: I) -> Result<Self>
    where
        V: Into<AttributeValue>,
        I: IntoIterator<Item = V>,
    {
        let name = name.into();
        if self.attributes.contains_key(&name) {
            return Err(FairnessError::DuplicateAttribute(name));
        }
        let column: Vec<AttributeValue> = values.into_iter().map(Into::into).collect();
        if column.len() != self.len() {
            return Err(FairnessError::shape(name, self.len(), column.len()));
        }
        self.attributes.insert(name, column);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    pub fn predictions(&self) -> &[bool] {
        &self.predictions
    }

    pub fn true_statuses(&self) -> &[bool] {
        &self.true_statuses
    }

    /// Attribute columns keyed by name, in name order.
    pub fn attributes(&self) -> &BTreeMap<String, Vec<AttributeValue>> {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&[AttributeValue]> {
        self.attributes.get(name).map(Vec::as_slice)
    }

    /// Restrict the attribute columns to `names`, keeping predictions and labels.
    pub fn select_attributes(&self, names: &[&str]) -> Result<Self> {
        let mut attributes = BTreeMap::new();
        for &name in names {
            let column = self
                .attributes
                .get(name)
                .ok_or_else(|| FairnessError::UnknownAttribute(name.to_string()))?;
            attributes.insert(name.to_string(), column.clone());
        }
        Ok(Self {
            predictions: self.predictions.clone(),
            true_statuses: self.true_statuses.clone(),
            attributes,
        })
    }
}
