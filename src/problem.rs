use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{Error, Result};

#[derive(Clone, Debug)]
pub struct Feature<K> {
    pub(crate) key: K,
    pub(crate) value: f64,
}

impl<K> Feature<K> {
    pub const fn new(key: K, value: f64) -> Self {
        Self { key, value }
    }
}

/// Sparse data point. A key that is not stored has value zero.
///
/// Repeated keys are summed on construction and zero entries are not stored.
#[derive(Clone, Debug, PartialEq)]
pub struct FeatureVector<K>
where
    K: Eq + Hash,
{
    values: HashMap<K, f64>,
}

impl<K> FeatureVector<K>
where
    K: Eq + Hash,
{
    pub fn get(&self, key: &K) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.values.iter().map(|(k, &v)| (k, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn is_finite(&self) -> bool {
        self.values.values().all(|v| v.is_finite())
    }
}

impl<K> Default for FeatureVector<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self {
            values: HashMap::new(),
        }
    }
}

impl<K> FromIterator<(K, f64)> for FeatureVector<K>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        let mut values = HashMap::new();
        for (key, value) in iter {
            *values.entry(key).or_insert(0.0) += value;
        }
        values.retain(|_, v| *v != 0.0);
        Self { values }
    }
}

impl<K> FromIterator<Feature<K>> for FeatureVector<K>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = Feature<K>>>(iter: I) -> Self {
        iter.into_iter().map(|f| (f.key, f.value)).collect()
    }
}

/// Labelled training or evaluation data.
pub struct Problem<K>
where
    K: Eq + Hash,
{
    pub(crate) xs: Vec<FeatureVector<K>>,
    pub(crate) ys: Vec<bool>,
}

impl<K> Problem<K>
where
    K: Eq + Hash,
{
    /// Builds a problem from data points and their labels.
    ///
    /// Fails if the two sequences differ in length, if there are no points,
    /// or if any feature value is NaN or infinite.
    pub fn new(xs: Vec<FeatureVector<K>>, ys: Vec<bool>) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(Error::LengthMismatch {
                points: xs.len(),
                labels: ys.len(),
            });
        }
        if xs.is_empty() {
            return Err(Error::EmptyDataset);
        }
        if let Some(row) = xs.iter().position(|x| !x.is_finite()) {
            return Err(Error::NonFiniteFeature { row });
        }
        Ok(Self { xs, ys })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Always false: construction rejects empty datasets.
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureVector<K>, bool)> {
        self.xs.iter().zip(self.ys.iter().copied())
    }
}
