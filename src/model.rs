use std::collections::HashMap;
use std::hash::Hash;

use crate::loss::{energy, sigmoid};
use crate::problem::FeatureVector;

/// Sparse weight vector. Features without a stored weight have weight zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Model<K>
where
    K: Eq + Hash,
{
    pub(crate) ws: HashMap<K, f64>,
}

impl<K> Model<K>
where
    K: Eq + Hash,
{
    /// The all-zero model.
    pub fn new() -> Self {
        Self { ws: HashMap::new() }
    }

    pub fn get_weight(&self, key: &K) -> Option<f64> {
        self.ws.get(key).copied()
    }

    pub fn weight(&self, key: &K) -> f64 {
        self.get_weight(key).unwrap_or(0.0)
    }

    pub fn num_nonzero(&self) -> usize {
        self.ws.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ws.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, f64)> {
        self.ws.iter().map(|(k, &w)| (k, w))
    }

    /// Probability of a positive label under the logistic link.
    pub fn predict_probability(&self, x: &FeatureVector<K>) -> f64 {
        sigmoid(energy(x, self))
    }
}

impl<K> Default for Model<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FromIterator<(K, f64)> for Model<K>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            ws: iter.into_iter().filter(|&(_, w)| w != 0.0).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn absent_weights_are_zero() {
        let model: Model<&str> = vec![("a", 2.0), ("b", 0.0)].into_iter().collect();
        assert_eq!(model.num_nonzero(), 1);
        assert_eq!(model.get_weight(&"b"), None);
        assert_eq!(model.weight(&"b"), 0.0);
        assert_eq!(model.weight(&"a"), 2.0);
    }

    #[test]
    fn predicts_probabilities() {
        let model: Model<&str> = vec![("a", 2.0)].into_iter().collect();
        let x: FeatureVector<&str> = vec![("a", 1.0)].into_iter().collect();
        assert_abs_diff_eq!(
            model.predict_probability(&x),
            1.0 / (1.0 + (-2.0f64).exp()),
            epsilon = 1e-12
        );
        assert_abs_diff_eq!(
            Model::new().predict_probability(&x),
            0.5,
            epsilon = 1e-12
        );

        let far: FeatureVector<&str> = vec![("a", -1000.0)].into_iter().collect();
        assert_eq!(model.predict_probability(&far), 0.0);
    }
}
