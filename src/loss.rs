//! Linear energy and logistic loss.

use std::hash::Hash;

use crate::model::Model;
use crate::problem::{FeatureVector, Problem};

/// Dot product of a data point with the model weights.
pub fn energy<K>(x: &FeatureVector<K>, model: &Model<K>) -> f64
where
    K: Eq + Hash,
{
    x.iter().map(|(key, value)| value * model.weight(key)).sum()
}

/// Negative log-likelihood of one labelled point.
///
/// Equals `ln(e^E + 1) - E` for a positive label and `ln(e^E + 1)` otherwise,
/// evaluated as `max(E, 0) + ln(1 + e^-|E|)` so that large energies do not
/// overflow.
pub fn compute_loss_for_datapoint<K>(x: &FeatureVector<K>, label: bool, model: &Model<K>) -> f64
where
    K: Eq + Hash,
{
    let e = energy(x, model);
    let softplus = e.max(0.0) + (-e.abs()).exp().ln_1p();
    if label {
        softplus - e
    } else {
        softplus
    }
}

/// Mean logistic loss over a problem.
pub fn compute_loss_for_dataset<K>(prob: &Problem<K>, model: &Model<K>) -> f64
where
    K: Eq + Hash,
{
    let total: f64 = prob
        .iter()
        .map(|(x, y)| compute_loss_for_datapoint(x, y, model))
        .sum();
    total / prob.len() as f64
}

/// `e^E / (e^E + 1)` without overflow.
pub(crate) fn sigmoid(e: f64) -> f64 {
    if e >= 0.0 {
        1.0 / (1.0 + (-e).exp())
    } else {
        let exp_e = e.exp();
        exp_e / (exp_e + 1.0)
    }
}
