//! L1-regularized logistic regression by coordinate-wise Newton steps.
//!
//! The curvature term is `Σ v² · e^E / (e^E)²`, i.e. `Σ v² · e^-E`, not the
//! logistic Hessian diagonal `Σ v² · e^E / (e^E + 1)²`. It is kept as is.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{check_nonzero, check_positive, Result};
use crate::loss::{energy, sigmoid};
use crate::model::Model;
use crate::observer::Observer;
use crate::problem::Problem;

/// Per-feature derivative sums from one pass over a problem.
#[derive(Clone, Debug)]
pub struct Derivatives<K>
where
    K: Eq + Hash,
{
    first: HashMap<K, f64>,
    second: HashMap<K, f64>,
}

impl<K> Derivatives<K>
where
    K: Eq + Hash + Clone,
{
    /// Accumulates derivatives of the summed loss at `model`.
    ///
    /// Covers exactly the features present in at least one data point.
    pub fn accumulate(prob: &Problem<K>, model: &Model<K>) -> Self {
        let mut first = HashMap::new();
        let mut second = HashMap::new();

        for (x, y) in prob.iter() {
            let e = energy(x, model);
            // e^E / (e^E + 1)
            let p = sigmoid(e);
            // e^E / (e^E)^2
            let inv_exp_e = (-e).exp();
            let label = if y { 1.0 } else { 0.0 };

            for (key, value) in x.iter() {
                let d1 = -label * value + value * p;
                let d2 = value * value * inv_exp_e;
                *first.entry(key.clone()).or_insert(0.0) += d1;
                *second.entry(key.clone()).or_insert(0.0) += d2;
            }
        }

        Self { first, second }
    }
}

impl<K> Derivatives<K>
where
    K: Eq + Hash,
{
    pub fn first(&self, key: &K) -> f64 {
        self.first.get(key).copied().unwrap_or(0.0)
    }

    pub fn second(&self, key: &K) -> f64 {
        self.second.get(key).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.first.len()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_empty()
    }
}

fn same_sign(a: f64, b: f64) -> bool {
    (a > 0.0) == (b > 0.0)
}

/// One soft-thresholded Newton step for a single weight.
///
/// Returns the new weight (zero when the feature is dropped or stays
/// inactive) and the step length, or `None` for the step when no step was
/// taken.
fn update_coordinate(current: f64, g: f64, h: f64, l1: f64) -> (f64, Option<f64>) {
    if h == 0.0 {
        return (current, None);
    }

    if current > 0.0 || current < 0.0 {
        let diff = if current > 0.0 {
            (g + l1) / h
        } else {
            (g - l1) / h
        };
        let new = current - diff;
        let new = if same_sign(new, current) { new } else { 0.0 };
        return (new, Some(diff.abs()));
    }

    let diff = if g > l1 {
        (g - l1) / h
    } else if g < -l1 {
        (g + l1) / h
    } else {
        return (0.0, None);
    };
    (current - diff, Some(diff.abs()))
}

/// Runs one full iteration from `model`.
///
/// Returns the next model and the largest step taken by any feature.
pub fn batch_step<K>(prob: &Problem<K>, l1: f64, model: &Model<K>) -> (Model<K>, f64)
where
    K: Eq + Hash + Clone,
{
    let derivs = Derivatives::accumulate(prob, model);

    let mut max_distance = 0.0f64;
    let mut ws = HashMap::new();
    for (key, &g) in &derivs.first {
        let (w, step) = update_coordinate(model.weight(key), g, derivs.second(key), l1);
        if let Some(step) = step {
            max_distance = max_distance.max(step);
        }
        if w != 0.0 {
            ws.insert(key.clone(), w);
        }
    }

    (Model { ws }, max_distance)
}

/// How a training run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// The largest step fell below the convergence threshold.
    Converged { iterations: usize },
    /// The iteration budget ran out first. The last model is still returned.
    Exhausted { iterations: usize },
}

impl Outcome {
    pub fn iterations(&self) -> usize {
        match *self {
            Outcome::Converged { iterations } | Outcome::Exhausted { iterations } => iterations,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Outcome::Converged { .. })
    }
}

/// Progress after one iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub iteration: usize,
    pub max_distance: f64,
}

#[derive(Clone, Debug)]
pub struct Trained<K>
where
    K: Eq + Hash,
{
    pub model: Model<K>,
    pub outcome: Outcome,
}

#[derive(Clone, Debug)]
pub struct L1rLrSolver {
    pub(crate) l1: f64,
    pub(crate) convergence: f64,
    pub(crate) max_iters: usize,
}

impl L1rLrSolver {
    /// Creates a solver.
    ///
    /// `l1` and `convergence` must be finite and positive, `max_iters` at
    /// least one.
    pub fn new(l1: f64, convergence: f64, max_iters: usize) -> Result<Self> {
        check_positive("l1", l1)?;
        check_positive("convergence", convergence)?;
        check_nonzero("max_iters", max_iters)?;
        Ok(Self {
            l1,
            convergence,
            max_iters,
        })
    }

    /// Iterates from the all-zero model.
    ///
    /// Yields one [`Step`] per iteration and stops after the first step
    /// below the convergence threshold or after `max_iters` steps.
    pub fn solve<'a, K>(&'a self, prob: &'a Problem<K>) -> L1rLrSolverIter<'a, K>
    where
        K: Eq + Hash + Clone,
    {
        L1rLrSolverIter {
            solver: self,
            prob,
            model: Model::new(),
            iteration: 0,
            converged: false,
        }
    }

    /// Runs [`solve`](Self::solve) to completion, reporting to `observer`.
    pub fn train<K, O>(&self, prob: &Problem<K>, mut observer: O) -> Trained<K>
    where
        K: Eq + Hash + Clone,
        O: Observer,
    {
        let mut iter = self.solve(prob);
        let mut outcome = Outcome::Exhausted {
            iterations: self.max_iters,
        };
        for step in iter.by_ref() {
            observer.on_iteration(step.iteration, step.max_distance);
            if step.max_distance < self.convergence {
                outcome = Outcome::Converged {
                    iterations: step.iteration + 1,
                };
            }
        }

        let trained = Trained {
            model: iter.into_model(),
            outcome,
        };
        observer.on_finish(&trained.outcome);
        trained
    }
}

pub struct L1rLrSolverIter<'a, K>
where
    K: Eq + Hash,
{
    solver: &'a L1rLrSolver,
    prob: &'a Problem<K>,
    model: Model<K>,
    iteration: usize,
    converged: bool,
}

impl<'a, K> L1rLrSolverIter<'a, K>
where
    K: Eq + Hash,
{
    /// The model after the latest step, the zero model before the first.
    pub fn model(&self) -> &Model<K> {
        &self.model
    }

    pub fn into_model(self) -> Model<K> {
        self.model
    }
}

impl<'a, K> Iterator for L1rLrSolverIter<'a, K>
where
    K: Eq + Hash + Clone,
{
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        if self.converged || self.iteration >= self.solver.max_iters {
            return None;
        }

        let (model, max_distance) = batch_step(self.prob, self.solver.l1, &self.model);
        let step = Step {
            iteration: self.iteration,
            max_distance,
        };

        self.model = model;
        self.iteration += 1;
        self.converged = max_distance < self.solver.convergence;
        Some(step)
    }
}

/// Trains a model with the given L1 strength.
///
/// Running out of iterations is not an error; the last model is returned
/// and the observer is told via [`Observer::on_finish`].
pub fn batch_compute<K, O>(
    prob: &Problem<K>,
    l1: f64,
    convergence: f64,
    max_iters: usize,
    observer: O,
) -> Result<Model<K>>
where
    K: Eq + Hash + Clone,
    O: Observer,
{
    let solver = L1rLrSolver::new(l1, convergence, max_iters)?;
    Ok(solver.train(prob, observer).model)
}
