//! Greedy random walk on `ln(L1)` scored by held-out loss.

use std::hash::Hash;

use rand::Rng;
use rand_distr::StandardNormal;

use crate::error::{check_nonzero, check_positive, Result};
use crate::l1r_lr::L1rLrSolver;
use crate::loss::compute_loss_for_dataset;
use crate::observer::{Observer, Silent};
use crate::problem::Problem;

#[derive(Clone, Debug)]
pub struct TunerConfig {
    /// Number of proposals to evaluate.
    pub trials: usize,
    /// Convergence threshold for each inner training run.
    pub convergence: f64,
    /// Iteration budget for each inner training run.
    pub max_iters: usize,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            trials: 40,
            convergence: 1e-6,
            max_iters: 100,
        }
    }
}

/// One evaluated proposal.
#[derive(Clone, Debug, PartialEq)]
pub struct Trial {
    pub index: usize,
    pub l1: f64,
    pub loss: f64,
    pub accepted: bool,
}

#[derive(Clone, Debug)]
pub struct TuningReport {
    /// Best L1 strength found, `1.0` if no trial was accepted.
    pub l1: f64,
    /// Held-out loss at `l1`, infinite if no trial was accepted.
    pub loss: f64,
    pub trials: Vec<Trial>,
}

pub struct RandomWalkTuner {
    config: TunerConfig,
}

impl RandomWalkTuner {
    pub fn new(config: TunerConfig) -> Result<Self> {
        check_nonzero("trials", config.trials)?;
        check_positive("convergence", config.convergence)?;
        check_nonzero("max_iters", config.max_iters)?;
        Ok(Self { config })
    }

    /// Runs the search. Inner training runs are not reported to `observer`;
    /// only [`Observer::on_trial`] is called, once per proposal.
    pub fn tune<K, R, O>(
        &self,
        train: &Problem<K>,
        test: &Problem<K>,
        rng: &mut R,
        mut observer: O,
    ) -> TuningReport
    where
        K: Eq + Hash + Clone,
        R: Rng + ?Sized,
        O: Observer,
    {
        let mut best_log_l1 = 0.0f64;
        let mut best_loss = f64::INFINITY;
        let mut trials = Vec::with_capacity(self.config.trials);

        for index in 0..self.config.trials {
            let noise: f64 = rng.sample(StandardNormal);
            let log_l1 = best_log_l1 + noise;
            let l1 = log_l1.exp();
            let loss = self.evaluate(train, test, l1);

            let accepted = loss < best_loss;
            let trial = Trial {
                index,
                l1,
                loss,
                accepted,
            };
            observer.on_trial(&trial);
            trials.push(trial);

            if accepted {
                best_loss = loss;
                best_log_l1 = log_l1;
            }
        }

        TuningReport {
            l1: best_log_l1.exp(),
            loss: best_loss,
            trials,
        }
    }

    /// Held-out loss after training with `l1`. A strength the solver rejects
    /// (zero after underflow, infinite after overflow) scores infinity, so
    /// the trial is never accepted.
    fn evaluate<K>(&self, train: &Problem<K>, test: &Problem<K>, l1: f64) -> f64
    where
        K: Eq + Hash + Clone,
    {
        match L1rLrSolver::new(l1, self.config.convergence, self.config.max_iters) {
            Ok(solver) => {
                let model = solver.train(train, Silent).model;
                compute_loss_for_dataset(test, &model)
            }
            Err(err) => {
                log::debug!("Skipping L1 {}: {}", l1, err);
                f64::INFINITY
            }
        }
    }
}

/// Searches for the L1 strength with the lowest held-out loss using 40
/// random-walk trials.
pub fn find_optimal_l1_regularizer<K, R, O>(
    train: &Problem<K>,
    test: &Problem<K>,
    convergence: f64,
    max_iters: usize,
    rng: &mut R,
    observer: O,
) -> Result<f64>
where
    K: Eq + Hash + Clone,
    R: Rng + ?Sized,
    O: Observer,
{
    let tuner = RandomWalkTuner::new(TunerConfig {
        convergence,
        max_iters,
        ..TunerConfig::default()
    })?;
    Ok(tuner.tune(train, test, rng, observer).l1)
}
