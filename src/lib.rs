mod error;
mod l1r_lr;
mod loss;
mod model;
mod observer;
mod problem;
mod tuner;

pub use crate::error::{Error, Result};
pub use crate::l1r_lr::{
    batch_compute, batch_step, Derivatives, L1rLrSolver, L1rLrSolverIter, Outcome, Step, Trained,
};
pub use crate::loss::{compute_loss_for_datapoint, compute_loss_for_dataset, energy};
pub use crate::model::Model;
pub use crate::observer::{LogObserver, Observer, Silent};
pub use crate::problem::{Feature, FeatureVector, Problem};
pub use crate::tuner::{
    find_optimal_l1_regularizer, RandomWalkTuner, Trial, TunerConfig, TuningReport,
};
