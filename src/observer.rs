//! Progress reporting for the solver and the tuner.

use crate::l1r_lr::Outcome;
use crate::tuner::Trial;

/// Receives progress events. Every method defaults to doing nothing.
///
/// Observers only watch; nothing they do changes the returned models.
pub trait Observer {
    fn on_iteration(&mut self, _iteration: usize, _max_distance: f64) {}

    fn on_finish(&mut self, _outcome: &Outcome) {}

    fn on_trial(&mut self, _trial: &Trial) {}
}

impl<O> Observer for &mut O
where
    O: Observer + ?Sized,
{
    fn on_iteration(&mut self, iteration: usize, max_distance: f64) {
        (**self).on_iteration(iteration, max_distance);
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        (**self).on_finish(outcome);
    }

    fn on_trial(&mut self, trial: &Trial) {
        (**self).on_trial(trial);
    }
}

/// Discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct Silent;

impl Observer for Silent {}

/// Forwards events to the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_iteration(&mut self, iteration: usize, max_distance: f64) {
        log::debug!("Iteration {}, Dist: {}", iteration, max_distance);
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Converged { iterations } => {
                log::info!("Converged after {} iterations", iterations)
            }
            Outcome::Exhausted { iterations } => {
                log::info!("Convergence did not occur in {} iterations", iterations)
            }
        }
    }

    fn on_trial(&mut self, trial: &Trial) {
        log::debug!(
            "Tried L1: {}, loss: {}, accepted? {}",
            trial.l1,
            trial.loss,
            trial.accepted
        );
    }
}
