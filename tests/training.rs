//! End-to-end behaviour of the solver on small hand-built problems.

use approx::assert_abs_diff_eq;
use l1logit::{
    batch_compute, batch_step, compute_loss_for_dataset, Derivatives, FeatureVector, L1rLrSolver,
    Model, Observer, Outcome, Problem, Silent,
};
use rstest::rstest;

fn problem(points: &[(&[(&'static str, f64)], bool)]) -> Problem<&'static str> {
    let xs = points
        .iter()
        .map(|(x, _)| x.iter().copied().collect::<FeatureVector<_>>())
        .collect();
    let ys = points.iter().map(|&(_, y)| y).collect();
    Problem::new(xs, ys).unwrap()
}

fn uninformative() -> Problem<&'static str> {
    problem(&[
        (&[("x", 1.0)], true),
        (&[("x", 1.0)], false),
        (&[("x", -1.0)], true),
        (&[("x", -1.0)], false),
    ])
}

fn noisy_single_feature() -> Problem<&'static str> {
    problem(&[
        (&[("x", 1.0)], true),
        (&[("x", 1.0)], true),
        (&[("x", 1.0)], false),
        (&[("x", -1.0)], false),
        (&[("x", -1.0)], false),
        (&[("x", -1.0)], true),
        (&[("x", 2.0)], true),
        (&[("x", -2.0)], false),
    ])
}

fn two_features() -> Problem<&'static str> {
    problem(&[
        (&[("a", 1.0), ("b", 0.5)], true),
        (&[("a", 0.5)], true),
        (&[("b", -1.0), ("a", 0.2)], false),
        (&[("a", -1.0), ("b", 1.0)], false),
        (&[("b", 0.3)], true),
        (&[("a", -0.7), ("b", -0.2)], false),
    ])
}

#[derive(Default)]
struct Recorder {
    distances: Vec<f64>,
    outcome: Option<Outcome>,
}

impl Observer for Recorder {
    fn on_iteration(&mut self, iteration: usize, max_distance: f64) {
        assert_eq!(iteration, self.distances.len());
        self.distances.push(max_distance);
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        self.outcome = Some(*outcome);
    }
}

#[test]
fn uninformative_feature_stays_at_zero() {
    let prob = uninformative();
    let mut recorder = Recorder::default();
    let model = batch_compute(&prob, 0.1, 1e-6, 100, &mut recorder).unwrap();

    assert_abs_diff_eq!(model.weight(&"x"), 0.0, epsilon = 1e-9);
    assert_eq!(recorder.outcome, Some(Outcome::Converged { iterations: 1 }));
}

#[rstest]
#[case(noisy_single_feature())]
#[case(two_features())]
fn large_l1_empties_the_model_in_one_iteration(#[case] prob: Problem<&'static str>) {
    let derivs = Derivatives::accumulate(&prob, &Model::new());
    let l1 = ["x", "a", "b"]
        .iter()
        .map(|k| derivs.first(k).abs())
        .fold(0.0, f64::max)
        + 1e-3;

    let solver = L1rLrSolver::new(l1, 1e-9, 100).unwrap();
    let trained = solver.train(&prob, Silent);
    assert!(trained.model.is_empty());
    assert_eq!(trained.outcome, Outcome::Converged { iterations: 1 });
}

#[rstest]
#[case(noisy_single_feature(), 0.1)]
#[case(two_features(), 0.05)]
fn training_loss_does_not_increase(#[case] prob: Problem<&'static str>, #[case] l1: f64) {
    let mut model = Model::new();
    let mut prev = compute_loss_for_dataset(&prob, &model);
    for _ in 0..50 {
        model = batch_step(&prob, l1, &model).0;
        let loss = compute_loss_for_dataset(&prob, &model);
        assert!(loss <= prev + 1e-12, "{} > {}", loss, prev);
        prev = loss;
    }
    assert!(prev < 2.0f64.ln());
}

#[test]
fn converged_model_is_a_fixed_point() {
    let prob = noisy_single_feature();
    let mut recorder = Recorder::default();
    let trained = L1rLrSolver::new(0.1, 1e-6, 1000)
        .unwrap()
        .train(&prob, &mut recorder);

    assert!(trained.outcome.is_converged());
    assert_eq!(trained.outcome.iterations(), recorder.distances.len());

    let (next, distance) = batch_step(&prob, 0.1, &trained.model);
    assert!(distance < 1e-6);
    assert_abs_diff_eq!(next.weight(&"x"), trained.model.weight(&"x"), epsilon = 1e-6);

    // Stationarity of the L1 objective for a positive weight: g + L1 = 0.
    let w = trained.model.weight(&"x");
    assert!(w > 0.0);
    let derivs = Derivatives::accumulate(&prob, &trained.model);
    assert_abs_diff_eq!(derivs.first(&"x"), -0.1, epsilon = 1e-4);
}

#[test]
fn stronger_l1_gives_smaller_weights() {
    let prob = two_features();
    let weak = batch_compute(&prob, 0.05, 1e-6, 200, Silent).unwrap();
    let strong = batch_compute(&prob, 0.5, 1e-6, 200, Silent).unwrap();

    let norm = |m: &Model<&str>| m.iter().map(|(_, w)| w.abs()).sum::<f64>();
    assert!(norm(&strong) < norm(&weak));
}

#[test]
fn weights_only_move_towards_zero_without_crossing() {
    let prob = noisy_single_feature();
    let mut model: Model<&str> = vec![("x", 0.05)].into_iter().collect();
    // A huge L1 drives the positive weight down; it must land on zero, never below.
    for _ in 0..5 {
        model = batch_step(&prob, 50.0, &model).0;
        assert!(model.weight(&"x") >= 0.0);
    }
    assert!(model.is_empty());
}

#[test]
fn invalid_settings_are_rejected() {
    let prob = uninformative();
    assert!(batch_compute(&prob, -0.1, 1e-6, 10, Silent).is_err());
    assert!(batch_compute(&prob, 0.1, 0.0, 10, Silent).is_err());
    assert!(batch_compute(&prob, 0.1, 1e-6, 0, Silent).is_err());
}
