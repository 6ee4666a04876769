use std::io::{self, BufRead, Write};

use clap::Parser;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use l1logit::{
    compute_loss_for_dataset, Feature, FeatureVector, L1rLrSolver, Observer, Outcome, Problem,
    RandomWalkTuner, Trial, TunerConfig,
};

/// Train an L1-regularized logistic regression model on libsvm-formatted
/// data read from stdin.
#[derive(Parser, Debug)]
#[command(name = "l1logit")]
#[command(version)]
struct Cli {
    /// Number of leading rows used for training; the rest are held out
    #[arg(long, default_value_t = 4000)]
    train_size: usize,

    /// Fixed L1 strength. When omitted the strength is tuned on the held-out rows
    #[arg(long)]
    l1: Option<f64>,

    /// Largest per-feature step that counts as converged
    #[arg(long, default_value_t = 1e-6)]
    convergence: f64,

    /// Iteration budget per training run
    #[arg(long, default_value_t = 100)]
    max_iters: usize,

    /// Random-walk trials when tuning
    #[arg(long, default_value_t = 40)]
    trials: usize,

    /// Seed for the tuning random walk
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

#[derive(Debug, thiserror::Error)]
enum ParseError {
    #[error("line {line}: missing label")]
    MissingLabel { line: usize },

    #[error("line {line}: malformed feature `{token}`")]
    MalformedFeature { line: usize, token: String },

    #[error("line {line}: {source}")]
    Number {
        line: usize,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("line {line}: {source}")]
    Index {
        line: usize,
        #[source]
        source: std::num::ParseIntError,
    },
}

fn parse_line(i: usize, line: &str) -> Result<(FeatureVector<usize>, bool), ParseError> {
    let line_no = i + 1;
    let mut spl = line.split_whitespace();
    let y: f64 = spl
        .next()
        .ok_or(ParseError::MissingLabel { line: line_no })?
        .parse()
        .map_err(|source| ParseError::Number {
            line: line_no,
            source,
        })?;

    let mut feats = vec![];
    for s in spl {
        let (id, value) = s.split_once(':').ok_or_else(|| ParseError::MalformedFeature {
            line: line_no,
            token: s.to_string(),
        })?;
        let id: usize = id.parse().map_err(|source| ParseError::Index {
            line: line_no,
            source,
        })?;
        let value: f64 = value.parse().map_err(|source| ParseError::Number {
            line: line_no,
            source,
        })?;
        feats.push(Feature::new(id, value));
    }
    Ok((feats.into_iter().collect(), y > 0.0))
}

/// Prints a dot every ten iterations and one line per tuning trial.
struct Progress;

impl Observer for Progress {
    fn on_iteration(&mut self, iteration: usize, _max_distance: f64) {
        if (iteration + 1) % 10 == 0 {
            eprint!(".");
            io::stderr().flush().ok();
        }
    }

    fn on_finish(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Converged { iterations } => eprintln!("\nconverged in {}", iterations),
            Outcome::Exhausted { iterations } => {
                eprintln!("\nno convergence in {} iterations", iterations)
            }
        }
    }

    fn on_trial(&mut self, trial: &Trial) {
        eprintln!(
            "trial {}: l1 = {:.6}, loss = {:.6}{}",
            trial.index,
            trial.l1,
            trial.loss,
            if trial.accepted { " *" } else { "" }
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut xs_train = vec![];
    let mut ys_train = vec![];
    let mut xs_test = vec![];
    let mut ys_test = vec![];

    for (i, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let (x, y) = parse_line(i, &line)?;
        if xs_train.len() < cli.train_size {
            xs_train.push(x);
            ys_train.push(y);
        } else {
            xs_test.push(x);
            ys_test.push(y);
        }
    }

    let train = Problem::new(xs_train, ys_train)?;
    let test = Problem::new(xs_test, ys_test)?;

    let l1 = match cli.l1 {
        Some(l1) => l1,
        None => {
            let tuner = RandomWalkTuner::new(TunerConfig {
                trials: cli.trials,
                convergence: cli.convergence,
                max_iters: cli.max_iters,
            })?;
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(cli.seed);
            tuner.tune(&train, &test, &mut rng, Progress).l1
        }
    };
    println!("l1: {}", l1);

    let solver = L1rLrSolver::new(l1, cli.convergence, cli.max_iters)?;
    let model = solver.train(&train, Progress).model;

    let mut tpos = 0;
    let mut fpos = 0;
    let mut fneg = 0;
    for (x, y) in test.iter() {
        let positive = model.predict_probability(x) > 0.5;
        match (y, positive) {
            (true, true) => tpos += 1,
            (true, false) => fneg += 1,
            (false, true) => fpos += 1,
            (false, false) => {}
        }
    }
    let prec = tpos as f64 / (tpos + fpos) as f64;
    let recall = tpos as f64 / (tpos + fneg) as f64;
    println!("loss: {}", compute_loss_for_dataset(&test, &model));
    println!("prec: {}", prec);
    println!("recall: {}", recall);
    println!("f1: {}", 2.0 * prec * recall / (prec + recall));
    println!("nonzero: {}", model.num_nonzero());

    Ok(())
}
