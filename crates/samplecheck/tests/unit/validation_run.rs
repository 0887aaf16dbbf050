//! End-to-end tests of the sampling loop and pass/fail decision.
//!
//! Samplers draw approximately normal vectors from a seeded RNG into a state
//! shared with their feature extractor.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use rand::{Rng, RngCore};
use samplecheck::{
    BootstrapConfig, BootstrapTwoSampleTest, BoxError, Criterion, ErrorKind, FeatureExtractor,
    HypothesisTest, KolmogorovSmirnovTest, RunConfig, RunError, Sampler, ValidationRun, Verdict,
    ZeroMeanGaussianTest,
};
use samplecheck_core::statistics::stream_rng;
use samplecheck_core::ConfigError;

type State = Rc<RefCell<Vec<f64>>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Draws `dim` values from N(shift, 1) (sum of twelve uniforms) per state.
struct NormalSampler {
    rng: Box<dyn RngCore>,
    shift: f64,
    state: State,
    calls: Rc<Cell<usize>>,
}

impl Sampler for NormalSampler {
    fn next_state(&mut self, _sample_index: usize) -> Result<(), BoxError> {
        self.calls.set(self.calls.get() + 1);
        for v in self.state.borrow_mut().iter_mut() {
            *v = (0..12).map(|_| self.rng.random::<f64>()).sum::<f64>() - 6.0 + self.shift;
        }
        Ok(())
    }
}

/// Reports the shared state verbatim.
struct StateFeatures {
    name: String,
    state: State,
}

impl FeatureExtractor for StateFeatures {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimension(&self) -> usize {
        self.state.borrow().len()
    }

    fn extract_features(&mut self, _sample_index: usize) -> Result<Vec<f64>, BoxError> {
        Ok(self.state.borrow().clone())
    }
}

struct Chain {
    sampler: NormalSampler,
    features: StateFeatures,
    calls: Rc<Cell<usize>>,
}

fn chain(name: &str, dim: usize, shift: f64, seed: u64) -> Chain {
    let state: State = Rc::new(RefCell::new(vec![0.0; dim]));
    let calls = Rc::new(Cell::new(0));
    Chain {
        sampler: NormalSampler {
            rng: Box::new(stream_rng(seed, 0)),
            shift,
            state: Rc::clone(&state),
            calls: Rc::clone(&calls),
        },
        features: StateFeatures {
            name: name.to_string(),
            state,
        },
        calls,
    }
}

fn one_sample_run(chain: Chain, n_samples: usize, test: Box<dyn HypothesisTest>) -> Result<ValidationRun, RunError> {
    ValidationRun::new(
        RunConfig::new().n_samples(n_samples).print_every(Some(100)),
        vec![Box::new(chain.sampler)],
        vec![Box::new(chain.features)],
        test,
    )
}

fn two_sample_run(a: Chain, b: Chain, n_samples: usize, test: Box<dyn HypothesisTest>) -> Result<ValidationRun, RunError> {
    ValidationRun::new(
        RunConfig::new().n_samples(n_samples).print_every(None),
        vec![Box::new(a.sampler), Box::new(b.sampler)],
        vec![Box::new(a.features), Box::new(b.features)],
        test,
    )
}

fn bootstrap(criterion: Criterion, n_boots: usize) -> Box<dyn HypothesisTest> {
    let config = BootstrapConfig::new()
        .criterion(criterion)
        .n_boots(n_boots)
        .print_every(None);
    Box::new(BootstrapTwoSampleTest::new(config).unwrap())
}

// =============================================================================
// ONE-SAMPLE
// =============================================================================

#[test]
fn zero_mean_sampler_passes() {
    init_tracing();
    let mut run = one_sample_run(chain("x", 2, 0.0, 1), 400, Box::new(ZeroMeanGaussianTest::new())).unwrap();
    let report = run.run().unwrap();

    assert_eq!(report.test, "zero-mean-gaussian");
    assert_eq!(report.n_samples, 400);
    assert_eq!(report.verdict, Verdict::Pass, "p = {}", report.result.p_value());
    assert!(report.passed());
    assert_eq!(report.result.summary().get("df"), Some("2"));
}

#[test]
fn shifted_sampler_fails() {
    init_tracing();
    let mut run = one_sample_run(chain("x", 2, 1.0, 2), 400, Box::new(ZeroMeanGaussianTest::new())).unwrap();
    let report = run.run().unwrap();

    assert_eq!(report.verdict, Verdict::Fail);
    assert!(report.result.p_value() < report.alpha);
}

// =============================================================================
// TWO-SAMPLE
// =============================================================================

#[test]
fn bootstrap_same_distribution_passes() {
    init_tracing();
    let mut run = two_sample_run(
        chain("reference", 2, 0.0, 3),
        chain("candidate", 2, 0.0, 4),
        60,
        bootstrap(Criterion::Ks, 1000),
    )
    .unwrap();
    let report = run.run().unwrap();
    assert!(report.passed(), "p = {}", report.result.p_value());
}

#[test]
fn bootstrap_shifted_distribution_fails() {
    init_tracing();
    let mut run = two_sample_run(
        chain("reference", 2, 0.0, 5),
        chain("candidate", 2, 3.0, 6),
        60,
        bootstrap(Criterion::Cvm, 200),
    )
    .unwrap();
    let report = run.run().unwrap();
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.result.p_value(), 0.0);
}

#[test]
fn bootstrap_is_reproducible() {
    let p = |seed_a, seed_b| {
        let mut run = two_sample_run(
            chain("a", 2, 0.0, seed_a),
            chain("b", 2, 0.3, seed_b),
            40,
            bootstrap(Criterion::Ks, 300),
        )
        .unwrap();
        run.run().unwrap().result.p_value()
    };
    assert_eq!(p(7, 8), p(7, 8));
}

#[test]
fn ks_shifted_scalar_fails() {
    init_tracing();
    let mut run = two_sample_run(
        chain("reference", 1, 0.0, 9),
        chain("candidate", 1, 2.0, 10),
        80,
        Box::new(KolmogorovSmirnovTest::new()),
    )
    .unwrap();
    let report = run.run().unwrap();
    assert_eq!(report.verdict, Verdict::Fail);
    assert_eq!(report.result.summary().get("method[0]"), Some("exact"));
}

// =============================================================================
// SETUP ERRORS
// =============================================================================

#[test]
fn arity_mismatch_rejected_before_sampling() {
    let a = chain("a", 2, 0.0, 1);
    let b = chain("b", 2, 0.0, 2);
    let calls = Rc::clone(&a.calls);

    let err = two_sample_run(a, b, 10, Box::new(ZeroMeanGaussianTest::new())).unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Configuration));
    assert!(matches!(
        err,
        RunError::Core(samplecheck::Error::Configuration(ConfigError::ArityMismatch {
            expected: 1,
            actual: 2
        }))
    ));
    assert_eq!(calls.get(), 0, "no sampling may happen on a rejected setup");
}

#[test]
fn bad_alpha_rejected() {
    let c = chain("x", 2, 0.0, 1);
    let err = ValidationRun::new(
        RunConfig::new().alpha(1.0),
        vec![Box::new(c.sampler)],
        vec![Box::new(c.features)],
        Box::new(ZeroMeanGaussianTest::new()),
    )
    .unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Configuration));
}

#[test]
fn empty_samplers_and_extractors_rejected() {
    let c = chain("x", 2, 0.0, 1);
    let err = ValidationRun::new(
        RunConfig::new(),
        Vec::new(),
        vec![Box::new(c.features)],
        Box::new(ZeroMeanGaussianTest::new()),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RunError::Core(samplecheck::Error::Configuration(ConfigError::NoSamplers))
    ));

    let c = chain("x", 2, 0.0, 1);
    let err = ValidationRun::new(
        RunConfig::new(),
        vec![Box::new(c.sampler)],
        Vec::new(),
        Box::new(ZeroMeanGaussianTest::new()),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RunError::Core(samplecheck::Error::Configuration(ConfigError::NoExtractors))
    ));
}

#[test]
fn two_sample_dimensions_must_match() {
    let err = two_sample_run(
        chain("a", 2, 0.0, 1),
        chain("b", 3, 0.0, 2),
        10,
        bootstrap(Criterion::Ks, 10),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        RunError::Core(samplecheck::Error::Configuration(
            ConfigError::GroupDimensionMismatch { .. }
        ))
    ));
}

// =============================================================================
// RUNTIME ERRORS
// =============================================================================

struct FailingSampler {
    fail_at: usize,
}

impl Sampler for FailingSampler {
    fn next_state(&mut self, sample_index: usize) -> Result<(), BoxError> {
        if sample_index == self.fail_at {
            return Err("proposal rejected".into());
        }
        Ok(())
    }
}

#[test]
fn sampler_failure_carries_index() {
    let c = chain("x", 2, 0.0, 1);
    let mut run = ValidationRun::new(
        RunConfig::new().n_samples(20),
        vec![Box::new(c.sampler), Box::new(FailingSampler { fail_at: 7 })],
        vec![Box::new(c.features)],
        Box::new(ZeroMeanGaussianTest::new()),
    )
    .unwrap();

    match run.run().unwrap_err() {
        RunError::Sampler {
            sampler,
            sample_index,
            source,
        } => {
            assert_eq!(sampler, 1);
            assert_eq!(sample_index, 7);
            assert_eq!(source.to_string(), "proposal rejected");
        }
        other => panic!("unexpected error: {other}"),
    }
}

/// Claims two features but emits three.
struct LyingFeatures;

impl FeatureExtractor for LyingFeatures {
    fn dimension(&self) -> usize {
        2
    }

    fn extract_features(&mut self, _sample_index: usize) -> Result<Vec<f64>, BoxError> {
        Ok(vec![0.0, 1.0, 2.0])
    }
}

#[test]
fn wrong_feature_length_is_data_error() {
    let c = chain("x", 2, 0.0, 1);
    let mut run = ValidationRun::new(
        RunConfig::new().n_samples(5),
        vec![Box::new(c.sampler)],
        vec![Box::new(LyingFeatures)],
        Box::new(ZeroMeanGaussianTest::new()),
    )
    .unwrap();
    let err = run.run().unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Data));
}
